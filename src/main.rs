mod app;
mod cli;

use std::process::ExitCode;

use clap::Parser;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::app::App;
use crate::cli::Args;

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(args);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        return ExitCode::FAILURE;
    }

    match app.startup_error() {
        Some(e) => {
            log::error!("Startup failed: {}", e);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
