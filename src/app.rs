use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use ocean_surface::config::{
    FourierParams, GerstnerParams, MAX_GRID_SIZE_POWER, MAX_WAVE_COUNT, MIN_GRID_SIZE_POWER,
    VIEW_PAN_SPEED, VIEW_ZOOM_SPEED,
};
use ocean_surface::gpu::{
    FourierSurface, GerstnerSurface, GpuContext, GpuError, OceanContext, OceanSurface,
    RenderPipeline, ViewUniforms,
};

use crate::cli::{Args, SurfaceKind};

/// Wave count change per key press
const WAVE_COUNT_STEP: usize = 5;

/// Top-down view over the tiled patch
struct ViewState {
    /// Patch-relative center
    center: Vec2,
    /// Patch tiles across the window
    zoom: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            center: Vec2::splat(0.5),
            zoom: 1.0,
        }
    }
}

/// GPU state created once the window exists
struct Scene {
    ctx: OceanContext,
    render: RenderPipeline,
    surface: OceanSurface,
}

/// Application state
pub struct App {
    args: Args,
    window: Option<Arc<Window>>,
    scene: Option<Scene>,
    startup_error: Option<GpuError>,
    fourier_params: FourierParams,
    gerstner_params: GerstnerParams,
    use_displacement: bool,
    start: Instant,
    fps_counter: FpsCounter,
    view: ViewState,
}

impl App {
    pub fn new(args: Args) -> Self {
        let fourier_params = args.fourier_params();
        let gerstner_params = args.gerstner_params();
        let use_displacement = !args.no_displacement;

        Self {
            args,
            window: None,
            scene: None,
            startup_error: None,
            fourier_params,
            gerstner_params,
            use_displacement,
            start: Instant::now(),
            fps_counter: FpsCounter::new(),
            view: ViewState::default(),
        }
    }

    /// Error that stopped initialization, if any
    pub fn startup_error(&self) -> Option<&GpuError> {
        self.startup_error.as_ref()
    }

    fn init_scene(&self, window: Arc<Window>) -> Result<Scene, GpuError> {
        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window))?;
        let format = gpu
            .format()
            .ok_or_else(|| GpuError::SurfaceCreation("Context has no window surface".into()))?;
        let mut ctx = OceanContext::new(gpu, self.args.seed);

        log::info!("Creating render pipeline...");
        let render = RenderPipeline::new(ctx.device(), format);

        let surface = match self.args.surface {
            SurfaceKind::Fourier => {
                OceanSurface::Fourier(FourierSurface::new(&mut ctx, &self.fourier_params))
            }
            SurfaceKind::Gerstner => {
                OceanSurface::Gerstner(GerstnerSurface::new(&mut ctx, &self.gerstner_params))
            }
        };

        Ok(Scene {
            ctx,
            render,
            surface,
        })
    }

    fn render(&mut self) {
        let Some(scene) = &self.scene else {
            return;
        };
        let Some(present) = &scene.ctx.gpu.present else {
            return;
        };
        let time_s = self.start.elapsed().as_secs_f32();

        let output = match present.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Reconfigure surface
                present.surface.configure(scene.ctx.device(), &present.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = scene
            .ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        // 1. Synthesize the surface textures for this frame
        scene
            .surface
            .prepare_render(&scene.ctx, &mut encoder, time_s, self.use_displacement);

        // 2. Draw the textures
        scene.render.update_view(
            scene.ctx.queue(),
            &ViewUniforms {
                center: self.view.center.into(),
                zoom: self.view.zoom,
                resolution: scene.surface.resolution(),
                light_dir: [0.3, 1.0, 0.2],
                height_scale: match scene.surface {
                    OceanSurface::Fourier(_) => 1.0,
                    OceanSurface::Gerstner(_) => 10.0,
                },
            },
        );
        let bind_group = scene.render.create_bind_group(
            scene.ctx.device(),
            scene.surface.displacement_view(),
            scene.surface.normal_view(),
        );
        scene.render.draw(&mut encoder, &view, &bind_group);

        scene.ctx.queue().submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.fps_counter.tick() {
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "Ocean - {:.0} FPS - {} {}x{}{}",
                    fps,
                    scene.surface.name(),
                    scene.surface.resolution(),
                    scene.surface.resolution(),
                    if self.use_displacement { "" } else { " [flat]" }
                ));
            }
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        match key_code {
            // Toggle wave model
            KeyCode::Space => {
                if let Some(scene) = &mut self.scene {
                    scene.surface = match scene.surface {
                        OceanSurface::Fourier(_) => OceanSurface::Gerstner(GerstnerSurface::new(
                            &mut scene.ctx,
                            &self.gerstner_params,
                        )),
                        OceanSurface::Gerstner(_) => OceanSurface::Fourier(FourierSurface::new(
                            &mut scene.ctx,
                            &self.fourier_params,
                        )),
                    };
                    log::info!("Switched to {} surface", scene.surface.name());
                }
            }

            // Toggle Sobel / analytic normals
            KeyCode::KeyN => {
                self.fourier_params.normal_mode = self.fourier_params.normal_mode.toggled();
                if let Some(Scene {
                    surface: OceanSurface::Fourier(surface),
                    ..
                }) = &mut self.scene
                {
                    surface.set_normal_mode(self.fourier_params.normal_mode);
                }
                log::info!("Normal mode: {:?}", self.fourier_params.normal_mode);
            }

            // Toggle horizontal displacement
            KeyCode::KeyD => {
                self.use_displacement = !self.use_displacement;
                log::info!(
                    "Horizontal displacement: {}",
                    if self.use_displacement { "ON" } else { "OFF" }
                );
            }

            // Regenerate the active surface
            KeyCode::KeyR => self.regenerate(),

            // Grid size
            KeyCode::BracketLeft | KeyCode::BracketRight => {
                let power = self.fourier_params.grid_size_power;
                let power = if key_code == KeyCode::BracketLeft {
                    power.saturating_sub(1).max(MIN_GRID_SIZE_POWER)
                } else {
                    (power + 1).min(MAX_GRID_SIZE_POWER)
                };
                if power != self.fourier_params.grid_size_power {
                    self.fourier_params.grid_size_power = power;
                    log::info!("Grid size: {}", self.fourier_params.grid_size());
                    self.regenerate_if_active(key_code);
                }
            }

            // Wave count
            KeyCode::Minus | KeyCode::Equal => {
                let count = self.gerstner_params.wave_count;
                let count = if key_code == KeyCode::Minus {
                    count.saturating_sub(WAVE_COUNT_STEP)
                } else {
                    (count + WAVE_COUNT_STEP).min(MAX_WAVE_COUNT)
                };
                if count != self.gerstner_params.wave_count {
                    self.gerstner_params.wave_count = count;
                    log::info!("Wave count: {}", count);
                    self.regenerate_if_active(key_code);
                }
            }

            // Pan view
            KeyCode::ArrowUp => self.view.center.y -= VIEW_PAN_SPEED * self.view.zoom,
            KeyCode::ArrowDown => self.view.center.y += VIEW_PAN_SPEED * self.view.zoom,
            KeyCode::ArrowLeft => self.view.center.x -= VIEW_PAN_SPEED * self.view.zoom,
            KeyCode::ArrowRight => self.view.center.x += VIEW_PAN_SPEED * self.view.zoom,

            // Zoom
            KeyCode::KeyQ => {
                self.view.zoom *= VIEW_ZOOM_SPEED;
                log::info!("Zoom: {:.2}", self.view.zoom);
            }
            KeyCode::KeyE => {
                self.view.zoom /= VIEW_ZOOM_SPEED;
                log::info!("Zoom: {:.2}", self.view.zoom);
            }

            // Reset view
            KeyCode::KeyV => {
                self.view = ViewState::default();
                log::info!("View reset");
            }

            _ => {}
        }

        // Wrap view center around the periodic patch
        self.view.center = self.view.center.rem_euclid(Vec2::ONE);
    }

    /// Parameter edits for the inactive surface apply on its next switch-in
    fn regenerate_if_active(&mut self, key_code: KeyCode) {
        let active = self.scene.as_ref().map(|scene| surface_kind(&scene.surface));
        if active.is_some() && active == parameter_owner(key_code) {
            self.regenerate();
        }
    }

    fn regenerate(&mut self) {
        let Some(scene) = &mut self.scene else {
            return;
        };
        match &mut scene.surface {
            OceanSurface::Fourier(surface) => surface.regenerate(&mut scene.ctx, &self.fourier_params),
            OceanSurface::Gerstner(surface) => {
                surface.regenerate(&mut scene.ctx, &self.gerstner_params)
            }
        }
    }
}

/// Surface whose parameters a key edits
fn parameter_owner(key_code: KeyCode) -> Option<SurfaceKind> {
    match key_code {
        KeyCode::BracketLeft | KeyCode::BracketRight => Some(SurfaceKind::Fourier),
        KeyCode::Minus | KeyCode::Equal => Some(SurfaceKind::Gerstner),
        _ => None,
    }
}

fn surface_kind(surface: &OceanSurface) -> SurfaceKind {
    match surface {
        OceanSurface::Fourier(_) => SurfaceKind::Fourier,
        OceanSurface::Gerstner(_) => SurfaceKind::Gerstner,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        log::info!("Initializing ocean surface...");

        let window_attrs = Window::default_attributes()
            .with_title("Ocean - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(1024, 1024));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.startup_error = Some(GpuError::SurfaceCreation(e.to_string()));
                event_loop.exit();
                return;
            }
        };

        match self.init_scene(window.clone()) {
            Ok(scene) => self.scene = Some(scene),
            Err(e) => {
                self.startup_error = Some(e);
                event_loop.exit();
                return;
            }
        }

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Space: Toggle spectral/Gerstner surface");
        log::info!("  N: Toggle Sobel/analytic normals");
        log::info!("  D: Toggle horizontal displacement");
        log::info!("  R: Regenerate surface");
        log::info!("  [/]: Decrease/increase grid size");
        log::info!("  -/=: Fewer/more Gerstner waves");
        log::info!("  Arrows: Pan view");
        log::info!("  Q/E: Zoom out/in");
        log::info!("  V: Reset view");
        log::info!("  Escape: Quit");

        self.window = Some(window);
        self.start = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(scene) = &mut self.scene {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    scene.ctx.gpu.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                // Request another frame immediately
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parameter_keys_target_one_surface() {
        assert_eq!(parameter_owner(KeyCode::BracketLeft), Some(SurfaceKind::Fourier));
        assert_eq!(parameter_owner(KeyCode::BracketRight), Some(SurfaceKind::Fourier));
        assert_eq!(parameter_owner(KeyCode::Minus), Some(SurfaceKind::Gerstner));
        assert_eq!(parameter_owner(KeyCode::Equal), Some(SurfaceKind::Gerstner));
        assert_eq!(parameter_owner(KeyCode::KeyR), None);
        assert_eq!(parameter_owner(KeyCode::Space), None);
    }

    #[test]
    fn test_parameter_keys_edit_only_their_surface() {
        let mut app = App::new(Args::parse_from(["ocean"]));
        let gerstner = app.gerstner_params.clone();
        app.handle_key(KeyCode::BracketLeft);
        assert_eq!(app.fourier_params.grid_size_power, 8);
        assert_eq!(app.gerstner_params, gerstner);

        let fourier = app.fourier_params.clone();
        app.handle_key(KeyCode::Equal);
        assert_eq!(app.gerstner_params.wave_count, 25);
        assert_eq!(app.fourier_params, fourier);
    }
}
