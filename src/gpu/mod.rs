mod buffers;
mod compute;
mod context;
mod fourier;
mod gerstner;
pub mod readback;
mod render;
mod surface;

pub use buffers::{FourierResources, OutputTexture, PingPong};
pub use compute::{ComputeKernel, Pipelines};
pub use context::{GpuContext, GpuError, OceanContext, PresentSurface};
pub use fourier::FourierSurface;
pub use gerstner::GerstnerSurface;
pub use render::{RenderPipeline, ViewUniforms};
pub use surface::OceanSurface;
