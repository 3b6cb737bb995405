use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use wgpu::{Adapter, Device, Instance, Queue, Surface, SurfaceConfiguration};
use winit::window::Window;

use crate::config::GRAVITY;
use crate::gpu::compute::Pipelines;

/// Errors from GPU setup and readback
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(String),

    #[error("Failed to create window surface: {0}")]
    SurfaceCreation(String),

    #[error("Buffer mapping error: {0}")]
    BufferMapping(String),
}

/// Window surface and its current configuration
pub struct PresentSurface {
    pub surface: Surface<'static>,
    pub config: SurfaceConfiguration,
}

/// GPU context holding device, queue, and the optional window surface
pub struct GpuContext {
    pub device: Device,
    pub queue: Queue,
    pub present: Option<PresentSurface>,
}

impl GpuContext {
    /// Create a GPU context that presents to the given window
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let instance = create_instance();

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| GpuError::SurfaceCreation(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = request_device(&adapter).await?;

        let size = window.inner_size();
        let config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or_else(|| GpuError::SurfaceCreation("Surface not supported by adapter".into()))?;

        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            present: Some(PresentSurface { surface, config }),
        })
    }

    /// Create a GPU context without a window, for offscreen synthesis and tests
    pub async fn new_headless() -> Result<Self, GpuError> {
        let instance = create_instance();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = request_device(&adapter).await?;

        Ok(Self {
            device,
            queue,
            present: None,
        })
    }

    /// Handle window resize
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if let Some(present) = &mut self.present {
            if new_size.width > 0 && new_size.height > 0 {
                present.config.width = new_size.width;
                present.config.height = new_size.height;
                present.surface.configure(&self.device, &present.config);
            }
        }
    }

    /// Current surface texture format, if presenting to a window
    pub fn format(&self) -> Option<wgpu::TextureFormat> {
        self.present.as_ref().map(|present| present.config.format)
    }
}

fn create_instance() -> Instance {
    Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    })
}

async fn request_device(adapter: &Adapter) -> Result<(Device, Queue), GpuError> {
    log::info!("Using GPU: {}", adapter.get_info().name);

    adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("ocean-surface-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        )
        .await
        .map_err(|e| GpuError::DeviceCreation(e.to_string()))
}

/// Everything a surface needs to synthesize a frame
///
/// Owns the GPU handles, the compiled shader set, the random source used for
/// spectrum and wave generation, and the gravity constant. Passed by
/// reference to every surface operation.
pub struct OceanContext {
    pub gpu: GpuContext,
    pub pipelines: Pipelines,
    pub rng: StdRng,
    pub gravity: f32,
}

impl OceanContext {
    pub fn new(gpu: GpuContext, seed: u64) -> Self {
        log::info!("Compiling compute pipelines...");
        let pipelines = Pipelines::new(&gpu.device);

        Self {
            gpu,
            pipelines,
            rng: StdRng::seed_from_u64(seed),
            gravity: GRAVITY,
        }
    }

    pub fn device(&self) -> &Device {
        &self.gpu.device
    }

    pub fn queue(&self) -> &Queue {
        &self.gpu.queue
    }
}

/// Headless context for GPU tests; these tests are `#[ignore]`d and run with `--ignored`
#[cfg(test)]
pub(crate) fn test_context(seed: u64) -> OceanContext {
    let gpu = pollster::block_on(GpuContext::new_headless()).expect("GPU adapter required");
    OceanContext::new(gpu, seed)
}
