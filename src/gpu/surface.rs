use wgpu::TextureView;

use crate::gpu::buffers::OutputTexture;
use crate::gpu::context::OceanContext;
use crate::gpu::fourier::FourierSurface;
use crate::gpu::gerstner::GerstnerSurface;

/// The active wave model
///
/// Both variants fill a displacement texture (x, height, z, 0) and a unit
/// normal texture (x, y, z, 0) that the renderer samples.
pub enum OceanSurface {
    Fourier(FourierSurface),
    Gerstner(GerstnerSurface),
}

impl OceanSurface {
    /// Record all compute work for time `time_s` into `encoder`
    pub fn prepare_render(
        &self,
        ctx: &OceanContext,
        encoder: &mut wgpu::CommandEncoder,
        time_s: f32,
        use_displacement: bool,
    ) {
        match self {
            OceanSurface::Fourier(surface) => {
                surface.prepare_render(ctx, encoder, time_s, use_displacement)
            }
            OceanSurface::Gerstner(surface) => {
                surface.prepare_render(ctx, encoder, time_s, use_displacement)
            }
        }
    }

    pub fn displacement(&self) -> &OutputTexture {
        match self {
            OceanSurface::Fourier(surface) => &surface.resources().displacement,
            OceanSurface::Gerstner(surface) => surface.displacement(),
        }
    }

    pub fn normal(&self) -> &OutputTexture {
        match self {
            OceanSurface::Fourier(surface) => &surface.resources().normal,
            OceanSurface::Gerstner(surface) => surface.normal(),
        }
    }

    pub fn displacement_view(&self) -> &TextureView {
        &self.displacement().view
    }

    pub fn normal_view(&self) -> &TextureView {
        &self.normal().view
    }

    /// Side length of the output textures in texels
    pub fn resolution(&self) -> u32 {
        match self {
            OceanSurface::Fourier(surface) => surface.resources().grid_size(),
            OceanSurface::Gerstner(surface) => surface.resolution(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OceanSurface::Fourier(_) => "Spectral",
            OceanSurface::Gerstner(_) => "Gerstner",
        }
    }
}
