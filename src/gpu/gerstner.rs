use wgpu::util::DeviceExt;
use wgpu::{BindGroup, Buffer, BufferUsages};

use crate::config::{GerstnerParams, GERSTNER_PATCH_SIZE_M, MAX_WAVE_COUNT};
use crate::gpu::buffers::{entry, texture_entry, GerstnerUniforms, OutputTexture};
use crate::gpu::context::OceanContext;
use crate::simulation::{GpuWave, WaveSet};

/// Textures sized by the output resolution
struct GerstnerTargets {
    resolution: u32,
    displacement: OutputTexture,
    normal: OutputTexture,
    bind_group: BindGroup,
}

/// Closed-form surface: a random table of trochoidal waves summed per texel
pub struct GerstnerSurface {
    params: GerstnerParams,
    waves: WaveSet,
    wave_buffer: Buffer,
    uniforms: Buffer,
    targets: GerstnerTargets,
}

impl GerstnerSurface {
    pub fn new(ctx: &mut OceanContext, params: &GerstnerParams) -> Self {
        let params = params.clamped();
        let waves = WaveSet::generate(&params, ctx.gravity, &mut ctx.rng);

        // Sized for the full capacity, so a new table never reallocates
        let wave_buffer = ctx
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("gerstner-waves"),
                contents: bytemuck::cast_slice::<GpuWave, u8>(&waves.waves),
                usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            });
        debug_assert_eq!(waves.waves.len(), MAX_WAVE_COUNT);

        let uniforms = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("gerstner-uniforms"),
            size: std::mem::size_of::<GerstnerUniforms>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let targets = Self::create_targets(ctx, &wave_buffer, &uniforms, params.texture_resolution);
        log::info!(
            "Gerstner surface ready: {} waves at {}x{}",
            waves.count,
            params.texture_resolution,
            params.texture_resolution
        );

        Self {
            params,
            waves,
            wave_buffer,
            uniforms,
            targets,
        }
    }

    fn create_targets(
        ctx: &OceanContext,
        wave_buffer: &Buffer,
        uniforms: &Buffer,
        resolution: u32,
    ) -> GerstnerTargets {
        let device = ctx.device();
        let displacement = OutputTexture::new(device, "gerstner-displacement", resolution);
        let normal = OutputTexture::new(device, "gerstner-normal", resolution);
        let bind_group = ctx.pipelines.gerstner.create_bind_group(
            device,
            &[
                entry(0, wave_buffer),
                texture_entry(1, &displacement.view),
                texture_entry(2, &normal.view),
                entry(3, uniforms),
            ],
        );

        GerstnerTargets {
            resolution,
            displacement,
            normal,
            bind_group,
        }
    }

    /// Replace the whole wave table; textures are rebuilt when the resolution changed
    pub fn regenerate(&mut self, ctx: &mut OceanContext, params: &GerstnerParams) {
        let params = params.clamped();
        let waves = WaveSet::generate(&params, ctx.gravity, &mut ctx.rng);
        ctx.queue()
            .write_buffer(&self.wave_buffer, 0, bytemuck::cast_slice(&waves.waves));

        if params.texture_resolution != self.targets.resolution {
            log::info!(
                "Texture resolution changed {} -> {}",
                self.targets.resolution,
                params.texture_resolution
            );
            self.targets =
                Self::create_targets(ctx, &self.wave_buffer, &self.uniforms, params.texture_resolution);
        }
        log::info!("Wave table regenerated with {} waves", waves.count);

        self.params = params;
        self.waves = waves;
    }

    /// Record the single summation dispatch for time `time_s`
    pub fn prepare_render(
        &self,
        ctx: &OceanContext,
        encoder: &mut wgpu::CommandEncoder,
        time_s: f32,
        use_displacement: bool,
    ) {
        let resolution = self.targets.resolution;
        let uniforms = GerstnerUniforms {
            resolution,
            wave_count: self.waves.count as u32,
            time_s,
            patch_size: GERSTNER_PATCH_SIZE_M,
            use_displacement: use_displacement as u32,
            _padding: [0; 3],
        };
        ctx.queue()
            .write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&uniforms));

        ctx.pipelines
            .gerstner
            .dispatch(encoder, &self.targets.bind_group, resolution, resolution);
    }

    pub fn params(&self) -> &GerstnerParams {
        &self.params
    }

    pub fn waves(&self) -> &WaveSet {
        &self.waves
    }

    pub fn resolution(&self) -> u32 {
        self.targets.resolution
    }

    pub fn displacement(&self) -> &OutputTexture {
        &self.targets.displacement
    }

    pub fn normal(&self) -> &OutputTexture {
        &self.targets.normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::context::test_context;
    use crate::gpu::readback::read_texture_rgba32f;
    use crate::simulation::gerstner::texel_position;

    #[test]
    #[ignore = "requires a GPU adapter"]
    fn test_gpu_matches_cpu_sample() {
        let mut ctx = test_context(3);
        let params = GerstnerParams {
            texture_resolution: 64,
            ..Default::default()
        };
        let surface = GerstnerSurface::new(&mut ctx, &params);

        for use_displacement in [true, false] {
            let mut encoder = ctx
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("test-encoder"),
                });
            surface.prepare_render(&ctx, &mut encoder, 2.0, use_displacement);
            ctx.queue().submit(std::iter::once(encoder.finish()));

            let displacement =
                read_texture_rgba32f(&ctx.gpu, &surface.displacement().texture).unwrap();
            let normal = read_texture_rgba32f(&ctx.gpu, &surface.normal().texture).unwrap();

            for z in 0..64 {
                for x in 0..64 {
                    let index = (z * 64 + x) as usize;
                    let (expected_d, expected_n) =
                        surface
                            .waves()
                            .sample(texel_position(x, z, 64), 2.0, use_displacement);
                    let d = displacement[index];
                    let n = normal[index];
                    assert!(
                        (d[0] - expected_d.x).abs() < 1e-4
                            && (d[1] - expected_d.y).abs() < 1e-4
                            && (d[2] - expected_d.z).abs() < 1e-4,
                        "Displacement at ({}, {}): {:?} vs {:?}",
                        x,
                        z,
                        d,
                        expected_d
                    );
                    let dot = n[0] * expected_n.x + n[1] * expected_n.y + n[2] * expected_n.z;
                    assert!(dot > 0.9999, "Normal at ({}, {}): {:?} vs {:?}", x, z, n, expected_n);
                }
            }
        }
    }

    #[test]
    #[ignore = "requires a GPU adapter"]
    fn test_regenerate_resizes_textures() {
        let mut ctx = test_context(4);
        let mut params = GerstnerParams {
            texture_resolution: 64,
            ..Default::default()
        };
        let mut surface = GerstnerSurface::new(&mut ctx, &params);
        assert_eq!(surface.displacement().texture.width(), 64);

        params.texture_resolution = 300;
        params.wave_count = 5;
        surface.regenerate(&mut ctx, &params);
        assert_eq!(surface.resolution(), 300);
        assert_eq!(surface.normal().texture.width(), 300);
        assert_eq!(surface.waves().active().len(), 5);
    }
}
