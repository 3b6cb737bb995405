use crate::config::{FourierParams, NormalMode};
use crate::gpu::buffers::{FourierResources, FrameUniforms};
use crate::gpu::context::OceanContext;
use crate::simulation::{FrameOptions, Spectrum};

/// Spectral surface: Phillips spectrum evolved and inverse-transformed on the GPU
pub struct FourierSurface {
    params: FourierParams,
    spectrum: Spectrum,
    resources: FourierResources,
}

impl FourierSurface {
    pub fn new(ctx: &mut OceanContext, params: &FourierParams) -> Self {
        let params = params.clamped();
        let spectrum = Spectrum::generate(&params, ctx.gravity, &mut ctx.rng);
        let resources = FourierResources::new(ctx.device(), &ctx.pipelines, &spectrum);
        log::info!(
            "Spectral surface ready: N={}, wind {:.0} m/s at {:.0} deg",
            spectrum.grid_size(),
            params.wind_speed,
            params.wind_angle_deg
        );

        Self {
            params,
            spectrum,
            resources,
        }
    }

    /// Draw a new spectrum; N-sized resources are rebuilt only when N changed
    pub fn regenerate(&mut self, ctx: &mut OceanContext, params: &FourierParams) {
        let params = params.clamped();
        let spectrum = Spectrum::generate(&params, ctx.gravity, &mut ctx.rng);

        if spectrum.grid_size_power != self.resources.grid_size_power {
            log::info!(
                "Grid size changed {} -> {}, rebuilding spectral resources",
                self.resources.grid_size(),
                spectrum.grid_size()
            );
            self.resources = FourierResources::new(ctx.device(), &ctx.pipelines, &spectrum);
        } else {
            ctx.queue().write_buffer(
                &self.resources.spectrum_buffer,
                0,
                bytemuck::cast_slice(&spectrum.texels),
            );
            log::info!("Spectrum regenerated");
        }

        self.params = params;
        self.spectrum = spectrum;
    }

    /// Switch normal extraction without touching the spectrum
    pub fn set_normal_mode(&mut self, mode: NormalMode) {
        self.params.normal_mode = mode;
    }

    /// Record evolve, every IFFT stage and the normal pass for time `time_s`
    pub fn prepare_render(
        &self,
        ctx: &OceanContext,
        encoder: &mut wgpu::CommandEncoder,
        time_s: f32,
        use_displacement: bool,
    ) {
        let resources = &self.resources;
        let n = resources.grid_size();
        let options = self.frame_options(time_s, use_displacement);
        ctx.queue().write_buffer(
            &resources.frame_uniforms,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(n, &options)),
        );

        let pipelines = &ctx.pipelines;
        pipelines
            .evolve
            .dispatch(encoder, &resources.evolve_bind_group, n, n);

        // Pair index along x, line along y for both axes
        for bind_group in &resources.stage_bind_groups {
            pipelines.butterfly.dispatch(encoder, bind_group, n / 2, n);
        }
        pipelines
            .column_output
            .dispatch(encoder, &resources.output_bind_group, n / 2, n);

        let (normals, bind_group) = match options.normal_mode {
            NormalMode::Analytic => (&pipelines.normals_analytic, &resources.analytic_bind_group),
            NormalMode::Sobel => (&pipelines.normals_sobel, &resources.sobel_bind_group),
        };
        normals.dispatch(encoder, bind_group, n, n);
    }

    pub fn frame_options(&self, time_s: f32, use_displacement: bool) -> FrameOptions {
        FrameOptions {
            time_s,
            use_displacement,
            choppiness: self.params.choppiness,
            normal_mode: self.params.normal_mode,
        }
    }

    pub fn params(&self) -> &FourierParams {
        &self.params
    }

    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }

    pub fn resources(&self) -> &FourierResources {
        &self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::context::test_context;
    use crate::gpu::readback::{read_buffer, read_texture_rgba32f};
    use crate::simulation::synthesis::synthesize;
    use crate::simulation::ButterflyLookup;

    fn run_frame(ctx: &OceanContext, surface: &FourierSurface, time_s: f32, use_displacement: bool) {
        let mut encoder = ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("test-encoder"),
            });
        surface.prepare_render(ctx, &mut encoder, time_s, use_displacement);
        ctx.queue().submit(std::iter::once(encoder.finish()));
    }

    #[test]
    #[ignore = "requires a GPU adapter"]
    fn test_gpu_matches_cpu_synthesis() {
        let mut ctx = test_context(42);
        for mode in [NormalMode::Analytic, NormalMode::Sobel] {
            let params = FourierParams {
                grid_size_power: 6,
                normal_mode: mode,
                ..Default::default()
            };
            let surface = FourierSurface::new(&mut ctx, &params);
            run_frame(&ctx, &surface, 1.3, true);

            let displacement =
                read_texture_rgba32f(&ctx.gpu, &surface.resources().displacement.texture).unwrap();
            let normal = read_texture_rgba32f(&ctx.gpu, &surface.resources().normal.texture).unwrap();

            let expected = synthesize(
                surface.spectrum(),
                &ButterflyLookup::new(6),
                &surface.frame_options(1.3, true),
            );
            let scale = expected
                .displacement
                .iter()
                .map(|d| d.abs().max_element())
                .fold(0.0f32, f32::max);
            assert!(scale > 0.0);

            for (i, (gpu, cpu)) in displacement.iter().zip(&expected.displacement).enumerate() {
                for c in 0..3 {
                    assert!(
                        (gpu[c] - cpu[c]).abs() <= scale * 1e-3,
                        "Displacement texel {} channel {}: GPU {} vs CPU {}",
                        i,
                        c,
                        gpu[c],
                        cpu[c]
                    );
                }
            }
            for (gpu, cpu) in normal.iter().zip(&expected.normal) {
                let dot = gpu[0] * cpu.x + gpu[1] * cpu.y + gpu[2] * cpu.z;
                assert!(dot > 0.999, "Normals disagree ({:?} vs {:?})", gpu, cpu);
            }
        }
    }

    #[test]
    #[ignore = "requires a GPU adapter"]
    fn test_same_time_same_output() {
        let mut ctx = test_context(7);
        let params = FourierParams {
            grid_size_power: 7,
            ..Default::default()
        };
        let surface = FourierSurface::new(&mut ctx, &params);
        let texture = &surface.resources().displacement.texture;

        run_frame(&ctx, &surface, 4.0, true);
        let first = read_texture_rgba32f(&ctx.gpu, texture).unwrap();
        run_frame(&ctx, &surface, 9.0, true);
        run_frame(&ctx, &surface, 4.0, true);
        let second = read_texture_rgba32f(&ctx.gpu, texture).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    #[ignore = "requires a GPU adapter"]
    fn test_regenerate_same_grid_uploads_spectrum() {
        let mut ctx = test_context(11);
        let params = FourierParams {
            grid_size_power: 6,
            ..Default::default()
        };
        let mut surface = FourierSurface::new(&mut ctx, &params);
        let before = surface.spectrum().clone();

        surface.regenerate(&mut ctx, &params);
        assert_ne!(surface.spectrum().texels, before.texels);

        let expected: &[u8] = bytemuck::cast_slice(&surface.spectrum().texels);
        let buffer = &surface.resources().spectrum_buffer;
        let uploaded = read_buffer(&ctx.gpu, buffer, expected.len() as u64).unwrap();
        assert_eq!(uploaded, expected);
    }

    #[test]
    #[ignore = "requires a GPU adapter"]
    fn test_regenerate_smaller_grid() {
        let mut ctx = test_context(9);
        let mut params = FourierParams {
            grid_size_power: 9,
            ..Default::default()
        };
        let mut surface = FourierSurface::new(&mut ctx, &params);
        run_frame(&ctx, &surface, 0.0, true);

        params.grid_size_power = 7;
        surface.regenerate(&mut ctx, &params);
        let resources = surface.resources();
        assert_eq!(resources.grid_size(), 128);
        assert_eq!(resources.stage_count(), 16);
        assert_eq!(surface.spectrum().texels.len(), 128 * 128);
        assert_eq!(resources.displacement.texture.width(), 128);
        assert_eq!(resources.normal.texture.height(), 128);

        run_frame(&ctx, &surface, 0.0, true);
        let heights: Vec<f32> = read_texture_rgba32f(&ctx.gpu, &resources.displacement.texture)
            .unwrap()
            .iter()
            .map(|d| d[1])
            .collect();
        assert_eq!(heights.len(), 128 * 128);
        assert!(heights.iter().all(|h| h.is_finite()));
        let mean = heights.iter().sum::<f32>() / heights.len() as f32;
        let rms = (heights.iter().map(|h| h * h).sum::<f32>() / heights.len() as f32).sqrt();
        assert!(rms > 0.0);
        assert!(mean.abs() < rms * 1e-2, "Mean {} too large for rms {}", mean, rms);
    }
}
