use wgpu::util::DeviceExt;
use wgpu::{BindGroup, Buffer, BufferUsages, Device, Texture, TextureView};

use crate::config::{K_COORD_MULT, PATCH_SIZE_M};
use crate::gpu::compute::Pipelines;
use crate::simulation::{Axis, ButterflyLookup, FrameOptions, FrequencyTexel, Spectrum};

/// Two interchangeable resources; stage `s` reads slot `s % 2` and writes slot `(s + 1) % 2`
pub struct PingPong<T> {
    slots: [T; 2],
}

impl<T> PingPong<T> {
    pub fn new(first: T, second: T) -> Self {
        Self {
            slots: [first, second],
        }
    }

    pub fn slot(&self, index: usize) -> &T {
        &self.slots[index % 2]
    }

    /// Slot read by `stage`
    pub fn read(&self, stage: usize) -> &T {
        self.slot(stage)
    }

    /// Slot written by `stage`
    pub fn write(&self, stage: usize) -> &T {
        self.slot(stage + 1)
    }
}

/// Per-frame uniforms shared by evolve.wgsl, ifft.wgsl and normals.wgsl (32 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub grid_size: u32,
    pub time_s: f32,
    pub k_coord_mult: f32,
    pub choppiness: f32,
    pub use_displacement: u32,
    pub texel_spacing: f32,
    pub _padding: [u32; 2],
}

impl FrameUniforms {
    pub fn new(grid_size: u32, options: &FrameOptions) -> Self {
        Self {
            grid_size,
            time_s: options.time_s,
            k_coord_mult: K_COORD_MULT,
            choppiness: options.choppiness,
            use_displacement: options.use_displacement as u32,
            texel_spacing: PATCH_SIZE_M / grid_size as f32,
            _padding: [0; 2],
        }
    }
}

/// Fixed parameters of one IFFT stage (16 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StageParams {
    pub grid_size: u32,
    pub level: u32,
    /// 0 = row, 1 = column
    pub axis: u32,
    pub _padding: u32,
}

/// Gerstner dispatch parameters (32 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GerstnerUniforms {
    pub resolution: u32,
    pub wave_count: u32,
    pub time_s: f32,
    pub patch_size: f32,
    pub use_displacement: u32,
    pub _padding: [u32; 3],
}

/// Storage texture that is also sampled and copied out
pub struct OutputTexture {
    pub texture: Texture,
    pub view: TextureView,
}

impl OutputTexture {
    pub fn new(device: &Device, label: &str, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }
}

/// The three co-evolving fields of one ping-pong slot
pub struct SpectralFields {
    /// `vec2<f32>` per bin
    pub height: Buffer,
    /// `vec4<f32>` per bin: x and z complex
    pub choppy: Buffer,
    /// `vec4<f32>` per bin: x and z complex
    pub slope: Buffer,
}

impl SpectralFields {
    fn new(device: &Device, label: &str, bins: u64) -> Self {
        let create = |name: &str, element_size: u64| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{}-{}", label, name)),
                size: bins * element_size,
                usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            })
        };

        Self {
            height: create("height", 8),
            choppy: create("choppy", 16),
            slope: create("slope", 16),
        }
    }
}

/// Every resource whose size depends on the grid size N
///
/// Built and replaced as one unit, so the lookup table, the ping-pong slots,
/// the bind groups and the output textures always agree on N.
pub struct FourierResources {
    pub grid_size_power: u32,
    pub spectrum_buffer: Buffer,
    pub lookup_buffer: Buffer,
    pub fields: PingPong<SpectralFields>,
    pub frame_uniforms: Buffer,
    pub displacement: OutputTexture,
    pub slope: OutputTexture,
    pub normal: OutputTexture,
    pub evolve_bind_group: BindGroup,
    /// One per IFFT stage except the last
    pub stage_bind_groups: Vec<BindGroup>,
    pub output_bind_group: BindGroup,
    pub analytic_bind_group: BindGroup,
    pub sobel_bind_group: BindGroup,
    /// Kept alive for the bind groups above
    _stage_params: Vec<Buffer>,
}

impl FourierResources {
    pub fn new(device: &Device, pipelines: &Pipelines, spectrum: &Spectrum) -> Self {
        let grid_size_power = spectrum.grid_size_power;
        let n = spectrum.grid_size();
        let bins = u64::from(n) * u64::from(n);
        let lookup = ButterflyLookup::new(grid_size_power);

        log::debug!(
            "Building spectral resources for N={} ({} IFFT stages)",
            n,
            stage_count(&lookup)
        );

        let spectrum_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("spectrum-buffer"),
            contents: bytemuck::cast_slice::<FrequencyTexel, u8>(&spectrum.texels),
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
        });

        let lookup_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lookup-buffer"),
            contents: bytemuck::cast_slice(lookup.as_gpu_words()),
            usage: BufferUsages::STORAGE,
        });

        let fields = PingPong::new(
            SpectralFields::new(device, "fields-a", bins),
            SpectralFields::new(device, "fields-b", bins),
        );

        let frame_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let displacement = OutputTexture::new(device, "fourier-displacement", n);
        let slope = OutputTexture::new(device, "fourier-slope", n);
        let normal = OutputTexture::new(device, "fourier-normal", n);

        let evolve_bind_group = pipelines.evolve.create_bind_group(
            device,
            &[
                entry(0, &spectrum_buffer),
                entry(1, &fields.slot(0).height),
                entry(2, &fields.slot(0).choppy),
                entry(3, &fields.slot(0).slope),
                entry(4, &frame_uniforms),
            ],
        );

        // Stage uniforms never change for a given N, so they are written once
        let stages = ifft_stages(grid_size_power);
        let stage_params: Vec<Buffer> = stages
            .iter()
            .map(|params| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("stage-params"),
                    contents: bytemuck::bytes_of(params),
                    usage: BufferUsages::UNIFORM,
                })
            })
            .collect();

        let last_stage = stages.len() - 1;
        let stage_bind_groups = (0..last_stage)
            .map(|stage| {
                let src = fields.read(stage);
                let dst = fields.write(stage);
                pipelines.butterfly.create_bind_group(
                    device,
                    &[
                        entry(0, &lookup_buffer),
                        entry(1, &src.height),
                        entry(2, &src.choppy),
                        entry(3, &src.slope),
                        entry(4, &dst.height),
                        entry(5, &dst.choppy),
                        entry(6, &dst.slope),
                        entry(7, &stage_params[stage]),
                    ],
                )
            })
            .collect();

        let src = fields.read(last_stage);
        let output_bind_group = pipelines.column_output.create_bind_group(
            device,
            &[
                entry(0, &lookup_buffer),
                entry(1, &src.height),
                entry(2, &src.choppy),
                entry(3, &src.slope),
                entry(7, &stage_params[last_stage]),
                texture_entry(8, &displacement.view),
                texture_entry(9, &slope.view),
                entry(10, &frame_uniforms),
            ],
        );

        let normal_entries = [
            texture_entry(0, &displacement.view),
            texture_entry(1, &slope.view),
            texture_entry(2, &normal.view),
            entry(3, &frame_uniforms),
        ];
        let analytic_bind_group = pipelines
            .normals_analytic
            .create_bind_group(device, &normal_entries);
        let sobel_bind_group = pipelines
            .normals_sobel
            .create_bind_group(device, &normal_entries);

        Self {
            grid_size_power,
            spectrum_buffer,
            lookup_buffer,
            fields,
            frame_uniforms,
            displacement,
            slope,
            normal,
            evolve_bind_group,
            stage_bind_groups,
            output_bind_group,
            analytic_bind_group,
            sobel_bind_group,
            _stage_params: stage_params,
        }
    }

    pub fn grid_size(&self) -> u32 {
        1 << self.grid_size_power
    }

    /// Total IFFT stages, 2(P + 1)
    pub fn stage_count(&self) -> usize {
        self.stage_bind_groups.len() + 1
    }
}

fn stage_count(lookup: &ButterflyLookup) -> usize {
    2 * lookup.level_count() as usize
}

/// Every IFFT stage in dispatch order: all row levels, then all column levels
pub fn ifft_stages(grid_size_power: u32) -> Vec<StageParams> {
    let lookup = ButterflyLookup::new(grid_size_power);
    let grid_size = 1 << grid_size_power;
    [Axis::Row, Axis::Column]
        .into_iter()
        .flat_map(|axis| {
            (0..lookup.level_count()).map(move |level| StageParams {
                grid_size,
                level,
                axis: match axis {
                    Axis::Row => 0,
                    Axis::Column => 1,
                },
                _padding: 0,
            })
        })
        .collect()
}

pub(crate) fn entry(binding: u32, buffer: &Buffer) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: buffer.as_entire_binding(),
    }
}

pub(crate) fn texture_entry(binding: u32, view: &TextureView) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(view),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 32);
        assert_eq!(std::mem::size_of::<StageParams>(), 16);
        assert_eq!(std::mem::size_of::<GerstnerUniforms>(), 32);
    }

    #[test]
    fn test_ping_pong_alternates() {
        let pair = PingPong::new("a", "b");
        assert_eq!(*pair.read(0), "a");
        assert_eq!(*pair.write(0), "b");
        assert_eq!(*pair.read(1), "b");
        assert_eq!(*pair.write(1), "a");
        // Stage s writes what stage s + 1 reads
        for stage in 0..24 {
            assert_eq!(pair.write(stage), pair.read(stage + 1));
        }
    }

    #[test]
    fn test_stage_plan_rows_then_columns() {
        for power in [6, 7, 9, 11] {
            let stages = ifft_stages(power);
            let levels = power + 1;
            assert_eq!(stages.len(), 2 * levels as usize);
            assert!(stages.iter().all(|stage| stage.grid_size == 1 << power));

            let (rows, columns) = stages.split_at(levels as usize);
            for (level, stage) in rows.iter().enumerate() {
                assert_eq!((stage.axis, stage.level), (0, level as u32));
            }
            for (level, stage) in columns.iter().enumerate() {
                assert_eq!((stage.axis, stage.level), (1, level as u32));
            }
        }
    }

    #[test]
    fn test_stage_plan_slots() {
        // Evolve fills slot 0; the final column stage reads slot 1
        let slots = PingPong::new(0usize, 1usize);
        let stages = ifft_stages(9);
        assert_eq!(*slots.read(0), 0);
        for stage in 0..stages.len() {
            assert_eq!(*slots.read(stage), stage % 2);
            assert_eq!(*slots.write(stage), (stage + 1) % 2);
        }
        let last = stages.len() - 1;
        assert_eq!(*slots.read(last), 1);
        assert_eq!((stages[last].axis, stages[last].level), (1, 9));
    }

    #[test]
    fn test_frame_uniforms_from_options() {
        let options = FrameOptions {
            time_s: 1.5,
            use_displacement: false,
            choppiness: 0.8,
            normal_mode: crate::config::NormalMode::Sobel,
        };
        let uniforms = FrameUniforms::new(256, &options);
        assert_eq!(uniforms.grid_size, 256);
        assert_eq!(uniforms.use_displacement, 0);
        assert!((uniforms.texel_spacing - PATCH_SIZE_M / 256.0).abs() < 1e-6);
    }
}
