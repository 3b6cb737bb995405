use wgpu::{
    BindGroup, BindGroupEntry, BindGroupLayout, BindGroupLayoutEntry,
    ComputePipeline as WgpuComputePipeline, Device, ShaderModule,
};

use crate::config::WORKGROUP_SIZE;

/// One compute entry point with its bind group layout
pub struct ComputeKernel {
    label: &'static str,
    pipeline: WgpuComputePipeline,
    bind_group_layout: BindGroupLayout,
}

impl ComputeKernel {
    /// Create a kernel for `entry_point` of `module` with an explicit bind group layout
    pub fn new(
        device: &Device,
        label: &'static str,
        module: &ShaderModule,
        entry_point: &'static str,
        layout_entries: &[BindGroupLayoutEntry],
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: layout_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            module,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            label,
            pipeline,
            bind_group_layout,
        }
    }

    /// Create a bind group against this kernel's layout
    pub fn create_bind_group(&self, device: &Device, entries: &[BindGroupEntry]) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.label),
            layout: &self.bind_group_layout,
            entries,
        })
    }

    /// Record one dispatch in its own compute pass
    ///
    /// Passes are the synchronization unit: a dispatch sees every write made
    /// by dispatches recorded in earlier passes.
    pub fn dispatch(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        bind_group: &BindGroup,
        threads_x: u32,
        threads_y: u32,
    ) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(self.label),
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(
            threads_x.div_ceil(WORKGROUP_SIZE),
            threads_y.div_ceil(WORKGROUP_SIZE),
            1,
        );
    }
}

/// The full compute shader set, compiled once per context
pub struct Pipelines {
    pub evolve: ComputeKernel,
    /// One IFFT level writing the next ping-pong slot
    pub butterfly: ComputeKernel,
    /// Last column level writing the displacement and slope textures
    pub column_output: ComputeKernel,
    pub normals_analytic: ComputeKernel,
    pub normals_sobel: ComputeKernel,
    pub gerstner: ComputeKernel,
}

impl Pipelines {
    pub fn new(device: &Device) -> Self {
        let evolve_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("evolve-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/evolve.wgsl").into()),
        });
        let ifft_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ifft-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/ifft.wgsl").into()),
        });
        let normals_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("normals-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/normals.wgsl").into()),
        });
        let gerstner_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gerstner-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/gerstner.wgsl").into()),
        });

        let evolve = ComputeKernel::new(
            device,
            "evolve",
            &evolve_shader,
            "main",
            &[
                // Frequency-domain spectrum
                storage_buffer(0, true),
                // Ping-pong slot 0: height, choppy, slope
                storage_buffer(1, false),
                storage_buffer(2, false),
                storage_buffer(3, false),
                uniform_buffer(4),
            ],
        );

        let butterfly = ComputeKernel::new(
            device,
            "ifft-butterfly",
            &ifft_shader,
            "butterfly",
            &[
                // Lookup table
                storage_buffer(0, true),
                // Source slot
                storage_buffer(1, true),
                storage_buffer(2, true),
                storage_buffer(3, true),
                // Destination slot
                storage_buffer(4, false),
                storage_buffer(5, false),
                storage_buffer(6, false),
                uniform_buffer(7),
            ],
        );

        let column_output = ComputeKernel::new(
            device,
            "ifft-column-output",
            &ifft_shader,
            "column_output",
            &[
                storage_buffer(0, true),
                storage_buffer(1, true),
                storage_buffer(2, true),
                storage_buffer(3, true),
                uniform_buffer(7),
                // Displacement and slope textures
                storage_texture(8),
                storage_texture(9),
                uniform_buffer(10),
            ],
        );

        let normal_entries = [
            sampled_texture(0),
            sampled_texture(1),
            storage_texture(2),
            uniform_buffer(3),
        ];
        let normals_analytic = ComputeKernel::new(
            device,
            "normals-analytic",
            &normals_shader,
            "analytic",
            &normal_entries,
        );
        let normals_sobel =
            ComputeKernel::new(device, "normals-sobel", &normals_shader, "sobel", &normal_entries);

        let gerstner = ComputeKernel::new(
            device,
            "gerstner",
            &gerstner_shader,
            "main",
            &[
                storage_buffer(0, true),
                storage_texture(1),
                storage_texture(2),
                uniform_buffer(3),
            ],
        );

        Self {
            evolve,
            butterfly,
            column_output,
            normals_analytic,
            normals_sobel,
            gerstner,
        }
    }
}

fn storage_buffer(binding: u32, read_only: bool) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_buffer(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Rgba32Float is not filterable, so only `textureLoad` is used
fn sampled_texture(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn storage_texture(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::StorageTexture {
            access: wgpu::StorageTextureAccess::WriteOnly,
            format: wgpu::TextureFormat::Rgba32Float,
            view_dimension: wgpu::TextureViewDimension::D2,
        },
        count: None,
    }
}
