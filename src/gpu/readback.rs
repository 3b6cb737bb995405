use std::sync::mpsc;

use wgpu::{Buffer, Texture};

use crate::gpu::context::{GpuContext, GpuError};

/// Copy `size` bytes of `source` to the CPU
///
/// `source` needs `COPY_SRC` usage. Blocks until the GPU has finished all
/// previously submitted work.
pub fn read_buffer(gpu: &GpuContext, source: &Buffer, size: u64) -> Result<Vec<u8>, GpuError> {
    let staging = create_staging(gpu, size);

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("readback-encoder"),
        });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
    gpu.queue.submit(std::iter::once(encoder.finish()));

    map_blocking(gpu, &staging)?;
    let data = staging.slice(..).get_mapped_range().to_vec();
    staging.unmap();
    Ok(data)
}

/// Copy a square Rgba32Float texture to the CPU, row-major
pub fn read_texture_rgba32f(gpu: &GpuContext, texture: &Texture) -> Result<Vec<[f32; 4]>, GpuError> {
    let width = texture.width();
    let height = texture.height();
    let texel_size = std::mem::size_of::<[f32; 4]>() as u32;
    let unpadded_row = width * texel_size;
    let padded_row = unpadded_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

    let staging = create_staging(gpu, u64::from(padded_row) * u64::from(height));

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("texture-readback-encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    gpu.queue.submit(std::iter::once(encoder.finish()));

    map_blocking(gpu, &staging)?;
    let texels = {
        let data = staging.slice(..).get_mapped_range();
        let mut texels = Vec::with_capacity((width * height) as usize);
        for row in data.chunks_exact(padded_row as usize) {
            texels.extend_from_slice(bytemuck::cast_slice::<u8, [f32; 4]>(
                &row[..unpadded_row as usize],
            ));
        }
        texels
    };
    staging.unmap();
    Ok(texels)
}

fn create_staging(gpu: &GpuContext, size: u64) -> Buffer {
    gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback-staging"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn map_blocking(gpu: &GpuContext, staging: &Buffer) -> Result<(), GpuError> {
    let (tx, rx) = mpsc::channel();
    staging
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
    gpu.device.poll(wgpu::Maintain::Wait);

    rx.recv()
        .map_err(|_| GpuError::BufferMapping("Map callback dropped".into()))?
        .map_err(|e| GpuError::BufferMapping(e.to_string()))
}
