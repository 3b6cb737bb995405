use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex data for the surface mesh (position + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Index range and bounds of one tessellation chunk
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SurfaceChunk {
    /// First index of the chunk in `SurfaceMesh::indices`
    pub index_offset: u32,
    pub index_count: u32,
    /// Axis-aligned bounds, padded vertically by the displacement margin
    pub min: Vec3,
    pub max: Vec3,
}

impl SurfaceChunk {
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }
}

/// Flat tessellated plane split into square chunks, with per-chunk culling bounds
#[derive(Clone, Debug)]
pub struct SurfaceMesh {
    pub vertices: Vec<Vertex>,
    /// Indices grouped so every chunk is one contiguous range
    pub indices: Vec<u32>,
    pub chunks: Vec<SurfaceChunk>,
}

impl SurfaceMesh {
    /// Build a `size_m` square plane with `cells` quads per side in
    /// `chunks_per_side²` chunks
    ///
    /// `height_margin` pads each chunk's vertical bounds so displaced vertices
    /// stay inside them. Returns `None` unless `cells` is a positive multiple
    /// of `chunks_per_side`.
    pub fn chunked(
        size_m: f32,
        cells: u32,
        chunks_per_side: u32,
        height_margin: f32,
    ) -> Option<Self> {
        if cells == 0 || chunks_per_side == 0 || cells % chunks_per_side != 0 {
            log::warn!(
                "{} cells cannot be split into {} chunks per side",
                cells,
                chunks_per_side
            );
            return None;
        }

        let step = size_m / cells as f32;
        let half_size = size_m / 2.0;
        let row = cells + 1;

        let mut vertices = Vec::with_capacity((row * row) as usize);
        for z in 0..=cells {
            for x in 0..=cells {
                vertices.push(Vertex {
                    position: [x as f32 * step - half_size, 0.0, z as f32 * step - half_size],
                    uv: [x as f32 / cells as f32, z as f32 / cells as f32],
                });
            }
        }

        let chunk_cells = cells / chunks_per_side;
        let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
        let mut chunks = Vec::with_capacity((chunks_per_side * chunks_per_side) as usize);

        for chunk_z in 0..chunks_per_side {
            for chunk_x in 0..chunks_per_side {
                let index_offset = indices.len() as u32;
                let x0 = chunk_x * chunk_cells;
                let z0 = chunk_z * chunk_cells;

                for z in z0..z0 + chunk_cells {
                    for x in x0..x0 + chunk_cells {
                        let top_left = z * row + x;
                        let top_right = top_left + 1;
                        let bottom_left = top_left + row;
                        let bottom_right = bottom_left + 1;

                        // Counter-clockwise winding seen from above
                        indices.extend_from_slice(&[
                            top_left,
                            bottom_left,
                            top_right,
                            top_right,
                            bottom_left,
                            bottom_right,
                        ]);
                    }
                }

                chunks.push(SurfaceChunk {
                    index_offset,
                    index_count: indices.len() as u32 - index_offset,
                    min: Vec3::new(
                        x0 as f32 * step - half_size,
                        -height_margin,
                        z0 as f32 * step - half_size,
                    ),
                    max: Vec3::new(
                        (x0 + chunk_cells) as f32 * step - half_size,
                        height_margin,
                        (z0 + chunk_cells) as f32 * step - half_size,
                    ),
                });
            }
        }

        Some(Self {
            vertices,
            indices,
            chunks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_counts() {
        let mesh = SurfaceMesh::chunked(100.0, 64, 4, 2.0).unwrap();
        assert_eq!(mesh.vertices.len(), 65 * 65);
        assert_eq!(mesh.indices.len(), 64 * 64 * 6);
        assert_eq!(mesh.chunks.len(), 16);
    }

    #[test]
    fn test_chunks_cover_index_buffer() {
        let mesh = SurfaceMesh::chunked(100.0, 32, 4, 1.0).unwrap();
        let mut expected_offset = 0;
        for chunk in &mesh.chunks {
            assert_eq!(chunk.index_offset, expected_offset);
            assert_eq!(chunk.index_count, 8 * 8 * 6);
            expected_offset += chunk.index_count;
        }
        assert_eq!(expected_offset as usize, mesh.indices.len());
    }

    #[test]
    fn test_chunk_bounds_contain_their_vertices() {
        let mesh = SurfaceMesh::chunked(50.0, 16, 2, 0.5).unwrap();
        for chunk in &mesh.chunks {
            let range = chunk.index_offset as usize..(chunk.index_offset + chunk.index_count) as usize;
            for index in &mesh.indices[range] {
                let [x, y, z] = mesh.vertices[*index as usize].position;
                assert!(chunk.contains_xz(x, z), "Vertex ({}, {}) outside its chunk", x, z);
                assert!(y >= chunk.min.y && y <= chunk.max.y);
            }
        }
    }

    #[test]
    fn test_plane_is_centered() {
        let mesh = SurfaceMesh::chunked(10.0, 4, 1, 0.0).unwrap();
        assert_eq!(mesh.vertices[0].position, [-5.0, 0.0, -5.0]);
        assert_eq!(mesh.vertices.last().unwrap().position, [5.0, 0.0, 5.0]);
        assert_eq!(mesh.vertices.last().unwrap().uv, [1.0, 1.0]);
    }

    #[test]
    fn test_uneven_split_rejected() {
        assert!(SurfaceMesh::chunked(10.0, 10, 3, 0.0).is_none());
        assert!(SurfaceMesh::chunked(10.0, 8, 0, 0.0).is_none());
        assert!(SurfaceMesh::chunked(10.0, 0, 1, 0.0).is_none());
    }
}
