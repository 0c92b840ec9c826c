//! Triangle soup meshes for the binary scene.

use super::triangulate::{open_ring, triangulate};
use crate::types::Polygon;
use glam::DVec3;

/// A triangle mesh in which every triangle owns three fresh vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions, three per triangle.
    pub positions: Vec<[f32; 3]>,
    /// Triangle indices, sequential (3 per triangle).
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangulate `polygons` after subtracting `offset` from every vertex.
    pub fn from_polygons(polygons: &[Polygon], offset: DVec3) -> Self {
        let mut mesh = Mesh::new();
        for polygon in polygons {
            let ring = open_ring(polygon);
            for [a, b, c] in triangulate(polygon) {
                mesh.add_triangle(ring[a] - offset, ring[b] - offset, ring[c] - offset);
            }
        }
        mesh
    }

    /// Append one triangle as three new vertices.
    pub fn add_triangle(&mut self, v0: DVec3, v1: DVec3, v2: DVec3) {
        for v in [v0, v1, v2] {
            let index = self.positions.len() as u32;
            self.positions.push(v.as_vec3().to_array());
            self.indices.push(index);
        }
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Check if the mesh is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Per-axis minimum and maximum of the positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        if self.is_empty() {
            return None;
        }
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in &self.positions {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Some((min, max))
    }

    /// Positions as little-endian float32 bytes.
    pub fn positions_bytes(&self) -> Vec<u8> {
        self.positions
            .iter()
            .flatten()
            .flat_map(|c| c.to_le_bytes())
            .collect()
    }

    /// Indices as little-endian uint32 bytes.
    pub fn indices_bytes(&self) -> Vec<u8> {
        self.indices.iter().flat_map(|i| i.to_le_bytes()).collect()
    }
}
