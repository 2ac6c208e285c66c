//! Procedural stand-in meshes

use std::f32::consts::PI;

use glam::Vec3;

use crate::mesh::MeshData;

impl MeshData {
    /// Generate a UV sphere with analytic normals.
    ///
    /// Used as the default marker geometry when no model file is supplied.
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32, color: Vec3) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = 2.0 * PI * seg as f32 / segments as f32;
                let normal = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
                positions.push(normal * radius);
                normals.push(normal);
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;

                indices.extend_from_slice(&[current, current + 1, next]);
                indices.extend_from_slice(&[current + 1, next + 1, next]);
            }
        }

        let colors = vec![color; positions.len()];
        let mut mesh = MeshData::new(positions, colors, indices);
        mesh.normals = normals;
        mesh
    }
}
