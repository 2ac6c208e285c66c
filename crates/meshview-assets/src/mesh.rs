use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::MalformedReason;
use crate::normals;

/// Color given to vertices the file supplies no color for.
pub const DEFAULT_VERTEX_COLOR: Vec3 = Vec3::ONE;

/// Post-processing applied to a mesh right after it is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshOptions {
    /// Move the local origin to the centroid of all vertex positions
    pub centered: bool,
    /// Derive per-vertex normals from the triangles
    pub compute_normals: bool,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            centered: false,
            compute_normals: true,
        }
    }
}

/// CPU-side geometry of a mesh (renderer-agnostic).
///
/// `positions`, `normals` and `colors` always have the same length;
/// `indices` is a flat triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub indices: Vec<u32>,
    centered: bool,
}

impl MeshData {
    /// Build mesh data, reconciling the color list with the vertex count.
    ///
    /// Missing colors are padded with opaque white, surplus colors are
    /// dropped. Normals start out zeroed.
    pub fn new(positions: Vec<Vec3>, mut colors: Vec<Vec3>, indices: Vec<u32>) -> Self {
        colors.resize(positions.len(), DEFAULT_VERTEX_COLOR);
        Self {
            normals: vec![Vec3::ZERO; positions.len()],
            positions,
            colors,
            indices,
            centered: false,
        }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate over the triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Check the triangle list against the vertex array.
    pub fn validate(&self) -> Result<(), MalformedReason> {
        if self.indices.len() % 3 != 0 {
            return Err(MalformedReason::IndexCountNotMultipleOfThree(
                self.indices.len(),
            ));
        }

        let vertex_count = self.vertex_count();
        match self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            Some(&index) => Err(MalformedReason::IndexOutOfRange {
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }

    /// Recompute every vertex normal from the triangle list.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range; see [`MeshData::validate`].
    pub fn compute_normals(&mut self) {
        self.normals = normals::compute_vertex_normals(&self.positions, &self.indices);
    }

    /// Arithmetic mean of all vertex positions
    pub fn centroid(&self) -> Option<Vec3> {
        if self.positions.is_empty() {
            return None;
        }
        let sum: Vec3 = self.positions.iter().copied().sum();
        Some(sum / self.positions.len() as f32)
    }

    /// Subtract the centroid from every position.
    ///
    /// Only the first call moves vertices; returns whether anything changed.
    pub fn center(&mut self) -> bool {
        if self.centered {
            return false;
        }
        self.centered = true;

        let Some(centroid) = self.centroid() else {
            return false;
        };
        for position in &mut self.positions {
            *position -= centroid;
        }
        true
    }

    /// Whether [`MeshData::center`] has been applied
    pub fn is_centered(&self) -> bool {
        self.centered
    }

    /// Apply load-time post-processing
    pub fn apply_options(&mut self, options: &MeshOptions) {
        if options.centered {
            self.center();
        }
        if options.compute_normals {
            self.compute_normals();
        }
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
        )
    }
}
