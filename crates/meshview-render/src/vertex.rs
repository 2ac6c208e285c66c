//! Interleaved vertex layout uploaded to the GPU

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use meshview_assets::MeshData;
use vulkano::format::Format;
use vulkano::pipeline::graphics::vertex_input::{
    VertexBufferDescription, VertexInputRate, VertexMemberInfo,
};

/// Standard 3D vertex with position, normal, and color
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex3D {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 4]) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }

    /// Interleave the attribute arrays of a mesh. Colors become opaque.
    pub fn from_mesh(mesh: &MeshData) -> Vec<Self> {
        mesh.positions
            .iter()
            .zip(&mesh.normals)
            .zip(&mesh.colors)
            .map(|((position, normal), color)| {
                Self::new(
                    position.to_array(),
                    normal.to_array(),
                    color.extend(1.0).to_array(),
                )
            })
            .collect()
    }

    /// Vulkano vertex buffer description, with members named after the
    /// shader inputs `position`, `normal` and `color`.
    pub fn per_vertex() -> VertexBufferDescription {
        let stride = std::mem::size_of::<Self>() as u32;
        let member = |offset: usize, format: Format| VertexMemberInfo {
            offset: offset as u32,
            format,
            num_elements: 1,
            stride,
        };

        VertexBufferDescription {
            stride,
            input_rate: VertexInputRate::Vertex,
            members: HashMap::from([
                (
                    "position".to_string(),
                    member(
                        std::mem::offset_of!(Self, position),
                        Format::R32G32B32_SFLOAT,
                    ),
                ),
                (
                    "normal".to_string(),
                    member(std::mem::offset_of!(Self, normal), Format::R32G32B32_SFLOAT),
                ),
                (
                    "color".to_string(),
                    member(
                        std::mem::offset_of!(Self, color),
                        Format::R32G32B32A32_SFLOAT,
                    ),
                ),
            ]),
        }
    }
}
