//! Vulkano geometry backend

use std::sync::Arc;

use tracing::trace;
use vulkano::buffer::{Buffer, BufferCreateInfo, BufferUsage, Subbuffer};
use vulkano::command_buffer::{AutoCommandBufferBuilder, PrimaryAutoCommandBuffer};
use vulkano::device::Device;
use vulkano::memory::allocator::{AllocationCreateInfo, MemoryTypeFilter, StandardMemoryAllocator};

use crate::buffer::{GeometryDevice, GeometryError};
use crate::vertex::Vertex3D;

/// Allocates geometry in Vulkan device memory and records draws into
/// primary command buffers.
pub struct VulkanoGeometryDevice {
    device: Arc<Device>,
    allocator: Arc<StandardMemoryAllocator>,
}

impl VulkanoGeometryDevice {
    pub fn new(device: Arc<Device>) -> Self {
        let allocator = Arc::new(StandardMemoryAllocator::new_default(device.clone()));
        Self { device, allocator }
    }

    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    fn allocation_info() -> AllocationCreateInfo {
        AllocationCreateInfo {
            memory_type_filter: MemoryTypeFilter::PREFER_DEVICE
                | MemoryTypeFilter::HOST_SEQUENTIAL_WRITE,
            ..Default::default()
        }
    }
}

impl GeometryDevice for VulkanoGeometryDevice {
    type VertexBuffer = Subbuffer<[Vertex3D]>;
    type IndexBuffer = Subbuffer<[u32]>;
    type Frame = AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>;

    fn create_vertex_buffer(
        &self,
        vertices: &[Vertex3D],
    ) -> Result<Subbuffer<[Vertex3D]>, GeometryError> {
        let buffer = Buffer::from_iter(
            self.allocator.clone(),
            BufferCreateInfo {
                usage: BufferUsage::VERTEX_BUFFER,
                ..Default::default()
            },
            Self::allocation_info(),
            vertices.iter().copied(),
        )
        .map_err(|e| GeometryError::Allocation {
            what: "vertex",
            reason: e.to_string(),
        })?;

        trace!("Created vertex buffer ({} bytes)", buffer.size());
        Ok(buffer)
    }

    fn create_index_buffer(&self, indices: &[u32]) -> Result<Subbuffer<[u32]>, GeometryError> {
        let buffer = Buffer::from_iter(
            self.allocator.clone(),
            BufferCreateInfo {
                usage: BufferUsage::INDEX_BUFFER,
                ..Default::default()
            },
            Self::allocation_info(),
            indices.iter().copied(),
        )
        .map_err(|e| GeometryError::Allocation {
            what: "index",
            reason: e.to_string(),
        })?;

        trace!("Created index buffer ({} bytes)", buffer.size());
        Ok(buffer)
    }

    // Memory returns to the allocator once the last command buffer
    // referencing the subbuffer is dropped.
    fn destroy_vertex_buffer(&self, buffer: Subbuffer<[Vertex3D]>) {
        drop(buffer);
    }

    fn destroy_index_buffer(&self, buffer: Subbuffer<[u32]>) {
        drop(buffer);
    }

    unsafe fn draw_indexed(
        &self,
        frame: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
        vertices: &Subbuffer<[Vertex3D]>,
        indices: &Subbuffer<[u32]>,
        index_count: u32,
    ) -> Result<(), GeometryError> {
        if u64::from(index_count) > indices.len() {
            return Err(GeometryError::Draw(format!(
                "{} indices requested from a buffer of {}",
                index_count,
                indices.len()
            )));
        }

        frame
            .bind_vertex_buffers(0, vertices.clone())
            .map_err(|e| GeometryError::Draw(e.to_string()))?
            .bind_index_buffer(indices.clone())
            .map_err(|e| GeometryError::Draw(e.to_string()))?;

        // SAFETY: `index_count` fits the bound index buffer, and the caller
        // guarantees every index addresses a vertex in `vertices`.
        unsafe { frame.draw_indexed(index_count, 1, 0, 0, 0) }
            .map_err(|e| GeometryError::Draw(e.to_string()))?;
        Ok(())
    }
}
