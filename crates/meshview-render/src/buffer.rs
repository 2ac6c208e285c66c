//! GPU-resident geometry with exclusive ownership
//!
//! A [`GpuGeometryBuffer`] is either unallocated or holds exactly one
//! vertex buffer and one index buffer created by its [`GeometryDevice`].
//! Releasing is idempotent and happens automatically on drop.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use crate::vertex::Vertex3D;

/// Errors raised by GPU geometry operations.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("failed to allocate {what} buffer: {reason}")]
    Allocation { what: &'static str, reason: String },

    #[error("cannot upload empty geometry ({vertices} vertices, {indices} indices)")]
    EmptyGeometry { vertices: usize, indices: usize },

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("draw called on unallocated geometry")]
    NotAllocated,

    #[error("failed to record draw: {0}")]
    Draw(String),
}

/// The graphics backend a [`GpuGeometryBuffer`] allocates from.
///
/// Backends own nothing on behalf of the buffers: every handle returned by a
/// `create_*` call is handed back exactly once to the matching `destroy_*`.
pub trait GeometryDevice {
    /// Backend handle for a vertex buffer
    type VertexBuffer;
    /// Backend handle for an index buffer
    type IndexBuffer;
    /// Per-frame command recorder draws are issued into
    type Frame;

    /// Create a static vertex buffer holding exactly `vertices`.
    fn create_vertex_buffer(&self, vertices: &[Vertex3D])
        -> Result<Self::VertexBuffer, GeometryError>;

    /// Create a static index buffer holding exactly `indices`.
    fn create_index_buffer(&self, indices: &[u32]) -> Result<Self::IndexBuffer, GeometryError>;

    /// Free a vertex buffer.
    fn destroy_vertex_buffer(&self, buffer: Self::VertexBuffer);

    /// Free an index buffer.
    fn destroy_index_buffer(&self, buffer: Self::IndexBuffer);

    /// Record an indexed triangle-list draw of `index_count` indices.
    ///
    /// # Safety
    ///
    /// Every index in `indices` must be less than the number of vertices in
    /// `vertices`. Backends do not read the index data back to check this.
    unsafe fn draw_indexed(
        &self,
        frame: &mut Self::Frame,
        vertices: &Self::VertexBuffer,
        indices: &Self::IndexBuffer,
        index_count: u32,
    ) -> Result<(), GeometryError>;
}

/// Live buffers of an allocated [`GpuGeometryBuffer`].
struct Allocation<D: GeometryDevice> {
    vertices: D::VertexBuffer,
    indices: D::IndexBuffer,
    vertex_count: u32,
    index_count: u32,
}

/// Exclusively owned vertex/index buffers for one mesh.
///
/// Not `Clone`: copying geometry goes through a fresh
/// [`GpuGeometryBuffer::upload`] and never shares handles.
pub struct GpuGeometryBuffer<D: GeometryDevice> {
    device: Arc<D>,
    allocation: Option<Allocation<D>>,
}

impl<D: GeometryDevice> GpuGeometryBuffer<D> {
    /// Create an unallocated buffer bound to `device`.
    pub fn new(device: Arc<D>) -> Self {
        Self {
            device,
            allocation: None,
        }
    }

    /// Create a buffer and upload `vertices` and `indices` into it.
    pub fn with_data(
        device: Arc<D>,
        vertices: &[Vertex3D],
        indices: &[u32],
    ) -> Result<Self, GeometryError> {
        let mut buffer = Self::new(device);
        buffer.upload(vertices, indices)?;
        Ok(buffer)
    }

    /// The device this buffer allocates from
    pub fn device(&self) -> &Arc<D> {
        &self.device
    }

    /// Whether GPU storage is currently held
    pub fn is_allocated(&self) -> bool {
        self.allocation.is_some()
    }

    /// Number of indices the next draw covers, zero when unallocated
    pub fn index_count(&self) -> u32 {
        self.allocation.as_ref().map_or(0, |a| a.index_count)
    }

    /// Number of uploaded vertices, zero when unallocated
    pub fn vertex_count(&self) -> u32 {
        self.allocation.as_ref().map_or(0, |a| a.vertex_count)
    }

    /// Replace the contents with freshly allocated buffers.
    ///
    /// Any previous allocation is released first. On failure the buffer is
    /// left unallocated and nothing leaks. Indices must all address a vertex
    /// in `vertices`.
    pub fn upload(&mut self, vertices: &[Vertex3D], indices: &[u32]) -> Result<(), GeometryError> {
        self.release();

        if vertices.is_empty() || indices.is_empty() {
            return Err(GeometryError::EmptyGeometry {
                vertices: vertices.len(),
                indices: indices.len(),
            });
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(GeometryError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }

        let vertex_buffer = self.device.create_vertex_buffer(vertices)?;
        let index_buffer = match self.device.create_index_buffer(indices) {
            Ok(buffer) => buffer,
            Err(e) => {
                self.device.destroy_vertex_buffer(vertex_buffer);
                return Err(e);
            }
        };

        debug!(
            "Uploaded geometry: {} vertices, {} indices",
            vertices.len(),
            indices.len()
        );

        self.allocation = Some(Allocation {
            vertices: vertex_buffer,
            indices: index_buffer,
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
        });
        Ok(())
    }

    /// Record a draw of the whole index range.
    ///
    /// Drawing unallocated geometry is a lifecycle bug upstream and is
    /// reported as [`GeometryError::NotAllocated`].
    pub fn draw(&self, frame: &mut D::Frame) -> Result<(), GeometryError> {
        let Some(allocation) = &self.allocation else {
            error!("Draw requested on unallocated geometry buffer");
            return Err(GeometryError::NotAllocated);
        };

        // SAFETY: `upload` is the only way to allocate, and it refuses any
        // index outside the vertex buffer.
        unsafe {
            self.device.draw_indexed(
                frame,
                &allocation.vertices,
                &allocation.indices,
                allocation.index_count,
            )
        }
    }

    /// Free the GPU storage. Safe to call in any state, any number of times.
    pub fn release(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            self.device.destroy_index_buffer(allocation.indices);
            self.device.destroy_vertex_buffer(allocation.vertices);
            debug!("Released geometry buffer");
        }
    }

    /// Move the allocation out, leaving `self` unallocated.
    ///
    /// The returned buffer owns the same handles; dropping `self`
    /// afterwards performs no GPU calls.
    pub fn take(&mut self) -> Self {
        Self {
            device: self.device.clone(),
            allocation: self.allocation.take(),
        }
    }
}

impl<D: GeometryDevice> Drop for GpuGeometryBuffer<D> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<D: GeometryDevice> fmt::Debug for GpuGeometryBuffer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuGeometryBuffer")
            .field("allocated", &self.is_allocated())
            .field("vertex_count", &self.vertex_count())
            .field("index_count", &self.index_count())
            .finish()
    }
}
