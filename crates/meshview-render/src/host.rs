//! CPU-resident geometry backend
//!
//! Keeps uploaded data in host memory and records draws instead of issuing
//! them. Used when no Vulkan device is available, and to observe buffer
//! lifetimes.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tracing::trace;

use crate::buffer::{GeometryDevice, GeometryError};
use crate::vertex::Vertex3D;

/// Vertex data held in host memory
#[derive(Debug)]
pub struct HostVertexBuffer {
    pub id: u64,
    pub data: Vec<Vertex3D>,
}

/// Index data held in host memory
#[derive(Debug)]
pub struct HostIndexBuffer {
    pub id: u64,
    pub data: Vec<u32>,
}

/// One recorded indexed draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostDraw {
    pub vertex_buffer: u64,
    pub index_buffer: u64,
    pub vertex_count: u32,
    pub index_count: u32,
}

/// Draws recorded during one frame
#[derive(Debug, Default)]
pub struct HostFrame {
    pub draws: Vec<HostDraw>,
}

/// Geometry backend that allocates from host memory.
#[derive(Debug)]
pub struct HostGeometryDevice {
    capacity: Option<usize>,
    next_id: AtomicU64,
    live: AtomicUsize,
    allocations: AtomicUsize,
    releases: AtomicUsize,
}

impl Default for HostGeometryDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HostGeometryDevice {
    /// Create a device without an allocation limit
    pub fn new() -> Self {
        Self {
            capacity: None,
            next_id: AtomicU64::new(1),
            live: AtomicUsize::new(0),
            allocations: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
        }
    }

    /// Create a device that refuses to hold more than `max_buffers` at once
    pub fn with_capacity(max_buffers: usize) -> Self {
        Self {
            capacity: Some(max_buffers),
            ..Self::new()
        }
    }

    /// Start recording a frame
    pub fn begin_frame(&self) -> HostFrame {
        HostFrame::default()
    }

    /// Buffers currently allocated
    pub fn live_buffers(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// Buffers allocated over the device's lifetime
    pub fn total_allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Buffers released over the device's lifetime
    pub fn total_releases(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }

    fn allocate(&self, what: &'static str) -> Result<u64, GeometryError> {
        if let Some(capacity) = self.capacity {
            if self.live_buffers() >= capacity {
                return Err(GeometryError::Allocation {
                    what,
                    reason: format!("host device limit of {} buffers reached", capacity),
                });
            }
        }

        self.live.fetch_add(1, Ordering::Relaxed);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!("Allocated host {} buffer #{}", what, id);
        Ok(id)
    }

    fn free(&self, what: &'static str, id: u64) {
        self.live.fetch_sub(1, Ordering::Relaxed);
        self.releases.fetch_add(1, Ordering::Relaxed);
        trace!("Freed host {} buffer #{}", what, id);
    }
}

impl GeometryDevice for HostGeometryDevice {
    type VertexBuffer = HostVertexBuffer;
    type IndexBuffer = HostIndexBuffer;
    type Frame = HostFrame;

    fn create_vertex_buffer(&self, vertices: &[Vertex3D]) -> Result<HostVertexBuffer, GeometryError> {
        Ok(HostVertexBuffer {
            id: self.allocate("vertex")?,
            data: vertices.to_vec(),
        })
    }

    fn create_index_buffer(&self, indices: &[u32]) -> Result<HostIndexBuffer, GeometryError> {
        Ok(HostIndexBuffer {
            id: self.allocate("index")?,
            data: indices.to_vec(),
        })
    }

    fn destroy_vertex_buffer(&self, buffer: HostVertexBuffer) {
        self.free("vertex", buffer.id);
    }

    fn destroy_index_buffer(&self, buffer: HostIndexBuffer) {
        self.free("index", buffer.id);
    }

    unsafe fn draw_indexed(
        &self,
        frame: &mut HostFrame,
        vertices: &HostVertexBuffer,
        indices: &HostIndexBuffer,
        index_count: u32,
    ) -> Result<(), GeometryError> {
        if index_count as usize > indices.data.len() {
            return Err(GeometryError::Draw(format!(
                "{} indices requested from a buffer of {}",
                index_count,
                indices.data.len()
            )));
        }

        frame.draws.push(HostDraw {
            vertex_buffer: vertices.id,
            index_buffer: indices.id,
            vertex_count: vertices.data.len() as u32,
            index_count,
        });
        Ok(())
    }
}
