//! Meshview Render - GPU geometry and frame composition
//!
//! Owns the upload, draw and release of mesh geometry through a
//! [`GeometryDevice`] backend (vulkano, or host memory when no GPU is
//! available), and composes the per-frame shader inputs for models and
//! lights.

pub mod buffer;
pub mod host;
pub mod light;
pub mod model;
pub mod scene;
pub mod vertex;
pub mod vulkan;

pub use buffer::{GeometryDevice, GeometryError, GpuGeometryBuffer};
pub use host::{HostDraw, HostFrame, HostGeometryDevice};
pub use light::{LightParams, LightSource};
pub use model::{MeshAsset, ModelError};
pub use scene::{
    CameraView, FlatPushConstants, FlatUniforms, LitPushConstants, LitUniforms, UniformBlock,
    UniformSink, UniformValue,
};
pub use vertex::Vertex3D;
pub use vulkan::VulkanoGeometryDevice;
