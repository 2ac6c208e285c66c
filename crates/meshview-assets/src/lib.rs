//! Meshview Assets - Mesh loading and management
//!
//! Provides the text mesh format reader, per-vertex normal generation,
//! centering, and a mesh cache for the meshview viewer.

mod error;
mod mesh;
mod normals;
mod parser;
mod primitives;
mod server;

pub use error::{MalformedReason, MeshError, MeshSection};
pub use mesh::{MeshData, MeshOptions, DEFAULT_VERTEX_COLOR};
pub use normals::compute_vertex_normals;
pub use parser::{load_mesh, parse_mesh};
pub use server::{AssetServer, MeshHandle};
