use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::MeshError;
use crate::mesh::{MeshData, MeshOptions};
use crate::parser;

/// Identifier of a mesh cached by the [`AssetServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(u64);

impl MeshHandle {
    /// The raw id of this handle.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Mesh registry. Loads, caches, and hands out copies of parsed meshes.
pub struct AssetServer {
    base_path: PathBuf,
    next_id: u64,
    meshes: HashMap<MeshHandle, MeshData>,
    loaded: HashMap<(PathBuf, MeshOptions), MeshHandle>,
}

impl AssetServer {
    /// Create a new AssetServer rooted at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        info!("AssetServer created with base path: {}", base_path.display());
        Self {
            base_path,
            next_id: 1,
            meshes: HashMap::new(),
            loaded: HashMap::new(),
        }
    }

    /// Resolve a relative asset path against the base path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    fn insert(&mut self, mesh: MeshData) -> MeshHandle {
        let handle = MeshHandle(self.next_id);
        self.next_id += 1;
        self.meshes.insert(handle, mesh);
        handle
    }

    /// Load a mesh file with the given options.
    /// Loading the same path with the same options again returns the cached handle.
    pub fn load_mesh(
        &mut self,
        path: &Path,
        options: MeshOptions,
    ) -> Result<MeshHandle, MeshError> {
        let full_path = self.resolve(path);
        let key = (full_path, options);

        if let Some(&handle) = self.loaded.get(&key) {
            return Ok(handle);
        }

        let mesh = parser::load_mesh(&key.0, &options)?;
        info!(
            "Loaded '{}' ({} vertices, {} triangles)",
            key.0.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        let handle = self.insert(mesh);
        self.loaded.insert(key, handle);
        Ok(handle)
    }

    /// Register generated geometry that has no backing file.
    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshHandle {
        self.insert(mesh)
    }

    /// Get a reference to a loaded mesh by its handle.
    pub fn get_mesh(&self, handle: MeshHandle) -> Option<&MeshData> {
        self.meshes.get(&handle)
    }

    /// Get an owned copy of a loaded mesh, for an asset that will mutate it.
    pub fn clone_mesh(&self, handle: MeshHandle) -> Option<MeshData> {
        self.get_mesh(handle).cloned()
    }

    /// Check if a handle refers to a loaded mesh.
    pub fn is_mesh_loaded(&self, handle: MeshHandle) -> bool {
        self.meshes.contains_key(&handle)
    }

    /// The base path this server resolves relative paths against.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::fs;

    const TRIANGLE: &str = "3\n1 0 0\n2 0 0\n1 1 0\n0\n1\n0 1 2\n";

    #[test]
    fn missing_file_returns_error() {
        let mut server = AssetServer::new("/nonexistent");
        let result = server.load_mesh(Path::new("does_not_exist.txt"), MeshOptions::default());
        match result.unwrap_err() {
            MeshError::NotFound(path) => {
                assert_eq!(path, PathBuf::from("/nonexistent/does_not_exist.txt"))
            }
            other => panic!("expected NotFound, got: {:?}", other),
        }
    }

    #[test]
    fn resolve_absolute_path() {
        let server = AssetServer::new("/home/user/assets");
        assert_eq!(
            server.resolve(Path::new("/absolute/model.txt")),
            PathBuf::from("/absolute/model.txt")
        );
    }

    #[test]
    fn resolve_relative_path() {
        let server = AssetServer::new("/home/user/assets");
        assert_eq!(
            server.resolve(Path::new("models/model.txt")),
            PathBuf::from("/home/user/assets/models/model.txt")
        );
    }

    #[test]
    fn loads_are_cached_per_options() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tri.txt"), TRIANGLE).unwrap();

        let mut server = AssetServer::new(dir.path());
        let raw = MeshOptions {
            centered: false,
            compute_normals: true,
        };
        let centered = MeshOptions {
            centered: true,
            ..raw
        };

        let first = server.load_mesh(Path::new("tri.txt"), raw).unwrap();
        let again = server.load_mesh(Path::new("tri.txt"), raw).unwrap();
        let other = server.load_mesh(Path::new("tri.txt"), centered).unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(
            server.get_mesh(first).unwrap().positions[0],
            Vec3::new(1.0, 0.0, 0.0)
        );
        assert!(server.get_mesh(other).unwrap().is_centered());
    }

    #[test]
    fn clones_are_independent() {
        let mut server = AssetServer::new("/unused");
        let handle = server.add_mesh(MeshData::uv_sphere(1.0, 4, 3, Vec3::ONE));

        let mut copy = server.clone_mesh(handle).unwrap();
        copy.center();
        copy.positions[0] = Vec3::splat(9.0);

        assert!(server.is_mesh_loaded(handle));
        assert_ne!(server.get_mesh(handle).unwrap().positions[0], Vec3::splat(9.0));
    }
}
