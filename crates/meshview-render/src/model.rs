//! Renderable mesh: CPU geometry, model transform and GPU buffers

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::{Mat4, Vec3};
use meshview_assets::{MeshData, MeshError, MeshOptions};
use meshview_core::ModelTransform;
use tracing::{debug, info};

use crate::buffer::{GeometryDevice, GeometryError, GpuGeometryBuffer};
use crate::vertex::Vertex3D;

/// Errors raised while building a [`MeshAsset`].
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// A mesh with its transform and exclusively owned GPU geometry.
///
/// Moving a `MeshAsset` moves its buffers. Copies are made with
/// [`MeshAsset::try_clone`], which uploads the geometry again.
#[derive(Debug)]
pub struct MeshAsset<D: GeometryDevice> {
    data: MeshData,
    transform: ModelTransform,
    geometry: GpuGeometryBuffer<D>,
    source: Option<PathBuf>,
}

impl<D: GeometryDevice> MeshAsset<D> {
    /// Load a mesh file and upload it.
    ///
    /// Nothing is allocated on `device` unless the file parses and validates.
    pub fn from_file(device: Arc<D>, path: &Path, options: &MeshOptions) -> Result<Self, ModelError> {
        let data = meshview_assets::load_mesh(path, options)?;
        let mut asset = Self::from_data(device, data)?;
        asset.source = Some(path.to_path_buf());
        info!(
            "Model '{}' ready ({} vertices, {} triangles)",
            path.display(),
            asset.data.vertex_count(),
            asset.data.triangle_count()
        );
        Ok(asset)
    }

    /// Upload already parsed geometry.
    ///
    /// A mesh without triangles uploads nothing and renders as a no-op.
    pub fn from_data(device: Arc<D>, data: MeshData) -> Result<Self, GeometryError> {
        let geometry = Self::upload(device, &data)?;
        Ok(Self {
            data,
            transform: ModelTransform::new(),
            geometry,
            source: None,
        })
    }

    /// Record a draw of the whole mesh into `frame`.
    pub fn render(&self, frame: &mut D::Frame) -> Result<(), GeometryError> {
        if self.data.indices.is_empty() {
            return Ok(());
        }
        self.geometry.draw(frame)
    }

    /// Deep copy with a fresh GPU upload; the copy never shares handles.
    pub fn try_clone(&self) -> Result<Self, GeometryError> {
        let mut copy = Self::from_data(self.geometry.device().clone(), self.data.clone())?;
        copy.transform = self.transform;
        copy.source = self.source.clone();
        Ok(copy)
    }

    /// Center the vertex data on its centroid and re-upload.
    ///
    /// Returns `false` if the mesh was already centered, in which case no GPU
    /// work is done. On error the asset keeps its old data and buffers.
    pub fn center(&mut self) -> Result<bool, GeometryError> {
        if self.data.is_centered() {
            return Ok(false);
        }

        let mut data = self.data.clone();
        if !data.center() {
            self.data = data;
            return Ok(false);
        }
        self.geometry = Self::upload(self.geometry.device().clone(), &data)?;
        self.data = data;
        debug!("Re-uploaded centered geometry");
        Ok(true)
    }

    fn upload(device: Arc<D>, data: &MeshData) -> Result<GpuGeometryBuffer<D>, GeometryError> {
        if data.indices.is_empty() {
            debug!("Mesh has no triangles, skipping upload");
            return Ok(GpuGeometryBuffer::new(device));
        }
        GpuGeometryBuffer::with_data(device, &Vertex3D::from_mesh(data), &data.indices)
    }

    pub fn data(&self) -> &MeshData {
        &self.data
    }

    pub fn geometry(&self) -> &GpuGeometryBuffer<D> {
        &self.geometry
    }

    /// File the mesh was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The model matrix fed to the renderer
    pub fn transform(&self) -> Mat4 {
        self.transform.matrix()
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.set_position(position);
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.set_scale(scale);
    }

    pub fn set_rotation(&mut self, euler: Vec3) {
        self.transform.set_rotation(euler);
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.transform.translate(delta);
    }

    pub fn scale(&mut self, factor: Vec3) {
        self.transform.scale(factor);
    }

    /// Rotate about the current position (euler angles, radians)
    pub fn rotate(&mut self, euler: Vec3) {
        self.transform.rotate(euler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostGeometryDevice;
    use meshview_assets::MalformedReason;
    use std::fs;

    const TRIANGLE: &str = "3\n0 0 0\n1 0 0\n0 1 0\n0\n1\n0 1 2\n";

    fn write_mesh(dir: &tempfile::TempDir, name: &str, source: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn single_triangle_loads_and_draws() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_mesh(&dir, "tri.txt", TRIANGLE);
        let device = Arc::new(HostGeometryDevice::new());

        let model = MeshAsset::from_file(device.clone(), &path, &MeshOptions::default()).unwrap();
        assert_eq!(model.data().vertex_count(), 3);
        assert_eq!(model.data().triangle_count(), 1);
        for normal in &model.data().normals {
            assert!((*normal - Vec3::Z).length() < 1e-5);
        }
        assert!(model.data().colors.iter().all(|c| *c == Vec3::ONE));
        assert_eq!(model.source(), Some(path.as_path()));
        assert_eq!(model.transform(), Mat4::IDENTITY);

        let mut frame = device.begin_frame();
        model.render(&mut frame).unwrap();
        assert_eq!(frame.draws.len(), 1);
        assert_eq!(frame.draws[0].index_count, 3);
    }

    #[test]
    fn malformed_file_allocates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_mesh(&dir, "bad.txt", "3\n0 0 0\n1 0 0\n0 1 0\n0\n3\n0 1 2 0 2 1 2\n");
        let device = Arc::new(HostGeometryDevice::new());

        let err = MeshAsset::from_file(device.clone(), &path, &MeshOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Mesh(MeshError::Malformed {
                reason: MalformedReason::IndexCountNotMultipleOfThree(7),
                ..
            })
        ));
        assert_eq!(device.total_allocations(), 0);
    }

    #[test]
    fn missing_file_is_not_found() {
        let device = Arc::new(HostGeometryDevice::new());
        let err = MeshAsset::from_file(device, Path::new("/no/such/mesh.txt"), &MeshOptions::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::Mesh(MeshError::NotFound(_))));
    }

    #[test]
    fn try_clone_uploads_fresh_buffers() {
        let device = Arc::new(HostGeometryDevice::new());
        let mut original =
            MeshAsset::from_data(device.clone(), MeshData::uv_sphere(1.0, 6, 4, Vec3::ONE)).unwrap();
        original.set_position(Vec3::new(1.0, 2.0, 3.0));

        let copy = original.try_clone().unwrap();
        assert_eq!(device.live_buffers(), 4);
        assert_eq!(copy.position(), original.position());
        assert_eq!(copy.data().positions, original.data().positions);

        let mut frame = device.begin_frame();
        original.render(&mut frame).unwrap();
        copy.render(&mut frame).unwrap();
        assert_ne!(frame.draws[0].vertex_buffer, frame.draws[1].vertex_buffer);
        assert_ne!(frame.draws[0].index_buffer, frame.draws[1].index_buffer);

        drop(original);
        assert_eq!(device.live_buffers(), 2);
        copy.render(&mut frame).unwrap();
    }

    #[test]
    fn moving_keeps_a_single_allocation() {
        let device = Arc::new(HostGeometryDevice::new());
        let model =
            MeshAsset::from_data(device.clone(), MeshData::uv_sphere(1.0, 6, 4, Vec3::ONE)).unwrap();

        let mut models = Vec::new();
        models.push(model);
        assert_eq!(device.live_buffers(), 2);
        assert_eq!(device.total_allocations(), 2);

        models.clear();
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.total_releases(), 2);
    }

    #[test]
    fn center_reuploads_once() {
        let device = Arc::new(HostGeometryDevice::new());
        let data = MeshData::new(
            vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0), Vec3::new(2.0, 3.0, 0.0)],
            Vec::new(),
            vec![0, 1, 2],
        );
        let mut model = MeshAsset::from_data(device.clone(), data).unwrap();

        assert!(model.center().unwrap());
        assert_eq!(device.total_allocations(), 4);
        assert_eq!(device.live_buffers(), 2);
        let centered = model.data().positions.clone();

        assert!(!model.center().unwrap());
        assert_eq!(device.total_allocations(), 4);
        assert_eq!(model.data().positions, centered);
        assert!(model.data().centroid().unwrap().length() < 1e-6);
    }

    #[test]
    fn out_of_range_indices_are_refused() {
        let device = Arc::new(HostGeometryDevice::new());
        let data = MeshData::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            Vec::new(),
            vec![0, 1, 7],
        );

        let err = MeshAsset::from_data(device.clone(), data).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::IndexOutOfRange { index: 7, vertex_count: 3 }
        ));
        assert_eq!(device.total_allocations(), 0);
    }

    #[test]
    fn failed_center_keeps_asset_renderable() {
        let device = Arc::new(HostGeometryDevice::with_capacity(4));
        let data = MeshData::new(
            vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0), Vec3::new(2.0, 3.0, 0.0)],
            Vec::new(),
            vec![0, 1, 2],
        );
        let mut model = MeshAsset::from_data(device.clone(), data.clone()).unwrap();
        let other = MeshAsset::from_data(device.clone(), data).unwrap();
        let before = model.data().positions.clone();

        assert!(matches!(model.center(), Err(GeometryError::Allocation { .. })));
        assert!(!model.data().is_centered());
        assert_eq!(model.data().positions, before);
        assert!(model.geometry().is_allocated());
        let mut frame = device.begin_frame();
        model.render(&mut frame).unwrap();
        assert_eq!(frame.draws.len(), 1);

        drop(other);
        assert!(model.center().unwrap());
        assert!(model.geometry().is_allocated());
        assert_eq!(device.live_buffers(), 2);
        assert!(model.data().centroid().unwrap().length() < 1e-6);
    }

    #[test]
    fn mesh_without_triangles_loads_and_draws_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_mesh(&dir, "points.txt", "2\n0 0 0\n1 0 0\n0\n0\n");
        let device = Arc::new(HostGeometryDevice::new());

        let mut model = MeshAsset::from_file(device.clone(), &path, &MeshOptions::default()).unwrap();
        assert_eq!(model.data().vertex_count(), 2);
        assert!(!model.geometry().is_allocated());
        assert_eq!(device.total_allocations(), 0);

        let mut frame = device.begin_frame();
        model.render(&mut frame).unwrap();
        assert!(frame.draws.is_empty());

        assert!(model.center().unwrap());
        assert_eq!(device.total_allocations(), 0);
        let copy = model.try_clone().unwrap();
        copy.render(&mut frame).unwrap();
        assert!(frame.draws.is_empty());
    }

    #[test]
    fn rotation_keeps_position() {
        let device = Arc::new(HostGeometryDevice::new());
        let mut model =
            MeshAsset::from_data(device, MeshData::uv_sphere(1.0, 6, 4, Vec3::ONE)).unwrap();

        model.set_position(Vec3::new(5.0, -1.0, 2.0));
        model.rotate(Vec3::new(0.3, 1.2, -0.7));
        assert!((model.position() - Vec3::new(5.0, -1.0, 2.0)).length() < 1e-5);

        model.translate(Vec3::X);
        model.scale(Vec3::splat(2.0));
        assert_ne!(model.transform(), Mat4::IDENTITY);
    }
}
