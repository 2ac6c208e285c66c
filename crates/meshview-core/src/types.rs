//! Model transform shared by meshes and lights

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Affine model matrix of a mesh.
///
/// Absolute setters overwrite matrix terms directly, relative operations
/// compose into the existing matrix. Rotations always pivot around the
/// current position, so rotating never moves the object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelTransform {
    matrix: Mat4,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

impl ModelTransform {
    /// Identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// The model matrix
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Translation column of the matrix
    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// Overwrite the translation column
    pub fn set_position(&mut self, position: Vec3) {
        self.matrix.w_axis = position.extend(1.0);
    }

    /// Overwrite the diagonal scale terms.
    ///
    /// This does not compose with an existing rotation: only the three
    /// diagonal entries change.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.matrix.x_axis.x = scale.x;
        self.matrix.y_axis.y = scale.y;
        self.matrix.z_axis.z = scale.z;
    }

    /// Replace rotation and scale with the given euler rotation (radians),
    /// keeping the current position.
    pub fn set_rotation(&mut self, euler: Vec3) {
        self.matrix = Mat4::from_translation(self.position()) * euler_xyz(euler);
    }

    /// Translate in the model's local frame
    pub fn translate(&mut self, delta: Vec3) {
        self.matrix *= Mat4::from_translation(delta);
    }

    /// Scale in the model's local frame
    pub fn scale(&mut self, factor: Vec3) {
        self.matrix *= Mat4::from_scale(factor);
    }

    /// Rotate by euler angles (radians, X then Y then Z) around the current position
    pub fn rotate(&mut self, euler: Vec3) {
        let pivot = self.position();
        self.matrix = Mat4::from_translation(pivot)
            * euler_xyz(euler)
            * Mat4::from_translation(-pivot)
            * self.matrix;
    }
}

impl From<ModelTransform> for Mat4 {
    fn from(transform: ModelTransform) -> Self {
        transform.matrix
    }
}

/// Rotation about X, then Y, then Z, composed the way successive
/// right-multiplied axis rotations are.
fn euler_xyz(euler: Vec3) -> Mat4 {
    Mat4::from_rotation_x(euler.x) * Mat4::from_rotation_y(euler.y) * Mat4::from_rotation_z(euler.z)
}
