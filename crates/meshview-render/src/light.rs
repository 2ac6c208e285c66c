//! Point light with a visible marker mesh

use glam::{Mat4, Vec3};

use crate::buffer::{GeometryDevice, GeometryError};
use crate::model::MeshAsset;

/// Phong lighting parameters.
///
/// With `reject_out_of_range` set, color channels and strengths outside
/// `[0, 1]` are refused and the setter returns `false` without changing
/// anything. The specular exponent must be at least 1 regardless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    color: Vec3,
    ambient: f32,
    diffuse: f32,
    specular: f32,
    specular_exponent: f32,
    reject_out_of_range: bool,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            ambient: 0.3,
            diffuse: 0.5,
            specular: 0.5,
            specular_exponent: 32.0,
            reject_out_of_range: true,
        }
    }
}

fn in_unit_range(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}

impl LightParams {
    /// Default parameters with the given range policy
    pub fn new(reject_out_of_range: bool) -> Self {
        Self {
            reject_out_of_range,
            ..Self::default()
        }
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn ambient(&self) -> f32 {
        self.ambient
    }

    pub fn diffuse(&self) -> f32 {
        self.diffuse
    }

    pub fn specular(&self) -> f32 {
        self.specular
    }

    pub fn specular_exponent(&self) -> f32 {
        self.specular_exponent
    }

    pub fn rejects_out_of_range(&self) -> bool {
        self.reject_out_of_range
    }

    fn accepts(&self, value: f32) -> bool {
        !self.reject_out_of_range || in_unit_range(value)
    }

    pub fn set_color(&mut self, color: Vec3) -> bool {
        if !color.to_array().iter().all(|&c| self.accepts(c)) {
            return false;
        }
        self.color = color;
        true
    }

    pub fn set_ambient(&mut self, strength: f32) -> bool {
        if !self.accepts(strength) {
            return false;
        }
        self.ambient = strength;
        true
    }

    pub fn set_diffuse(&mut self, strength: f32) -> bool {
        if !self.accepts(strength) {
            return false;
        }
        self.diffuse = strength;
        true
    }

    pub fn set_specular(&mut self, strength: f32) -> bool {
        if !self.accepts(strength) {
            return false;
        }
        self.specular = strength;
        true
    }

    pub fn set_specular_exponent(&mut self, exponent: f32) -> bool {
        if exponent.is_nan() || exponent < 1.0 {
            return false;
        }
        self.specular_exponent = exponent;
        true
    }
}

/// A point light. Its position is the position of its marker mesh.
#[derive(Debug)]
pub struct LightSource<D: GeometryDevice> {
    marker: MeshAsset<D>,
    params: LightParams,
}

impl<D: GeometryDevice> LightSource<D> {
    pub fn new(marker: MeshAsset<D>, params: LightParams) -> Self {
        Self { marker, params }
    }

    pub fn params(&self) -> &LightParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut LightParams {
        &mut self.params
    }

    pub fn marker(&self) -> &MeshAsset<D> {
        &self.marker
    }

    pub fn marker_mut(&mut self) -> &mut MeshAsset<D> {
        &mut self.marker
    }

    pub fn position(&self) -> Vec3 {
        self.marker.position()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.marker.set_position(position);
    }

    /// Model matrix of the marker
    pub fn transform(&self) -> Mat4 {
        self.marker.transform()
    }

    /// Place the light on a horizontal circle around `center`.
    pub fn orbit(&mut self, center: Vec3, radius: f32, angle: f32) {
        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * radius;
        self.set_position(center + offset);
    }

    pub fn render(&self, frame: &mut D::Frame) -> Result<(), GeometryError> {
        self.marker.render(frame)
    }

    /// Copy the light, uploading its marker again
    pub fn try_clone(&self) -> Result<Self, GeometryError> {
        Ok(Self {
            marker: self.marker.try_clone()?,
            params: self.params,
        })
    }
}
