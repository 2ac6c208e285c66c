//! Per-frame shader inputs

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};

use crate::buffer::GeometryDevice;
use crate::light::LightSource;

/// Read-only camera state consumed when composing uniforms
pub trait CameraView {
    fn view_matrix(&self) -> Mat4;
    fn projection_matrix(&self) -> Mat4;
    fn position(&self) -> Vec3;
}

/// A shader program that accepts uniforms by name
pub trait UniformSink {
    /// Make this program current before setting values
    fn use_program(&mut self);
    fn set_int(&mut self, name: &str, value: i32);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_mat4(&mut self, name: &str, value: Mat4);
}

/// Uniforms of the lit (Phong) mesh shader
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LitUniforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub light_color: Vec3,
    pub light_position: Vec3,
    pub view_position: Vec3,
    pub ambient_strength: f32,
    pub diffuse_strength: f32,
    pub specular_strength: f32,
    pub specular_exponent: f32,
    pub use_normals: bool,
}

impl LitUniforms {
    /// Gather the values for drawing a model with `model` as its matrix.
    pub fn compose<D: GeometryDevice>(
        model: Mat4,
        camera: &impl CameraView,
        light: &LightSource<D>,
        use_normals: bool,
    ) -> Self {
        let params = light.params();
        Self {
            model,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            light_color: params.color(),
            light_position: light.position(),
            view_position: camera.position(),
            ambient_strength: params.ambient(),
            diffuse_strength: params.diffuse(),
            specular_strength: params.specular(),
            specular_exponent: params.specular_exponent(),
            use_normals,
        }
    }

    pub fn apply(&self, sink: &mut impl UniformSink) {
        sink.use_program();
        sink.set_mat4("ModelMatrix", self.model);
        sink.set_mat4("ViewMatrix", self.view);
        sink.set_mat4("ProjectionMatrix", self.projection);
        sink.set_vec3("LightColor", self.light_color);
        sink.set_vec3("LightPosition", self.light_position);
        sink.set_vec3("ViewPosition", self.view_position);
        sink.set_float("AmbientStrength", self.ambient_strength);
        sink.set_float("DiffuseStrength", self.diffuse_strength);
        sink.set_float("SpecularStrength", self.specular_strength);
        sink.set_float("SpecularExponent", self.specular_exponent);
        sink.set_int("UseNormals", self.use_normals as i32);
    }

    pub fn push_constants(&self) -> LitPushConstants {
        LitPushConstants {
            model: self.model.to_cols_array_2d(),
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            light_color: self.light_color.extend(self.ambient_strength).to_array(),
            light_position: self.light_position.extend(self.diffuse_strength).to_array(),
            view_position: self.view_position.extend(self.specular_strength).to_array(),
            material: [
                self.specular_exponent,
                if self.use_normals { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }
}

/// Push constants for the lit mesh shader
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LitPushConstants {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_color: [f32; 4],    // rgb = color, w = ambient strength
    pub light_position: [f32; 4], // xyz = position, w = diffuse strength
    pub view_position: [f32; 4],  // xyz = camera, w = specular strength
    pub material: [f32; 4],       // x = specular exponent, y = use normals
}

/// Uniforms of the unlit shader used for the light marker
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatUniforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl FlatUniforms {
    pub fn compose(model: Mat4, camera: &impl CameraView) -> Self {
        Self {
            model,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
        }
    }

    pub fn apply(&self, sink: &mut impl UniformSink) {
        sink.use_program();
        sink.set_mat4("ModelMatrix", self.model);
        sink.set_mat4("ViewMatrix", self.view);
        sink.set_mat4("ProjectionMatrix", self.projection);
    }

    pub fn push_constants(&self) -> FlatPushConstants {
        FlatPushConstants {
            model: self.model.to_cols_array_2d(),
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
        }
    }
}

/// Push constants for the unlit marker shader
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FlatPushConstants {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

/// A value stored by [`UniformBlock`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

/// CPU-side uniform storage, keyed by uniform name.
///
/// Stands in for a shader program when drawing on the host backend.
#[derive(Clone, Debug, Default)]
pub struct UniformBlock {
    values: BTreeMap<String, UniformValue>,
    binds: usize,
}

impl UniformBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// How many times the program was made current
    pub fn binds(&self) -> usize {
        self.binds
    }
}

impl UniformSink for UniformBlock {
    fn use_program(&mut self) {
        self.binds += 1;
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.values.insert(name.to_string(), UniformValue::Int(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.values.insert(name.to_string(), UniformValue::Float(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.values.insert(name.to_string(), UniformValue::Vec3(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.values.insert(name.to_string(), UniformValue::Mat4(value));
    }
}
