//! Viewer application state

use glam::Vec3;
use meshview_core::{ClockConfig, FrameClock};
use meshview_render::{
    CameraView, FlatUniforms, GeometryDevice, GeometryError, LightSource, LitUniforms, MeshAsset,
    UniformSink,
};
use tracing::{debug, info};

use crate::camera::FlyCamera;
use crate::input::{InputAction, InputState};
use crate::settings::ViewerSettings;

/// Model rotation speed for the arrow keys, radians per second
const ROTATE_SPEED: f32 = 1.5;

/// Light placement relative to the camera when the orbit is off
const LIGHT_OFFSET: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Circular light motion around the model
#[derive(Debug, Clone, Copy)]
pub struct LightOrbit {
    pub enabled: bool,
    pub radius: f32,
    pub speed: f32,
    pub angle: f32,
}

/// Everything a frame needs: the model, its light, the camera and timing.
pub struct ViewerContext<D: GeometryDevice> {
    pub model: MeshAsset<D>,
    pub light: LightSource<D>,
    pub camera: FlyCamera,
    pub clock: FrameClock,
    pub orbit: LightOrbit,
    use_normals: bool,
    viewport: (u32, u32),
    quit_requested: bool,
}

impl<D: GeometryDevice> ViewerContext<D> {
    pub fn new(model: MeshAsset<D>, mut light: LightSource<D>, settings: &ViewerSettings) -> Self {
        let (width, height) = settings.video.resolution();
        let camera = FlyCamera::new(width, height, settings.video.fov, settings.camera.clone());
        light.set_position(camera.position() + LIGHT_OFFSET);

        Self {
            model,
            light,
            camera,
            clock: FrameClock::new(ClockConfig::default()),
            orbit: LightOrbit {
                enabled: settings.light.orbit_speed != 0.0,
                radius: settings.light.orbit_radius,
                speed: settings.light.orbit_speed,
                angle: 0.0,
            },
            use_normals: settings.mesh.compute_normals,
            viewport: (width, height),
            quit_requested: false,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Advance one frame of simulation.
    pub fn update(&mut self, input: &InputState, raw_delta: f32) {
        self.clock.update(raw_delta);
        let dt = self.clock.delta_time;

        if input.is_just_pressed(InputAction::Quit) {
            info!("Quit requested");
            self.quit_requested = true;
        }
        if input.is_just_pressed(InputAction::ResetProjection) {
            self.camera.reset_projection(self.viewport.0, self.viewport.1);
        }
        if input.is_just_pressed(InputAction::ToggleLightOrbit) {
            self.orbit.enabled = !self.orbit.enabled;
            debug!("Light orbit {}", if self.orbit.enabled { "on" } else { "off" });
        }

        let mut rotation = Vec3::ZERO;
        if input.is_held(InputAction::RotateModelLeft) {
            rotation.y -= 1.0;
        }
        if input.is_held(InputAction::RotateModelRight) {
            rotation.y += 1.0;
        }
        if input.is_held(InputAction::RotateModelUp) {
            rotation.x -= 1.0;
        }
        if input.is_held(InputAction::RotateModelDown) {
            rotation.x += 1.0;
        }
        if rotation != Vec3::ZERO {
            self.model.rotate(rotation * ROTATE_SPEED * dt);
        }

        self.camera.update(input, dt);

        if self.orbit.enabled && self.orbit.speed != 0.0 {
            self.orbit.angle = (self.orbit.angle + self.orbit.speed * dt) % std::f32::consts::TAU;
            self.light
                .orbit(self.model.position(), self.orbit.radius, self.orbit.angle);
        }
    }

    /// Shader inputs for the model and for the light marker
    pub fn uniforms(&self) -> (LitUniforms, FlatUniforms) {
        let lit = LitUniforms::compose(
            self.model.transform(),
            &self.camera,
            &self.light,
            self.use_normals,
        );
        let flat = FlatUniforms::compose(self.light.transform(), &self.camera);
        (lit, flat)
    }

    /// Set uniforms and record the model and light draws.
    pub fn render(
        &self,
        frame: &mut D::Frame,
        lit_program: &mut impl UniformSink,
        flat_program: &mut impl UniformSink,
    ) -> Result<(), GeometryError> {
        let (lit, flat) = self.uniforms();

        lit.apply(lit_program);
        self.model.render(frame)?;

        flat.apply(flat_program);
        self.light.render(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_assets::MeshData;
    use meshview_render::{HostGeometryDevice, LightParams, UniformBlock, UniformValue};
    use std::sync::Arc;

    fn context(settings: &ViewerSettings) -> (Arc<HostGeometryDevice>, ViewerContext<HostGeometryDevice>) {
        let device = Arc::new(HostGeometryDevice::new());
        let model =
            MeshAsset::from_data(device.clone(), MeshData::uv_sphere(1.0, 8, 6, Vec3::ONE)).unwrap();
        let marker =
            MeshAsset::from_data(device.clone(), MeshData::uv_sphere(0.1, 6, 4, Vec3::ONE)).unwrap();
        let light = LightSource::new(marker, LightParams::default());
        (device, ViewerContext::new(model, light, settings))
    }

    #[test]
    fn light_starts_above_camera() {
        let (_, ctx) = context(&ViewerSettings::default());
        assert_eq!(ctx.light.position(), Vec3::new(0.0, 1.0, 3.0));
        assert!(!ctx.orbit.enabled);
    }

    #[test]
    fn render_sets_uniforms_and_draws_both_meshes() {
        let (device, ctx) = context(&ViewerSettings::default());
        let mut frame = device.begin_frame();
        let mut lit = UniformBlock::new();
        let mut flat = UniformBlock::new();

        ctx.render(&mut frame, &mut lit, &mut flat).unwrap();

        assert_eq!(frame.draws.len(), 2);
        assert_eq!(
            lit.get("LightPosition"),
            Some(UniformValue::Vec3(Vec3::new(0.0, 1.0, 3.0)))
        );
        assert_eq!(
            flat.get("ModelMatrix"),
            Some(UniformValue::Mat4(ctx.light.transform()))
        );
    }

    #[test]
    fn arrow_keys_rotate_model_in_place() {
        let (_, mut ctx) = context(&ViewerSettings::default());
        ctx.model.set_position(Vec3::new(1.0, 0.0, -2.0));
        let before = ctx.model.transform();

        let mut input = InputState::default();
        input.held.insert(InputAction::RotateModelRight);
        ctx.update(&input, 0.1);

        assert_ne!(ctx.model.transform(), before);
        assert!((ctx.model.position() - Vec3::new(1.0, 0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn orbit_toggles_and_moves_light() {
        let mut settings = ViewerSettings::default();
        settings.light.orbit_speed = 1.0;
        settings.light.orbit_radius = 2.0;
        let (_, mut ctx) = context(&settings);
        assert!(ctx.orbit.enabled);

        ctx.update(&InputState::default(), 0.1);
        let offset = ctx.light.position() - ctx.model.position();
        assert!((offset.length() - 2.0).abs() < 1e-5);

        let mut toggle = InputState::default();
        toggle.just_pressed.insert(InputAction::ToggleLightOrbit);
        ctx.update(&toggle, 0.1);
        assert!(!ctx.orbit.enabled);

        let parked = ctx.light.position();
        ctx.update(&InputState::default(), 0.1);
        assert_eq!(ctx.light.position(), parked);
    }

    #[test]
    fn escape_requests_quit() {
        let (_, mut ctx) = context(&ViewerSettings::default());
        let mut input = InputState::default();
        input.just_pressed.insert(InputAction::Quit);
        ctx.update(&input, 0.016);
        assert!(ctx.quit_requested());
    }
}
