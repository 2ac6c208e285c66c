//! Free-fly camera with mouse look and scroll zoom

use glam::{Mat4, Vec2, Vec3};
use meshview_render::CameraView;

use crate::input::{InputAction, InputState};
use crate::settings::CameraSettings;

const PITCH_LIMIT: f32 = 89.0;
const MIN_FOV: f32 = 1.0;
const MAX_FOV: f32 = 120.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 500.0;

/// Free-fly camera. Angles are kept in degrees; yaw -90 looks down -Z.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub config: CameraSettings,
    position: Vec3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    default_fov: f32,
    aspect_ratio: f32,
}

impl FlyCamera {
    pub fn new(width: u32, height: u32, fov: f32, config: CameraSettings) -> Self {
        let fov = fov.clamp(MIN_FOV, MAX_FOV);
        Self {
            position: Vec3::from_array(config.start_position),
            config,
            yaw: -90.0,
            pitch: 0.0,
            fov,
            default_fov: fov,
            aspect_ratio: aspect(width, height),
        }
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Viewing direction
    pub fn forward(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Fit the projection to a new viewport and undo any zoom
    pub fn reset_projection(&mut self, width: u32, height: u32) {
        self.aspect_ratio = aspect(width, height);
        self.fov = self.default_fov;
    }

    /// Handle mouse look input (pixels)
    pub fn handle_mouse_look(&mut self, delta: Vec2) {
        self.yaw += delta.x * self.config.mouse_sensitivity;
        self.pitch -= delta.y * self.config.mouse_sensitivity;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Handle scroll wheel zoom
    pub fn handle_zoom(&mut self, scroll_delta: f32) {
        self.fov = (self.fov - scroll_delta).clamp(MIN_FOV, MAX_FOV);
    }

    /// Apply movement, look and zoom for one frame
    pub fn update(&mut self, input: &InputState, dt: f32) {
        let mut speed = self.config.move_speed * dt;
        if input.is_held(InputAction::SpeedBoost) {
            speed *= self.config.speed_boost;
        }

        let forward = self.forward();
        let right = self.right();
        let mut direction = Vec3::ZERO;
        if input.is_held(InputAction::MoveForward) {
            direction += forward;
        }
        if input.is_held(InputAction::MoveBackward) {
            direction -= forward;
        }
        if input.is_held(InputAction::MoveRight) {
            direction += right;
        }
        if input.is_held(InputAction::MoveLeft) {
            direction -= right;
        }
        if input.is_held(InputAction::MoveUp) {
            direction += Vec3::Y;
        }
        if input.is_held(InputAction::MoveDown) {
            direction -= Vec3::Y;
        }
        self.position += direction * speed;

        if input.mouse_delta != Vec2::ZERO {
            self.handle_mouse_look(input.mouse_delta);
        }
        if input.scroll_delta != 0.0 {
            self.handle_zoom(input.scroll_delta);
        }
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

impl CameraView for FlyCamera {
    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect_ratio, Z_NEAR, Z_FAR)
    }

    fn position(&self) -> Vec3 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> FlyCamera {
        FlyCamera::new(800, 600, 45.0, CameraSettings::default())
    }

    #[test]
    fn starts_looking_down_negative_z() {
        let camera = camera();
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((camera.right() - Vec3::X).length() < 1e-6);
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn moves_with_boost() {
        let mut camera = camera();
        let mut input = InputState::default();
        input.held.insert(InputAction::MoveForward);

        camera.update(&input, 1.0);
        assert!((camera.position() - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-5);

        input.held.insert(InputAction::SpeedBoost);
        camera.update(&input, 1.0);
        assert!((camera.position() - Vec3::new(0.0, 0.0, -7.0)).length() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = camera();
        camera.handle_mouse_look(Vec2::new(0.0, -10_000.0));
        assert!(camera.forward().y > 0.99);
        assert!(camera.forward().is_finite());
    }

    #[test]
    fn zoom_is_clamped_and_reset() {
        let mut camera = camera();
        camera.handle_zoom(100.0);
        assert_eq!(camera.fov(), MIN_FOV);

        camera.reset_projection(1920, 1080);
        assert_eq!(camera.fov(), 45.0);
        assert!((camera.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn view_matrix_maps_position_to_origin() {
        let camera = camera();
        let eye = camera.view_matrix().transform_point3(camera.position());
        assert!(eye.length() < 1e-5);
    }
}
