//! Input system with action-based mapping
//!
//! Maps raw winit keys, mouse motion and scroll to viewer actions.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use winit::event::{ElementState, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Viewer actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Move camera forward (W by default)
    MoveForward,
    /// Move camera backward (S by default)
    MoveBackward,
    /// Move camera left (A by default)
    MoveLeft,
    /// Move camera right (D by default)
    MoveRight,
    /// Move camera up (Q by default)
    MoveUp,
    /// Move camera down (E by default)
    MoveDown,
    /// Camera speed modifier (Shift by default)
    SpeedBoost,
    /// Reset the projection to the viewport (R by default)
    ResetProjection,
    /// Rotate the model about its position (arrow keys)
    RotateModelLeft,
    RotateModelRight,
    RotateModelUp,
    RotateModelDown,
    /// Start or stop the light orbit (O by default)
    ToggleLightOrbit,
    /// Close the viewer (Escape by default)
    Quit,
}

/// Current state of all inputs for a frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Actions currently held down
    pub held: HashSet<InputAction>,
    /// Actions that were just pressed this frame
    pub just_pressed: HashSet<InputAction>,
    /// Mouse movement delta for this frame
    pub mouse_delta: Vec2,
    /// Scroll wheel delta for this frame
    pub scroll_delta: f32,
}

impl InputState {
    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }
}

/// Maps keys to viewer actions
#[derive(Debug, Clone)]
pub struct InputBindings {
    bindings: HashMap<KeyCode, InputAction>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
        };

        // Camera
        bindings.bind(KeyCode::KeyW, InputAction::MoveForward);
        bindings.bind(KeyCode::KeyS, InputAction::MoveBackward);
        bindings.bind(KeyCode::KeyA, InputAction::MoveLeft);
        bindings.bind(KeyCode::KeyD, InputAction::MoveRight);
        bindings.bind(KeyCode::KeyQ, InputAction::MoveUp);
        bindings.bind(KeyCode::KeyE, InputAction::MoveDown);
        bindings.bind(KeyCode::ShiftLeft, InputAction::SpeedBoost);
        bindings.bind(KeyCode::KeyR, InputAction::ResetProjection);

        // Model
        bindings.bind(KeyCode::ArrowLeft, InputAction::RotateModelLeft);
        bindings.bind(KeyCode::ArrowRight, InputAction::RotateModelRight);
        bindings.bind(KeyCode::ArrowUp, InputAction::RotateModelUp);
        bindings.bind(KeyCode::ArrowDown, InputAction::RotateModelDown);

        bindings.bind(KeyCode::KeyO, InputAction::ToggleLightOrbit);
        bindings.bind(KeyCode::Escape, InputAction::Quit);

        bindings
    }
}

impl InputBindings {
    /// Bind a key to an action, replacing any previous binding of that key
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        self.bindings.insert(key, action);
    }

    pub fn get_key_action(&self, key: KeyCode) -> Option<InputAction> {
        self.bindings.get(&key).copied()
    }
}

/// Input handler that processes raw events and updates state
#[derive(Debug, Default)]
pub struct InputHandler {
    pub state: InputState,
    pub bindings: InputBindings,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a keyboard event
    pub fn handle_keyboard(&mut self, physical_key: PhysicalKey, element_state: ElementState) {
        let PhysicalKey::Code(key_code) = physical_key else {
            return;
        };
        let Some(action) = self.bindings.get_key_action(key_code) else {
            return;
        };

        match element_state {
            ElementState::Pressed => {
                if self.state.held.insert(action) {
                    self.state.just_pressed.insert(action);
                }
            }
            ElementState::Released => {
                self.state.held.remove(&action);
            }
        }
    }

    /// Handle mouse movement
    pub fn handle_mouse_motion(&mut self, delta: (f64, f64)) {
        self.state.mouse_delta += Vec2::new(delta.0 as f32, delta.1 as f32);
    }

    /// Handle scroll wheel
    pub fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        self.state.scroll_delta += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
        };
    }

    /// Clear frame-specific input data
    pub fn end_frame(&mut self) {
        self.state.clear_frame();
    }
}
