//! Meshview Core - Core types shared by the meshview crates
//!
//! - Mathematical primitives (re-exported from glam)
//! - Model transform with absolute and relative mutators
//! - Frame clock for delta time and FPS reporting

pub mod time;
pub mod types;

pub use glam::{Mat4, Vec3, Vec4};
pub use time::{ClockConfig, FrameClock};
pub use types::ModelTransform;
