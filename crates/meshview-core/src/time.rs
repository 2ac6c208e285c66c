//! Frame timing
//!
//! Turns raw per-frame deltas from the windowing layer into clamped delta
//! time and a periodic frames-per-second report.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Configuration for the frame clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Maximum delta time, so a stalled frame doesn't teleport the camera
    pub max_delta_time: f32,
    /// Seconds between FPS reports
    pub fps_report_interval: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_delta_time: 0.25,
            fps_report_interval: 1.0,
        }
    }
}

/// Per-frame time tracking
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Configuration
    pub config: ClockConfig,
    /// Time since start in seconds
    pub total_time: f64,
    /// Delta time for this frame (clamped)
    pub delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Most recent FPS report, if one has been made
    pub last_fps: Option<u32>,
    frames_since_report: u32,
    time_since_report: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}

impl FrameClock {
    /// Create a new clock with custom config
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            last_fps: None,
            frames_since_report: 0,
            time_since_report: 0.0,
        }
    }

    /// Advance by the raw delta from the previous frame.
    ///
    /// Returns the frame rate when a report interval has just elapsed.
    pub fn update(&mut self, raw_delta: f32) -> Option<u32> {
        self.delta_time = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.total_time += self.delta_time as f64;
        self.frame_count += 1;

        self.frames_since_report += 1;
        self.time_since_report += raw_delta.max(0.0);

        if self.time_since_report < self.config.fps_report_interval {
            return None;
        }

        let fps = (self.frames_since_report as f32 / self.time_since_report).round() as u32;
        info!("FPS: {}", fps);
        self.last_fps = Some(fps);
        self.frames_since_report = 0;
        self.time_since_report = 0.0;
        Some(fps)
    }
}
