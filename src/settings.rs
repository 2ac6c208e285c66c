//! Viewer settings with persistence
//!
//! Settings are saved to `~/.config/meshview/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use meshview_assets::MeshOptions;
use meshview_render::LightParams;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All viewer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Directory relative mesh paths are resolved against
    pub asset_dir: PathBuf,
    pub video: VideoSettings,
    pub mesh: MeshOptions,
    pub light: LightSettings,
    pub camera: CameraSettings,
}

impl ViewerSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("meshview"))
    }

    /// Get the default settings file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from `path`, or from the default location when `None`.
    /// Falls back to defaults if the file is missing or invalid.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => {
                    warn!("Could not determine config directory");
                    return Self::default();
                }
            },
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`, or to the default location when `None`
    pub fn save(&self, path: Option<&Path>) -> anyhow::Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => anyhow::bail!("Could not determine config directory"),
            },
        };

        // Create config directory if it doesn't exist
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(path)
    }
}

/// Viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            fov: 45.0,
        }
    }
}

impl VideoSettings {
    /// Get the resolution as a tuple
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Point light settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    pub color: [f32; 3],
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub specular_exponent: f32,
    /// Refuse color channels and strengths outside 0..=1
    pub reject_out_of_range: bool,
    /// Radius of the light's circular path around the model
    pub orbit_radius: f32,
    /// Angular speed of the orbit in radians per second (0 = static light)
    pub orbit_speed: f32,
}

impl Default for LightSettings {
    fn default() -> Self {
        let params = LightParams::default();
        Self {
            color: params.color().to_array(),
            ambient: params.ambient(),
            diffuse: params.diffuse(),
            specular: params.specular(),
            specular_exponent: params.specular_exponent(),
            reject_out_of_range: params.rejects_out_of_range(),
            orbit_radius: 2.0,
            orbit_speed: 0.0,
        }
    }
}

impl LightSettings {
    /// Build light parameters, keeping the default for any rejected value
    pub fn params(&self) -> LightParams {
        let mut params = LightParams::new(self.reject_out_of_range);

        if !params.set_color(Vec3::from_array(self.color)) {
            warn!("Ignoring out of range light color {:?}", self.color);
        }
        if !params.set_ambient(self.ambient) {
            warn!("Ignoring out of range ambient strength {}", self.ambient);
        }
        if !params.set_diffuse(self.diffuse) {
            warn!("Ignoring out of range diffuse strength {}", self.diffuse);
        }
        if !params.set_specular(self.specular) {
            warn!("Ignoring out of range specular strength {}", self.specular);
        }
        if !params.set_specular_exponent(self.specular_exponent) {
            warn!("Ignoring specular exponent {} (must be >= 1)", self.specular_exponent);
        }

        params
    }
}

/// Fly camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Movement speed in units per second
    pub move_speed: f32,
    /// Speed multiplier while the boost key is held
    pub speed_boost: f32,
    /// Degrees of rotation per pixel of mouse movement
    pub mouse_sensitivity: f32,
    pub start_position: [f32; 3],
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            move_speed: 2.5,
            speed_boost: 3.0,
            mouse_sensitivity: 0.1,
            start_position: [0.0, 0.0, 3.0],
        }
    }
}
