use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const SETTINGS_FILE: &str = "settings.toml";

/// Prefix for environment overrides, e.g. `CARD_TABLE__CAMERA__MOVE_SPEED=0.2`.
pub const ENV_PREFIX: &str = "CARD_TABLE";

// =============================================================================
// Viewer Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Card Table".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
    /// World units per rendered frame while a move key is held.
    pub move_speed: f32,
    /// Radians per rendered frame while a turn key is held.
    pub turn_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            eye: [0.0, 6.0, 9.0],
            target: [0.0, 0.0, 0.0],
            fovy: 45.0,
            znear: 0.1,
            zfar: 100.0,
            move_speed: 0.1,
            turn_speed: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Deck auto-rotation in radians per second.
    pub rotation_speed: f32,
    /// Multiplier on the shader clock driving the background.
    pub background_speed: f32,
    pub light_direction: [f32; 3],
    pub light_color: [f32; 3],
    pub ambient: f32,
    /// Optional TOML file with extra card placements.
    pub layout_path: Option<PathBuf>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            rotation_speed: 0.5,
            background_speed: 1.0,
            light_direction: [-0.4, -1.0, -0.3],
            light_color: [1.0, 0.96, 0.88],
            ambient: 0.25,
            layout_path: None,
        }
    }
}

/// Identifiers of the text displays the frame-rate monitor writes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudSettings {
    pub fps_display: String,
    pub frame_time_display: String,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            fps_display: "fps".to_string(),
            frame_time_display: "frame-time".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub scene: SceneSettings,
    pub hud: HudSettings,
}

// Settings file management
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "card-table", "card-table-viz")
        .map(|proj| proj.config_dir().join(SETTINGS_FILE))
}

/// Layer defaults, the settings file (if present) and `CARD_TABLE__*`
/// environment variables.
pub fn load_settings() -> anyhow::Result<ViewerSettings> {
    load_settings_from(settings_path().as_deref())
}

pub fn load_settings_from(path: Option<&Path>) -> anyhow::Result<ViewerSettings> {
    let mut builder = config::Config::builder()
        .add_source(config::Config::try_from(&ViewerSettings::default())?);

    if let Some(path) = path {
        debug!("Reading settings from {}", path.display());
        builder = builder.add_source(
            config::File::from(path)
                .format(config::FileFormat::Toml)
                .required(false),
        );
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<ViewerSettings>()?;

    Ok(settings)
}

/// Read one settings file without defaults layering or environment.
pub fn load_settings_file(path: &Path) -> anyhow::Result<ViewerSettings> {
    let data = fs::read_to_string(path)?;
    Ok(toml::from_str::<ViewerSettings>(&data)?)
}

pub fn save_settings(settings: &ViewerSettings) -> std::io::Result<()> {
    if let Some(path) = settings_path() {
        save_settings_to(settings, &path)?;
    }
    Ok(())
}

pub fn save_settings_to(settings: &ViewerSettings, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let toml = toml::to_string_pretty(settings)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(path, toml)?;
    info!("Settings saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let settings = ViewerSettings::default();
        assert!(settings.window.width > 0 && settings.window.height > 0);
        assert!(settings.camera.znear < settings.camera.zfar);
        assert!(settings.scene.rotation_speed >= 0.0);
        assert_ne!(settings.hud.fps_display, settings.hud.frame_time_display);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: ViewerSettings = toml::from_str(
            r#"
            [camera]
            move_speed = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(settings.camera.move_speed, 0.5);
        assert_eq!(settings.camera.fovy, CameraSettings::default().fovy);
        assert_eq!(settings.window, WindowSettings::default());
    }
}
