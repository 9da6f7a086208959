pub mod settings;

// Re-export commonly used types
pub use settings::{
    CameraSettings, HudSettings, SceneSettings, ViewerSettings, WindowSettings,
    load_settings, load_settings_file, load_settings_from, save_settings, save_settings_to,
    settings_path, ENV_PREFIX,
};
