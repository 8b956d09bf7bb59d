use std::fs;
use std::path::PathBuf;

use crate::config::APP_DIR;
use crate::ui::settings::UiSettings;

fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("ui_settings.json")
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings() -> UiSettings {
    let path = settings_path();
    let Ok(raw) = fs::read_to_string(&path) else {
        return UiSettings::default();
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        log::warn!("Ignoring invalid UI settings at {}: {e}", path.display());
        UiSettings::default()
    })
}

pub fn save_settings(settings: &UiSettings) {
    let path = settings_path();
    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            log::warn!("Failed to create {}: {e}", dir.display());
            return;
        }
    }

    match serde_json::to_string_pretty(settings) {
        Ok(json) => {
            if let Err(e) = fs::write(&path, json) {
                log::warn!("Failed to save UI settings to {}: {e}", path.display());
            }
        }
        Err(e) => log::warn!("Failed to serialize UI settings: {e}"),
    }
}
