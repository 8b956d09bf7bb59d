use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::model::game_state::GameSetting;

pub const APP_DIR: &str = "narrative_adventure";

/// What `continue` does when the player has no save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuePolicy {
    /// Back to the auth screen so a setting can be picked.
    #[default]
    ReturnToAuth,
    /// Start a fresh game in `default_setting`.
    StartNewGame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OpenAI-compatible chat completions endpoint.
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub request_timeout_secs: u64,

    /// Language the narrator writes in.
    pub language: String,
    /// BCP 47 tag used to pick a speech voice.
    pub speech_language: String,
    pub speech_program: String,

    pub default_setting: GameSetting,
    pub continue_policy: ContinuePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1234/v1/chat/completions".into(),
            model: "local-model".into(),
            api_key: None,
            temperature: 0.7,
            request_timeout_secs: 120,

            language: "English".into(),
            speech_language: "en-US".into(),
            speech_program: "espeak-ng".into(),

            default_setting: GameSetting::Fantasy,
            continue_policy: ContinuePolicy::ReturnToAuth,
        }
    }
}

impl AppConfig {
    /// Base URL of the API, i.e. the endpoint without `/chat/completions`.
    pub fn api_base(&self) -> &str {
        self.endpoint
            .trim_end_matches('/')
            .trim_end_matches("/chat/completions")
    }

    /// Environment overrides: `NARRATIVE_ENDPOINT`, `NARRATIVE_API_KEY`.
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(
            std::env::var("NARRATIVE_ENDPOINT").ok(),
            std::env::var("NARRATIVE_API_KEY").ok(),
        );
        self
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, api_key: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }
}

fn config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path.push("config.json");
    path
}

/// Missing or unreadable config falls back to defaults. A missing file
/// is created so there is something to edit.
pub fn load_config() -> AppConfig {
    let path = config_path();
    let config = match fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid config at {}: {e}", path.display());
            AppConfig::default()
        }),
        Err(_) => {
            let config = AppConfig::default();
            if let Err(e) = save_config(&config) {
                log::warn!("Could not write default config: {e:#}");
            }
            config
        }
    };
    config.apply_env()
}

pub fn save_config(config: &AppConfig) -> anyhow::Result<()> {
    let path = config_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"model":"mistral","continue_policy":"start_new_game"}"#)
                .unwrap();

        assert_eq!(config.model, "mistral");
        assert_eq!(config.continue_policy, ContinuePolicy::StartNewGame);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.default_setting, GameSetting::Fantasy);
    }

    #[test]
    fn api_base_strips_completions_path() {
        let mut config = AppConfig::default();
        assert_eq!(config.api_base(), "http://localhost:1234/v1");

        config.endpoint = "https://example.org/v1/chat/completions/".into();
        assert_eq!(config.api_base(), "https://example.org/v1");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some("  ".into()), Some("sk-test".into()));

        assert_eq!(config.endpoint, AppConfig::default().endpoint);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    }
}
