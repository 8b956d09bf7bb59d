use std::collections::HashMap;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::model::message::Speaker;

pub const MIN_UI_SCALE: f32 = 0.75;
pub const MAX_UI_SCALE: f32 = 2.0;

/// Presentation preferences, stored next to the app config.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct UiSettings {
    pub ui_scale: f32,

    /// Bubble colour per speaker, RGBA.
    pub speaker_colors: HashMap<Speaker, [u8; 4]>,

    pub speech_enabled: bool,
    /// Engine voice id; `None` picks the first voice for the language.
    pub selected_voice: Option<String>,
}

impl Default for UiSettings {
    fn default() -> Self {
        let speaker_colors = HashMap::from([
            (Speaker::User, [40, 70, 120, 255]),
            (Speaker::Narrator, [40, 90, 60, 255]),
            (Speaker::System, [120, 50, 50, 255]),
        ]);

        Self {
            ui_scale: 1.0,
            speaker_colors,
            speech_enabled: false,
            selected_voice: None,
        }
    }
}

impl UiSettings {
    pub fn color(&self, speaker: Speaker) -> Color32 {
        self.speaker_colors
            .get(&speaker)
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .unwrap_or(Color32::DARK_GRAY)
    }

    pub fn set_color(&mut self, speaker: Speaker, color: Color32) {
        self.speaker_colors.insert(speaker, color.to_srgba_unmultiplied());
    }

    /// Hand-edited files can hold any number here.
    pub fn scale(&self) -> f32 {
        if self.ui_scale.is_finite() {
            self.ui_scale.clamp(MIN_UI_SCALE, MAX_UI_SCALE)
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_settings_files_still_load() {
        let settings: UiSettings = serde_json::from_str(r#"{"ui_scale":1.5}"#).unwrap();
        assert_eq!(settings.ui_scale, 1.5);
        assert!(!settings.speech_enabled);
        assert_eq!(settings.color(Speaker::Narrator), Color32::from_rgb(40, 90, 60));
    }

    #[test]
    fn colors_are_keyed_by_speaker_name() {
        let mut settings = UiSettings::default();
        settings.set_color(Speaker::User, Color32::from_rgb(1, 2, 3));

        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["speaker_colors"]["user"], serde_json::json!([1, 2, 3, 255]));
    }

    #[test]
    fn missing_speaker_gets_fallback_color() {
        let mut settings = UiSettings::default();
        settings.speaker_colors.remove(&Speaker::System);
        assert_eq!(settings.color(Speaker::System), Color32::DARK_GRAY);
    }

    #[test]
    fn scale_is_clamped() {
        let mut settings = UiSettings::default();
        settings.ui_scale = 10.0;
        assert_eq!(settings.scale(), MAX_UI_SCALE);

        settings.ui_scale = f32::NAN;
        assert_eq!(settings.scale(), 1.0);
    }
}
