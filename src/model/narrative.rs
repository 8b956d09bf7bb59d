use serde::{Deserialize, Deserializer, Serialize};

use crate::model::game_state::{Emotion, PlayerState};

/// Structured reply returned by the narrator model.
/// This does NOT mutate state directly; the session applies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeReply {
    #[serde(alias = "story_text", alias = "text")]
    pub story_text: String,

    #[serde(deserialize_with = "rounded_health")]
    pub health: i32,

    pub inventory: Vec<String>,

    #[serde(default)]
    pub emotion: Emotion,
}

impl NarrativeReply {
    pub fn player_state(&self) -> PlayerState {
        PlayerState {
            health: self.health,
            inventory: self.inventory.clone(),
        }
    }
}

/// Models emit `85` as often as `85.0`.
fn rounded_health<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("health must be a finite number"));
    }
    Ok(value.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
}
