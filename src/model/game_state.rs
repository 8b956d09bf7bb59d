use serde::{Deserialize, Serialize};

use crate::model::message::StoryEntry;

/// Health every new adventure starts with.
pub const STARTING_HEALTH: i32 = 100;

/// Discrete phase of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    #[default]
    Unauthenticated,
    Loading,
    Playing,
    Error,
    GameOver,
}

impl GamePhase {
    /// Phases in which the session snapshot is written to the save store.
    pub fn is_persisted(self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameSetting {
    #[default]
    Fantasy,
    Cyberpunk,
    NoirDetective,
}

impl GameSetting {
    pub const ALL: [GameSetting; 3] = [
        GameSetting::Fantasy,
        GameSetting::Cyberpunk,
        GameSetting::NoirDetective,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            GameSetting::Fantasy => "Fantasy",
            GameSetting::Cyberpunk => "Cyberpunk",
            GameSetting::NoirDetective => "Noir Detective",
        }
    }

    /// Genre description handed to the narrator.
    pub fn genre(self) -> &'static str {
        match self {
            GameSetting::Fantasy => "high fantasy",
            GameSetting::Cyberpunk => "gritty cyberpunk",
            GameSetting::NoirDetective => "hard-boiled noir detective",
        }
    }
}

/// Tone tag the narrator attaches to each reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    #[default]
    Neutral,
    Calm,
    Sad,
    Tense,
    Action,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Neutral,
        Emotion::Calm,
        Emotion::Sad,
        Emotion::Tense,
        Emotion::Action,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Calm => "calm",
            Emotion::Sad => "sad",
            Emotion::Tense => "tense",
            Emotion::Action => "action",
        }
    }
}

/// Player stats. The narrator is authoritative: every reply replaces
/// the whole struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub health: i32,
    pub inventory: Vec<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            health: STARTING_HEALTH,
            inventory: Vec::new(),
        }
    }
}

impl PlayerState {
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Health as shown to the player. The model may overshoot 100.
    pub fn display_health(&self) -> i32 {
        self.health.clamp(0, STARTING_HEALTH)
    }
}

/// Read-only copy of the session handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionView {
    pub phase: GamePhase,
    pub player_name: Option<String>,
    pub setting: GameSetting,
    pub story: Vec<StoryEntry>,
    pub player_state: PlayerState,

    /// One-line message for the auth screen, e.g. a missing save.
    pub notice: Option<String>,
}
