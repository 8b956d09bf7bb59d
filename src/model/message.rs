use serde::{Deserialize, Serialize};

use crate::model::game_state::Emotion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Narrator,
    User,
    System,
}

impl Speaker {
    pub const ALL: [Speaker; 3] = [Speaker::Narrator, Speaker::User, Speaker::System];

    pub fn label(self) -> &'static str {
        match self {
            Speaker::Narrator => "Narrator",
            Speaker::User => "You",
            Speaker::System => "System",
        }
    }
}

/// One line of the story log. Entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryEntry {
    pub id: u64,
    pub speaker: Speaker,
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
}

impl StoryEntry {
    pub fn narrator(id: u64, text: impl Into<String>, emotion: Emotion) -> Self {
        Self {
            id,
            speaker: Speaker::Narrator,
            text: text.into(),
            emotion: Some(emotion),
        }
    }

    pub fn user(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            speaker: Speaker::User,
            text: text.into(),
            emotion: None,
        }
    }

    pub fn system(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            speaker: Speaker::System,
            text: text.into(),
            emotion: None,
        }
    }
}
