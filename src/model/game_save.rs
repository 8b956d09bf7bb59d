use serde::{Deserialize, Serialize};

use crate::model::game_state::{GameSetting, PlayerState};
use crate::model::message::StoryEntry;

pub const SAVE_VERSION: u32 = 1;

/// Durable snapshot of one player's adventure, keyed by player name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSave {
    pub version: u32,
    pub setting: GameSetting,
    pub story: Vec<StoryEntry>,
    pub player_state: PlayerState,
}

impl GameSave {
    pub fn new(setting: GameSetting, story: Vec<StoryEntry>, player_state: PlayerState) -> Self {
        Self {
            version: SAVE_VERSION,
            setting,
            story,
            player_state,
        }
    }

    /// Store key for a player. Anything outside `[A-Za-z0-9-]` is
    /// hex-escaped so the key is safe as a file name.
    pub fn key_for(player_name: &str) -> String {
        let mut key = String::from("adventure_");
        for byte in player_name.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                key.push(byte as char);
            } else {
                key.push_str(&format!("_{byte:02x}"));
            }
        }
        key
    }
}
