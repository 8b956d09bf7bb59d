//! Test doubles for the narrator and the save store.

use std::collections::VecDeque;

use anyhow::Result;

use crate::engine::llm_client::{NarrativeError, NarrativeService};
use crate::engine::save_store::{SaveStore, StoreError};
use crate::model::game_state::{Emotion, GameSetting, PlayerState};
use crate::model::message::StoryEntry;
use crate::model::narrative::NarrativeReply;

/// Narrator replaying scripted replies in order.
#[derive(Default)]
pub struct ScriptedNarrator {
    pub replies: VecDeque<Result<NarrativeReply, NarrativeError>>,
    pub started: bool,
    pub resumed_with: Option<(GameSetting, usize)>,
    pub actions: Vec<(String, PlayerState)>,
}

impl ScriptedNarrator {
    pub fn with(replies: Vec<Result<NarrativeReply, NarrativeError>>) -> Self {
        Self {
            replies: replies.into(),
            ..Default::default()
        }
    }

    fn next(&mut self) -> Result<NarrativeReply, NarrativeError> {
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(NarrativeError::Parse("script exhausted".into())))
    }
}

impl NarrativeService for ScriptedNarrator {
    fn start_new_game(&mut self, _: GameSetting) -> Result<NarrativeReply, NarrativeError> {
        self.started = true;
        self.next()
    }

    fn resume_game(&mut self, setting: GameSetting, story: &[StoryEntry]) {
        self.started = true;
        self.resumed_with = Some((setting, story.len()));
    }

    fn send_action(
        &mut self,
        action: &str,
        player: &PlayerState,
    ) -> Result<NarrativeReply, NarrativeError> {
        if !self.started {
            return Err(NarrativeError::NotStarted);
        }
        self.actions.push((action.to_string(), player.clone()));
        self.next()
    }

    fn reset(&mut self) {
        self.started = false;
    }

    fn test_connection(&self) -> Result<String> {
        Ok("Scripted narrator".to_string())
    }
}

/// Store whose every operation fails like a full disk.
#[derive(Default)]
pub struct BrokenStore;

impl SaveStore for BrokenStore {
    fn load(&self, _: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn store(&mut self, _: &str, _: &str) -> Result<(), StoreError> {
        Err(std::io::Error::other("quota exceeded").into())
    }

    fn remove(&mut self, _: &str) -> Result<(), StoreError> {
        Err(std::io::Error::other("quota exceeded").into())
    }
}

pub fn reply(text: &str, health: i32, inventory: &[&str]) -> Result<NarrativeReply, NarrativeError> {
    reply_with_emotion(text, health, inventory, Emotion::Neutral)
}

pub fn reply_with_emotion(
    text: &str,
    health: i32,
    inventory: &[&str],
    emotion: Emotion,
) -> Result<NarrativeReply, NarrativeError> {
    Ok(NarrativeReply {
        story_text: text.to_string(),
        health,
        inventory: inventory.iter().map(|s| s.to_string()).collect(),
        emotion,
    })
}

pub fn api_error() -> Result<NarrativeReply, NarrativeError> {
    Err(NarrativeError::Api {
        status: 503,
        message: "overloaded".into(),
    })
}
