//! Game session state machine and save/continue protocol.
//!
//! ```text
//! UNAUTHENTICATED ──new/continue──► LOADING ──► PLAYING ⇄ LOADING
//!                                      │                    │
//!                                      ▼                    ▼
//!                                    ERROR          PLAYING | ERROR | GAME_OVER
//! ```
//!
//! ERROR and GAME_OVER only leave through `new_game` or `logout`.

use crate::config::ContinuePolicy;
use crate::engine::llm_client::{NarrativeError, NarrativeService};
use crate::engine::save_store::{SaveStore, StoreError};
use crate::model::game_save::{GameSave, SAVE_VERSION};
use crate::model::game_state::{GamePhase, GameSetting, PlayerState, SessionView};
use crate::model::message::StoryEntry;
use crate::model::narrative::NarrativeReply;

type Listener = Box<dyn FnMut(&SessionView) + Send>;

pub struct GameSession<N, S> {
    narrator: N,
    store: S,
    continue_policy: ContinuePolicy,
    default_setting: GameSetting,

    phase: GamePhase,
    player_name: Option<String>,
    setting: GameSetting,
    story: Vec<StoryEntry>,
    player_state: PlayerState,
    notice: Option<String>,
    next_entry_id: u64,

    listener: Option<Listener>,
}

impl<N: NarrativeService, S: SaveStore> GameSession<N, S> {
    pub fn new(narrator: N, store: S) -> Self {
        Self {
            narrator,
            store,
            continue_policy: ContinuePolicy::default(),
            default_setting: GameSetting::default(),

            phase: GamePhase::Unauthenticated,
            player_name: None,
            setting: GameSetting::default(),
            story: Vec::new(),
            player_state: PlayerState::default(),
            notice: None,
            next_entry_id: 1,

            listener: None,
        }
    }

    pub fn with_continue_policy(mut self, policy: ContinuePolicy, default_setting: GameSetting) -> Self {
        self.continue_policy = policy;
        self.default_setting = default_setting;
        self
    }

    /// Called with a fresh view after every mutation, LOADING included.
    pub fn with_listener(mut self, listener: impl FnMut(&SessionView) + Send + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    #[cfg(test)]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[cfg(test)]
    pub fn story(&self) -> &[StoryEntry] {
        &self.story
    }

    #[cfg(test)]
    pub fn player_state(&self) -> &PlayerState {
        &self.player_state
    }

    pub fn narrator(&self) -> &N {
        &self.narrator
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            player_name: self.player_name.clone(),
            setting: self.setting,
            story: self.story.clone(),
            player_state: self.player_state.clone(),
            notice: self.notice.clone(),
        }
    }

    /* =========================
       Transitions
       ========================= */

    pub fn new_game(&mut self, name: &str, setting: GameSetting) {
        let name = name.trim().to_string();
        log::info!("Starting new {} game for {name}", setting.display_name());

        self.player_name = Some(name.clone());
        self.setting = setting;
        self.notice = None;
        self.story.clear();
        self.next_entry_id = 1;
        self.player_state = PlayerState::default();
        self.push_system(format!("Creating a new world for {name}..."));
        self.phase = GamePhase::Loading;
        self.commit();

        match self.narrator.start_new_game(setting) {
            Ok(reply) => {
                self.story.clear();
                self.apply_reply(reply);
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn continue_game(&mut self, name: &str) {
        let name = name.trim().to_string();

        let Some(save) = self.load_save(&name) else {
            match self.continue_policy {
                ContinuePolicy::ReturnToAuth => {
                    log::info!("No saved game for {name}, returning to auth");
                    self.clear();
                    self.notice = Some(format!(
                        "No saved game for {name}. Pick a setting to start a new one."
                    ));
                    self.commit();
                }
                ContinuePolicy::StartNewGame => {
                    log::info!("No saved game for {name}, starting a new one");
                    self.new_game(&name, self.default_setting);
                }
            }
            return;
        };

        if save.player_state.is_dead() {
            log::info!("Saved game for {name} ended in death, starting over");
            self.new_game(&name, save.setting);
            return;
        }

        log::info!("Continuing game for {name} ({} entries)", save.story.len());
        self.narrator.resume_game(save.setting, &save.story);

        self.next_entry_id = save.story.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        self.player_name = Some(name);
        self.setting = save.setting;
        self.story = save.story;
        self.player_state = save.player_state;
        self.notice = None;
        self.phase = GamePhase::Playing;
        self.commit();
    }

    pub fn send_action(&mut self, text: &str) {
        if text.trim().is_empty() || self.phase != GamePhase::Playing {
            return;
        }

        let id = self.take_id();
        self.story.push(StoryEntry::user(id, text));
        self.phase = GamePhase::Loading;
        self.commit();

        match self.narrator.send_action(text, &self.player_state) {
            Ok(reply) => self.apply_reply(reply),
            Err(e) => self.fail(e),
        }
    }

    pub fn logout(&mut self) {
        if let Some(name) = &self.player_name {
            log::info!("{name} logged out");
        }
        self.narrator.reset();
        self.clear();
        self.commit();
    }

    /* =========================
       Internals
       ========================= */

    fn apply_reply(&mut self, reply: NarrativeReply) {
        let id = self.take_id();
        self.player_state = reply.player_state();
        self.story
            .push(StoryEntry::narrator(id, reply.story_text, reply.emotion));

        if self.player_state.is_dead() {
            log::info!("Player died, game over");
            self.phase = GamePhase::GameOver;
            self.delete_save();
        } else {
            self.phase = GamePhase::Playing;
        }
        self.commit();
    }

    fn fail(&mut self, error: NarrativeError) {
        log::error!("Narrator request failed: {error}");
        self.push_system(format!(
            "An error occurred: {error}. The story cannot continue. Start a new game to try again."
        ));
        self.phase = GamePhase::Error;
        self.commit();
    }

    fn clear(&mut self) {
        self.phase = GamePhase::Unauthenticated;
        self.player_name = None;
        self.setting = GameSetting::default();
        self.story.clear();
        self.player_state = PlayerState::default();
        self.notice = None;
        self.next_entry_id = 1;
    }

    fn push_system(&mut self, text: String) {
        let id = self.take_id();
        self.story.push(StoryEntry::system(id, text));
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_entry_id;
        self.next_entry_id += 1;
        id
    }

    /// Persist when the phase calls for it, then notify the listener.
    fn commit(&mut self) {
        if self.phase.is_persisted() {
            if let Err(e) = self.persist() {
                log::warn!("Failed to save game: {e}");
            }
        }

        if self.listener.is_some() {
            let view = self.view();
            if let Some(listener) = self.listener.as_mut() {
                listener(&view);
            }
        }
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let Some(name) = &self.player_name else {
            return Ok(());
        };

        let save = GameSave::new(self.setting, self.story.clone(), self.player_state.clone());
        let json = serde_json::to_string(&save)?;
        self.store.store(&GameSave::key_for(name), &json)
    }

    fn delete_save(&mut self) {
        if let Some(name) = &self.player_name {
            if let Err(e) = self.store.remove(&GameSave::key_for(name)) {
                log::warn!("Failed to delete save for {name}: {e}");
            }
        }
    }

    /// Missing, unreadable and outdated saves all count as "no save".
    fn load_save(&self, name: &str) -> Option<GameSave> {
        let raw = match self.store.load(&GameSave::key_for(name)) {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("Failed to load game for {name}: {e}");
                return None;
            }
        };

        match serde_json::from_str::<GameSave>(&raw) {
            Ok(save) if save.version == SAVE_VERSION => Some(save),
            Ok(save) => {
                log::warn!(
                    "Ignoring save for {name}: version {} (expected {SAVE_VERSION})",
                    save.version
                );
                None
            }
            Err(e) => {
                log::warn!("Ignoring unreadable save for {name}: {e}");
                None
            }
        }
    }
}
