use crate::model::game_state::{GameSetting, SessionView};

/// Intents sent from the UI thread to the engine thread.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    NewGame { name: String, setting: GameSetting },
    ContinueGame { name: String },
    SendAction(String),
    Logout,
    TestConnection,
}

pub enum EngineResponse {
    /// Full session state after a mutation.
    Session(SessionView),

    ConnectionStatus(Result<String, String>),
}
