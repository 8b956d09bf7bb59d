use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::Context;

use crate::config::AppConfig;
use crate::engine::llm_client::{NarrativeClient, NarrativeService};
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::save_store::{FileSaveStore, SaveStore};
use crate::engine::session::GameSession;

/// Owns the game session on a worker thread. Commands are handled one at
/// a time, so there is never more than one narrator request in flight.
pub struct Engine<N, S> {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    session: GameSession<N, S>,
}

impl<N: NarrativeService, S: SaveStore> Engine<N, S> {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        session: GameSession<N, S>,
    ) -> Self {
        let listener_tx = tx.clone();
        let session = session.with_listener(move |view| {
            let _ = listener_tx.send(EngineResponse::Session(view.clone()));
        });

        Self { rx, tx, session }
    }

    pub fn run(&mut self) {
        while let Ok(cmd) = self.rx.recv() {
            self.handle(cmd);
        }
        log::info!("UI hung up, engine stopping");
    }

    fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::NewGame { name, setting } => {
                self.session.new_game(&name, setting);
            }

            EngineCommand::ContinueGame { name } => {
                self.session.continue_game(&name);
            }

            EngineCommand::SendAction(text) => {
                self.session.send_action(&text);
            }

            EngineCommand::Logout => {
                self.session.logout();
            }

            EngineCommand::TestConnection => {
                let status = self
                    .session
                    .narrator()
                    .test_connection()
                    .map_err(|e| format!("{e:#}"));
                let _ = self.tx.send(EngineResponse::ConnectionStatus(status));
            }
        }
    }
}

/// Start the engine thread with the real narrator and on-disk saves.
pub fn spawn_engine(
    config: &AppConfig,
) -> anyhow::Result<(Sender<EngineCommand>, Receiver<EngineResponse>, JoinHandle<()>)> {
    let narrator = NarrativeClient::new(config)?;
    let session = GameSession::new(narrator, FileSaveStore::default_location())
        .with_continue_policy(config.continue_policy, config.default_setting);

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    let handle = thread::Builder::new()
        .name("narrative-engine".into())
        .spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, session);
            engine.run();
        })
        .context("starting engine thread")?;

    Ok((cmd_tx, resp_rx, handle))
}
