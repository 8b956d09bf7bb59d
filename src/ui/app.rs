use eframe::egui;
use egui::Layout;
use std::sync::mpsc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::engine::engine::spawn_engine;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::model::game_state::{GamePhase, GameSetting, SessionView};
use crate::model::message::{Speaker, StoryEntry};
use crate::speech::espeak::EspeakEngine;
use crate::speech::SpeechService;
use crate::ui::settings::{UiSettings, MAX_UI_SCALE, MIN_UI_SCALE};
use crate::ui::settings_io::{load_settings, save_settings};
use crate::ui::{auth_screen, center_panel, stats_panel};

/* =========================
   UI State
   ========================= */

pub(crate) struct UiState {
    pub(crate) name_input: String,
    pub(crate) setting_choice: GameSetting,
    pub(crate) input_text: String,
    pub(crate) connection_status: Option<Result<String, String>>,
    pub(crate) should_auto_scroll: bool,
    pub(crate) show_preferences: bool,
}

/* =========================
   App
   ========================= */

pub struct MyApp {
    pub(crate) ui: UiState,
    pub(crate) settings: UiSettings,
    pub(crate) view: SessionView,
    speech: SpeechService<EspeakEngine>,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl MyApp {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let (cmd_tx, resp_rx, _engine) = spawn_engine(&config)?;
        let speech = SpeechService::new(
            EspeakEngine::new(config.speech_program.clone()),
            config.speech_language.clone(),
        );

        Ok(Self {
            ui: UiState {
                name_input: String::new(),
                setting_choice: config.default_setting,
                input_text: String::new(),
                connection_status: None,
                should_auto_scroll: false,
                show_preferences: false,
            },
            settings: load_settings(),
            view: SessionView::default(),
            speech,
            cmd_tx,
            resp_rx,
        })
    }

    pub(crate) fn send_command(&self, cmd: EngineCommand) {
        if let Err(e) = self.cmd_tx.send(cmd) {
            log::error!("Engine thread is gone, dropping command: {:?}", e.0);
        }
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.view.phase == GamePhase::Loading
    }

    pub(crate) fn logout(&mut self) {
        self.speech.cancel();
        self.send_command(EngineCommand::Logout);
    }

    pub(crate) fn restart(&mut self) {
        if let Some(name) = self.view.player_name.clone() {
            self.speech.cancel();
            self.send_command(EngineCommand::NewGame {
                name,
                setting: self.view.setting,
            });
        }
    }

    fn poll_engine(&mut self) {
        while let Ok(resp) = self.resp_rx.try_recv() {
            match resp {
                EngineResponse::Session(view) => self.apply_view(view),
                EngineResponse::ConnectionStatus(status) => {
                    self.ui.connection_status = Some(status);
                }
            }
        }
    }

    fn apply_view(&mut self, view: SessionView) {
        let finished_turn = self.view.phase == GamePhase::Loading
            && matches!(view.phase, GamePhase::Playing | GamePhase::GameOver);

        if finished_turn && self.settings.speech_enabled {
            if let Some(entry) = view.story.last().filter(|e| e.speaker == Speaker::Narrator) {
                self.speech.speak(
                    &entry.text,
                    view.setting,
                    entry.emotion.unwrap_or_default(),
                    self.settings.selected_voice.as_deref(),
                );
            }
        }

        if view.phase == GamePhase::Unauthenticated {
            self.speech.cancel();
        }

        self.view = view;
        self.ui.should_auto_scroll = true;
    }

    pub(crate) fn draw_entry(&self, ui: &mut egui::Ui, entry: &StoryEntry) {
        let bg = self.settings.color(entry.speaker);

        ui.add_space(6.0);

        match entry.speaker {
            Speaker::User => {
                ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                    bubble(ui, bg, &format!("> {}", entry.text));
                });
            }
            Speaker::Narrator | Speaker::System => bubble(ui, bg, &entry.text),
        }
    }

    fn draw_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Narrative Adventure");

                ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                    let loading = self.is_loading();

                    if ui.add_enabled(!loading, egui::Button::new("Logout")).clicked() {
                        self.logout();
                    }
                    if ui.add_enabled(!loading, egui::Button::new("New game")).clicked() {
                        self.restart();
                    }

                    ui.toggle_value(&mut self.ui.show_preferences, "⚙");

                    ui.separator();
                    self.draw_speech_controls(ui);

                    ui.separator();
                    if let Some(name) = &self.view.player_name {
                        ui.label(egui::RichText::new(name).strong());
                        ui.label("Player:");
                    }
                });
            });
        });
    }

    fn draw_speech_controls(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;

        let voices = self.speech.voices().to_vec();
        if !voices.is_empty() {
            let selected = self
                .settings
                .selected_voice
                .as_deref()
                .and_then(|id| voices.iter().find(|v| v.id == id))
                .map(|v| v.name.clone())
                .unwrap_or_else(|| "Default voice".to_string());

            egui::ComboBox::from_id_salt("voice")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    changed |= ui
                        .selectable_value(&mut self.settings.selected_voice, None, "Default voice")
                        .changed();
                    for voice in &voices {
                        changed |= ui
                            .selectable_value(
                                &mut self.settings.selected_voice,
                                Some(voice.id.clone()),
                                format!("{} ({})", voice.name, voice.lang),
                            )
                            .changed();
                    }
                });
        }

        if ui.checkbox(&mut self.settings.speech_enabled, "Speech").changed() {
            if !self.settings.speech_enabled {
                self.speech.cancel();
            }
            changed = true;
        }

        if changed {
            save_settings(&self.settings);
        }
    }

    fn draw_preferences(&mut self, ctx: &egui::Context) {
        let mut open = self.ui.show_preferences;
        let mut changed = false;

        egui::Window::new("Preferences")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                let scale = ui.add(
                    egui::Slider::new(&mut self.settings.ui_scale, MIN_UI_SCALE..=MAX_UI_SCALE)
                        .text("UI scale"),
                );
                changed |= scale.drag_stopped() || (scale.changed() && !scale.dragged());

                ui.separator();
                for speaker in Speaker::ALL {
                    let mut color = self.settings.color(speaker);
                    ui.horizontal(|ui| {
                        if ui.color_edit_button_srgba(&mut color).changed() {
                            self.settings.set_color(speaker, color);
                            changed = true;
                        }
                        ui.label(speaker.label());
                    });
                }

                if ui.button("Reset to defaults").clicked() {
                    let defaults = UiSettings::default();
                    self.settings.ui_scale = defaults.ui_scale;
                    self.settings.speaker_colors = defaults.speaker_colors;
                    changed = true;
                }
            });

        self.ui.show_preferences = open;
        if changed {
            save_settings(&self.settings);
        }
    }

    fn draw_game_over(&mut self, ctx: &egui::Context) {
        egui::Window::new("Game over")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Your adventure has come to an end.");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Play again").clicked() {
                        self.restart();
                    }
                    if ui.button("Return to menu").clicked() {
                        self.logout();
                    }
                });
            });
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.settings.scale());

        self.poll_engine();

        // Engine replies arrive off the UI thread; keep polling.
        ctx.request_repaint_after(Duration::from_millis(100));

        if self.ui.show_preferences {
            self.draw_preferences(ctx);
        }

        if self.view.phase == GamePhase::Unauthenticated {
            auth_screen::draw_auth_screen(ctx, self);
            return;
        }

        self.draw_header(ctx);
        stats_panel::draw_stats_panel(ctx, self);
        center_panel::draw_center_panel(ctx, self);

        if self.view.phase == GamePhase::GameOver {
            self.draw_game_over(ctx);
        }

        self.ui.should_auto_scroll = false;
    }
}

/* =========================
   UI Helpers
   ========================= */

fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}
