use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::game_state::GamePhase;
use super::app::MyApp;

pub fn draw_center_panel(ctx: &egui::Context, app: &mut MyApp) {
    let input_id = egui::Id::new("action_input_box");
    let can_act = app.view.phase == GamePhase::Playing;

    // ---------- Input bar ----------
    egui::TopBottomPanel::bottom("action_input").show(ctx, |ui| {
        let mut send_now = false;
        let mut sent_with_enter = false;

        if app.is_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("The narrator is thinking…");
            });
        }

        if app.view.phase == GamePhase::Error {
            ui.horizontal(|ui| {
                ui.label("The story cannot continue.");
                if ui.button("Start a new game").clicked() {
                    app.restart();
                }
            });
        }

        ui.add_enabled_ui(can_act, |ui| {
            ui.horizontal(|ui| {
                let response = ui.add_sized(
                    [ui.available_width() - 60.0, 60.0],
                    egui::TextEdit::multiline(&mut app.ui.input_text)
                        .id(input_id)
                        .hint_text("What do you do?")
                        .lock_focus(true),
                );

                // Enter sends, Shift+Enter breaks the line
                if response.has_focus() {
                    let enter = ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift);
                    if enter {
                        send_now = true;
                        sent_with_enter = true;
                    }
                }

                if ui.button("Send").clicked() {
                    send_now = true;
                }
            });
        });

        if send_now && can_act {
            if let Some(text) = take_action(&mut app.ui.input_text, sent_with_enter) {
                app.send_command(EngineCommand::SendAction(text));
            }

            ui.memory_mut(|m| m.request_focus(input_id));
        }
    });

    // ---------- Story log ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for entry in &app.view.story {
                    app.draw_entry(ui, entry);
                }
            });
    });
}

/// Takes the typed action out of the input box. The text is sent as typed;
/// trimming only decides whether it is blank. Enter has already put its
/// own newline into the buffer, which is dropped.
fn take_action(input: &mut String, sent_with_enter: bool) -> Option<String> {
    if sent_with_enter && input.ends_with('\n') {
        input.pop();
        if input.ends_with('\r') {
            input.pop();
        }
    }

    if input.trim().is_empty() {
        return None;
    }
    Some(std::mem::take(input))
}
