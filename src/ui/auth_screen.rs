use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::game_state::GameSetting;
use super::app::MyApp;

pub fn draw_auth_screen(ctx: &egui::Context, app: &mut MyApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.heading("Narrative Adventure");
            ui.label("Enter your name to begin your adventure.");
            ui.add_space(16.0);

            let response = ui.add(
                egui::TextEdit::singleline(&mut app.ui.name_input)
                    .hint_text("Your name")
                    .desired_width(240.0),
            );

            ui.add_space(8.0);
            egui::ComboBox::from_id_salt("setting")
                .selected_text(app.ui.setting_choice.display_name())
                .show_ui(ui, |ui| {
                    for setting in GameSetting::ALL {
                        ui.selectable_value(
                            &mut app.ui.setting_choice,
                            setting,
                            setting.display_name(),
                        );
                    }
                });

            let name = app.ui.name_input.trim().to_string();
            let has_name = !name.is_empty();

            ui.add_space(12.0);
            let mut continue_now = response.lost_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter))
                && has_name;
            let mut new_now = false;

            ui.horizontal(|ui| {
                if ui.add_enabled(has_name, egui::Button::new("Continue")).clicked() {
                    continue_now = true;
                }
                if ui.add_enabled(has_name, egui::Button::new("New game")).clicked() {
                    new_now = true;
                }
            });

            if continue_now {
                app.send_command(EngineCommand::ContinueGame { name });
            } else if new_now {
                app.send_command(EngineCommand::NewGame {
                    name,
                    setting: app.ui.setting_choice,
                });
            }

            ui.add_space(8.0);
            ui.label(
                egui::RichText::new(
                    "\"Continue\" loads your saved game. \"New game\" overwrites it.",
                )
                .small()
                .weak(),
            );

            if let Some(notice) = &app.view.notice {
                ui.add_space(8.0);
                ui.colored_label(egui::Color32::LIGHT_YELLOW, notice);
            }
        });
    });
}
