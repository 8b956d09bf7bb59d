use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::game_state::PlayerState;
use super::app::MyApp;

pub fn draw_stats_panel(ctx: &egui::Context, app: &mut MyApp) {
    egui::SidePanel::left("player_stats")
        .resizable(false)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading(app.view.setting.display_name());
            ui.separator();

            ui.label(egui::RichText::new("Health").strong());
            let health = app.view.player_state.display_health();
            ui.add(
                egui::ProgressBar::new(health as f32 / 100.0)
                    .text(format!("{health} / 100"))
                    .fill(health_color(health)),
            );

            ui.add_space(12.0);
            ui.label(egui::RichText::new("Inventory").strong());
            draw_inventory(ui, &app.view.player_state);

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                draw_connection_status(ui, app);
            });
        });
}

fn draw_inventory(ui: &mut egui::Ui, player: &PlayerState) {
    if player.inventory.is_empty() {
        ui.label(egui::RichText::new("Your pack is empty.").italics().weak());
        return;
    }

    for item in &player.inventory {
        ui.label(format!("• {item}"));
    }
}

fn draw_connection_status(ui: &mut egui::Ui, app: &mut MyApp) {
    match &app.ui.connection_status {
        Some(Ok(msg)) => {
            ui.colored_label(egui::Color32::LIGHT_GREEN, msg);
        }
        Some(Err(err)) => {
            ui.colored_label(egui::Color32::LIGHT_RED, err);
        }
        None => {}
    }

    if ui.button("Test connection").clicked() {
        app.ui.connection_status = None;
        app.send_command(EngineCommand::TestConnection);
    }
}

fn health_color(health: i32) -> egui::Color32 {
    if health > 60 {
        egui::Color32::from_rgb(60, 160, 80)
    } else if health > 30 {
        egui::Color32::from_rgb(200, 170, 40)
    } else {
        egui::Color32::from_rgb(190, 60, 50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_bands() {
        assert_eq!(health_color(100), health_color(61));
        assert_eq!(health_color(60), health_color(31));
        assert_eq!(health_color(30), health_color(0));
        assert_ne!(health_color(61), health_color(60));
        assert_ne!(health_color(31), health_color(30));
    }
}
