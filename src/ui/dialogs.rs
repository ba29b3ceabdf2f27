use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::config::{AppConfig, ConfigResetNotification, SaveConfigRequest};

/// Tells the user their settings file was unreadable and defaults are in use.
pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    egui::Window::new("Settings Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Your settings could not be loaded and were reset to defaults.");
            if let Some(reason) = &notification.reason {
                ui.add_space(5.0);
                ui.label(egui::RichText::new(reason.as_str()).weak());
            }
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    notification.show = false;
                }
                if ui
                    .button("Overwrite with defaults")
                    .on_hover_text("Replace the unreadable settings file")
                    .clicked()
                {
                    config.dirty = true;
                    save_events.write(SaveConfigRequest);
                    notification.show = false;
                }
            });
        });
    Ok(())
}
