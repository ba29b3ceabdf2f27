mod dialogs;
mod history_panel;
mod marker_popup;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::ConfigResetNotification;
use crate::markers::MarkerPopupState;

/// Resource that tracks whether any modal dialog is currently open.
/// Map and drawing input handlers check this so a dialog click never
/// lands on the map underneath.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block map input
    pub any_modal_open: bool,
}

/// Aggregate all dialog open states into a single resource.
/// Runs in First schedule before input handlers.
fn update_dialog_state(
    toolbar: Res<toolbar::ToolbarState>,
    history: Res<history_panel::HistoryPanelState>,
    popup: Res<MarkerPopupState>,
    config_reset: Res<ConfigResetNotification>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open = toolbar.confirm_erase_all
        || toolbar.save_result.is_some()
        || history.confirm_reset
        || popup.is_modal_open()
        || config_reset.show;
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .init_resource::<toolbar::ToolbarState>()
            .init_resource::<history_panel::HistoryPanelState>()
            // Side panel must render first so top panels fit beside it
            .add_systems(EguiPrimaryContextPass, history_panel::history_panel_ui)
            .add_systems(
                EguiPrimaryContextPass,
                (toolbar::toolbar_ui, toolbar::persistence_error_banner_ui)
                    .chain()
                    .after(history_panel::history_panel_ui),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    toolbar::toolbar_dialogs_ui,
                    marker_popup::marker_popup_ui,
                    history_panel::history_dialogs_ui,
                    dialogs::config_reset_notification_ui,
                )
                    .after(toolbar::persistence_error_banner_ui),
            )
            .add_systems(First, update_dialog_state);
    }
}
