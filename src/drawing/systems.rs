//! Bevy adapter for the drawing session.

use bevy::input::ButtonState;
use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowEvent};
use bevy_egui::EguiContexts;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::AppConfig;
use crate::constants::DRAWINGS_STORAGE_KEY;
use crate::map::{
    MapGestureGate, MapGizmoGroup, MapView, PolylineLayer, background_painter, paint_polylines,
};
use crate::storage::{AppStorage, FileStore, SharedStore};
use crate::theme;
use crate::ui::DialogState;

use super::input::{InputEvent, InputSource};
use super::model::{Mode, Style};
use super::session::DrawingSession;

pub type AppDrawingSession = DrawingSession<SharedStore<FileStore>, PolylineLayer>;

/// The application's drawing session
#[derive(Resource, Deref, DerefMut)]
pub struct Drawing(AppDrawingSession);

/// System set for creating the [`Drawing`] resource at startup
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrawingReady;

/// Live touch contacts, keyed by touch id.
#[derive(Resource, Debug, Default)]
pub struct TouchTracker {
    contacts: BTreeMap<u64, Vec2>,
    /// Contacts that began over a panel; they never reach the router alone
    ignored: BTreeSet<u64>,
}

impl TouchTracker {
    /// Record a new contact and return the contact count.
    pub fn start(&mut self, id: u64, at: Vec2, ignored: bool) -> usize {
        self.contacts.insert(id, at);
        if ignored {
            self.ignored.insert(id);
        }
        self.contacts.len()
    }

    pub fn moved(&mut self, id: u64, at: Vec2) -> usize {
        if let Some(position) = self.contacts.get_mut(&id) {
            *position = at;
        }
        self.contacts.len()
    }

    /// Forget a lifted or cancelled contact and return the remaining count.
    pub fn end(&mut self, id: u64) -> usize {
        self.contacts.remove(&id);
        self.ignored.remove(&id);
        self.contacts.len()
    }

    pub fn is_ignored(&self, id: u64) -> bool {
        self.ignored.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.contacts.len()
    }
}

pub fn init_drawing_session(
    mut commands: Commands,
    config: Res<AppConfig>,
    storage: Res<AppStorage>,
) {
    let style = Style::new(
        config.data.default_color.clone(),
        config.data.default_weight.max(1),
    );
    let session = DrawingSession::new(
        storage.0.clone(),
        PolylineLayer::new(),
        DRAWINGS_STORAGE_KEY,
        style,
        config.data.erase_settings(),
    );
    commands.insert_resource(Drawing(session));
}

/// Only allow single-pointer map panning while nothing is armed.
pub fn sync_gesture_gate(drawing: Res<Drawing>, mut gate: ResMut<MapGestureGate>) {
    let allowed = drawing.native_pan_enabled();
    if gate.single_pointer_pan != allowed {
        gate.single_pointer_pan = allowed;
    }
}

/// Map one touch phase to router input. `blocked` means the contact landed on a panel.
fn touch_event(
    tracker: &mut TouchTracker,
    touch: &TouchInput,
    view: &MapView,
    blocked: bool,
) -> Option<InputEvent> {
    let position = view.screen_to_latlng(touch.position);
    match touch.phase {
        TouchPhase::Started => {
            let contacts = tracker.start(touch.id, touch.position, blocked);
            if blocked && contacts == 1 {
                return None;
            }
            Some(InputEvent::TouchStart { position, contacts })
        }
        TouchPhase::Moved => {
            let contacts = tracker.moved(touch.id, touch.position);
            if tracker.is_ignored(touch.id) && contacts == 1 {
                return None;
            }
            Some(InputEvent::TouchMove { position, contacts })
        }
        TouchPhase::Ended | TouchPhase::Canceled => {
            let contacts = tracker.end(touch.id);
            Some(InputEvent::TouchEnd { contacts })
        }
    }
}

/// Feed window events to the session in the order the window delivered them.
pub fn route_window_input(
    mut window_events: MessageReader<WindowEvent>,
    view: Res<MapView>,
    mut touches: ResMut<TouchTracker>,
    mut drawing: ResMut<Drawing>,
    dialogs: Res<DialogState>,
    mut contexts: EguiContexts,
    mut cursor: Local<Option<Vec2>>,
) {
    let over_ui = contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false);
    let blocked = over_ui || dialogs.any_modal_open;

    for event in window_events.read() {
        let input = match event {
            WindowEvent::CursorMoved(moved) => {
                *cursor = Some(moved.position);
                Some(InputEvent::PointerMove {
                    position: view.screen_to_latlng(moved.position),
                })
            }
            WindowEvent::MouseButtonInput(button) if button.button == MouseButton::Left => {
                match button.state {
                    ButtonState::Pressed if !blocked => cursor.map(|at| InputEvent::PointerDown {
                        position: view.screen_to_latlng(at),
                    }),
                    ButtonState::Pressed => None,
                    ButtonState::Released => Some(InputEvent::PointerUp),
                }
            }
            WindowEvent::TouchInput(touch) => touch_event(&mut touches, touch, &view, blocked),
            _ => None,
        };

        if let Some(input) = input {
            drawing.handle_input(input);
        }
    }
}

pub fn handle_drawing_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut drawing: ResMut<Drawing>,
    dialogs: Res<DialogState>,
    mut contexts: EguiContexts,
) {
    // Don't steal keys from text fields
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }
    if dialogs.any_modal_open {
        return;
    }

    let ctrl = keyboard.any_pressed([
        KeyCode::ControlLeft,
        KeyCode::ControlRight,
        KeyCode::SuperLeft,
        KeyCode::SuperRight,
    ]);

    if ctrl && keyboard.just_pressed(KeyCode::KeyZ) {
        if !drawing.undo() {
            debug!("Nothing to undo");
        }
        return;
    }

    let current = drawing.mode();
    let next = if keyboard.just_pressed(KeyCode::KeyD) {
        current.toggled(Mode::Drawing)
    } else if keyboard.just_pressed(KeyCode::KeyE) {
        current.toggled(Mode::Erasing)
    } else if keyboard.just_pressed(KeyCode::Escape) {
        Mode::Idle
    } else {
        current
    };
    drawing.set_mode(next);
}

/// Outline the eraser footprint under the mouse cursor.
pub fn draw_eraser_cursor(
    mut gizmos: Gizmos<MapGizmoGroup>,
    drawing: Res<Drawing>,
    view: Res<MapView>,
    window_query: Query<&Window, With<PrimaryWindow>>,
) {
    if drawing.mode() != Mode::Erasing {
        return;
    }
    let Some(cursor) = window_query.single().ok().and_then(Window::cursor_position) else {
        return;
    };

    let radius_px = drawing.erase_radius(InputSource::Pointer) / view.meters_per_pixel();
    gizmos.circle_2d(
        view.screen_to_world(cursor),
        (radius_px as f32).max(2.0),
        theme::ERASER_OUTLINE,
    );
}

pub fn paint_drawing(
    mut contexts: EguiContexts,
    view: Res<MapView>,
    drawing: Res<Drawing>,
) -> Result {
    let painter = background_painter(&mut contexts)?;
    paint_polylines(&painter, &view, drawing.overlay());
    Ok(())
}
