//! Drawing session: the toolbar-facing orchestrator.
//!
//! Owns the stroke store, the gesture router, the overlay projection and the
//! storage handle. Every completed mutation is rendered and then flushed to
//! storage synchronously. Storage failures are logged and remembered for the
//! UI, but the in-memory drawing keeps working.

use bevy::prelude::*;

use crate::storage::KeyValueStore;

use super::erase::erase_near;
use super::geo::LatLng;
use super::input::{InputEvent, InputRouter, InputSource, Intent};
use super::model::{Mode, Stroke, Style};
use super::path_store::{PathStore, StrokeHandle};
use super::persistence::{load_drawings, save_drawings};
use super::render_sync::{LineOverlay, RenderSync};

/// Erase radius multipliers applied to the current stroke weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraseSettings {
    /// Meters per weight unit for mouse input
    pub pointer_factor: f64,
    /// Meters per weight unit for touch input
    pub touch_factor: f64,
}

impl Default for EraseSettings {
    fn default() -> Self {
        Self {
            pointer_factor: 1.5,
            touch_factor: 3.0,
        }
    }
}

impl EraseSettings {
    pub fn radius_meters(&self, weight: u32, source: InputSource) -> f64 {
        let factor = match source {
            InputSource::Pointer => self.pointer_factor,
            InputSource::Touch => self.touch_factor,
        };
        f64::from(weight) * factor
    }
}

pub struct DrawingSession<S, O: LineOverlay> {
    paths: PathStore,
    router: InputRouter,
    render: RenderSync<O::Handle>,
    overlay: O,
    storage: S,
    storage_key: String,
    mode: Mode,
    style: Style,
    erase: EraseSettings,
    active: Option<StrokeHandle>,
    /// Latest failed write, kept until dismissed or a later write succeeds
    persist_error: Option<String>,
}

impl<S, O> DrawingSession<S, O>
where
    S: KeyValueStore,
    O: LineOverlay,
{
    /// Start a session from whatever is stored under `storage_key`.
    pub fn new(
        storage: S,
        overlay: O,
        storage_key: impl Into<String>,
        style: Style,
        erase: EraseSettings,
    ) -> Self {
        let storage_key = storage_key.into();
        let mut paths = PathStore::new();
        let loaded = load_drawings(&storage, &storage_key);
        info!("Loaded {} stroke(s) from storage", loaded.len());
        paths.replace_all(loaded);

        let mut session = Self {
            paths,
            router: InputRouter::new(),
            render: RenderSync::new(),
            overlay,
            storage,
            storage_key,
            mode: Mode::Idle,
            style,
            erase,
            active: None,
            persist_error: None,
        };
        session.sync_overlay();
        session
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn strokes(&self) -> &[Stroke] {
        self.paths.strokes()
    }

    pub fn snapshot(&self) -> Vec<Stroke> {
        self.paths.snapshot()
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn is_stroke_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the host may pan the map with a single pointer drag.
    pub fn native_pan_enabled(&self) -> bool {
        self.router.native_pan_enabled()
    }

    /// Erase radius for the current weight.
    pub fn erase_radius(&self, source: InputSource) -> f64 {
        self.erase.radius_meters(self.style.weight, source)
    }

    pub fn persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    pub fn dismiss_persist_error(&mut self) {
        self.persist_error = None;
    }

    /// Arm or disarm input capture. Leaving draw mode finalizes the current stroke.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        let intents = self.router.set_mode(mode);
        self.apply_all(intents);
        info!("Drawing mode: {} -> {}", self.mode.display_name(), mode.display_name());
        self.mode = mode;
    }

    /// Style for strokes started from now on.
    pub fn set_style(&mut self, color: impl Into<String>, weight: u32) {
        self.style = Style::new(color, weight.max(1));
    }

    /// Feed one host input event through the router.
    pub fn handle_input(&mut self, event: InputEvent) {
        let intents = self.router.handle(event);
        self.apply_all(intents);
    }

    /// Remove the newest stroke. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.paths.undo_last() {
            return false;
        }
        self.sync_overlay();
        self.persist();
        true
    }

    pub fn clear_all(&mut self) {
        self.paths.clear_all();
        self.active = None;
        self.sync_overlay();
        self.persist();
        info!("Cleared all drawings");
    }

    /// Write the current drawing now.
    pub fn save(&mut self) -> Result<(), String> {
        if self.persist() {
            return Ok(());
        }
        Err(self
            .persist_error
            .clone()
            .unwrap_or_else(|| "Unknown storage error".to_string()))
    }

    fn apply_all(&mut self, intents: Vec<Intent>) {
        for intent in intents {
            self.apply(intent);
        }
    }

    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::BeginStroke { position } => self.begin_stroke(position),
            Intent::ExtendStroke { position } => {
                if let Some(handle) = self.active
                    && self.paths.append_point(handle, position)
                {
                    self.sync_overlay();
                }
            }
            Intent::EndStroke => self.end_stroke(),
            Intent::EraseAt { position, source } => {
                self.erase_at(position, self.erase_radius(source));
            }
        }
    }

    fn begin_stroke(&mut self, position: LatLng) {
        if self.active.is_some() {
            self.end_stroke();
        }
        let handle = self.paths.begin_stroke(&self.style);
        self.paths.append_point(handle, position);
        self.active = Some(handle);
        self.sync_overlay();
    }

    fn end_stroke(&mut self) {
        let Some(handle) = self.active.take() else {
            return;
        };
        if self.paths.finalize_stroke(handle) {
            debug!("Stroke finished ({} total)", self.paths.len());
        } else {
            debug!("Discarded stroke with fewer than two points");
        }
        self.sync_overlay();
        self.persist();
    }

    fn erase_at(&mut self, position: LatLng, radius_meters: f64) {
        let outcome = erase_near(position, radius_meters, self.paths.strokes());
        if !outcome.changed {
            return;
        }
        self.paths.replace_all(outcome.strokes);
        self.active = None;
        self.sync_overlay();
        self.persist();
    }

    fn sync_overlay(&mut self) {
        self.render.sync(self.paths.strokes(), &mut self.overlay);
    }

    /// Returns true if the write succeeded.
    fn persist(&mut self) -> bool {
        match save_drawings(&mut self.storage, &self.storage_key, self.paths.strokes()) {
            Ok(()) => {
                self.persist_error = None;
                true
            }
            Err(e) => {
                warn!("Failed to save drawings, keeping them in memory: {}", e);
                self.persist_error = Some(e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::render_sync::tests::RecordingOverlay;
    use crate::storage::{MemoryStore, SharedStore};

    const KEY: &str = "drawings";

    type TestSession = DrawingSession<SharedStore<MemoryStore>, RecordingOverlay>;

    fn session_with(store: MemoryStore) -> (TestSession, SharedStore<MemoryStore>) {
        let shared = SharedStore::new(store);
        let session = DrawingSession::new(
            shared.clone(),
            RecordingOverlay::default(),
            KEY,
            Style::new("#ff0000", 5),
            EraseSettings::default(),
        );
        (session, shared)
    }

    fn at(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng)
    }

    fn drag(session: &mut TestSession, points: &[(f64, f64)]) {
        let mut iter = points.iter();
        if let Some((lat, lng)) = iter.next() {
            session.handle_input(InputEvent::PointerDown { position: at(*lat, *lng) });
        }
        for (lat, lng) in iter {
            session.handle_input(InputEvent::PointerMove { position: at(*lat, *lng) });
        }
        session.handle_input(InputEvent::PointerUp);
    }

    fn stored(shared: &SharedStore<MemoryStore>) -> Vec<Stroke> {
        load_drawings(shared, KEY)
    }

    #[test]
    fn test_draw_stroke_is_rendered_and_persisted() {
        let (mut session, shared) = session_with(MemoryStore::new());
        session.set_mode(Mode::Drawing);
        drag(&mut session, &[(10.0, 20.0), (10.001, 20.001)]);

        assert_eq!(session.strokes().len(), 1);
        assert_eq!(session.strokes()[0].len(), 2);
        assert_eq!(session.overlay().visible().len(), 1);
        assert_eq!(stored(&shared), session.snapshot());
    }

    #[test]
    fn test_taps_leave_nothing() {
        let (mut session, shared) = session_with(MemoryStore::new());
        session.set_mode(Mode::Drawing);
        drag(&mut session, &[(1.0, 1.0)]);
        drag(&mut session, &[(2.0, 2.0)]);

        assert!(session.strokes().is_empty());
        assert!(session.overlay().lines.is_empty());
        assert!(stored(&shared).is_empty());
    }

    #[test]
    fn test_live_stroke_is_visible_while_drawing() {
        let (mut session, _) = session_with(MemoryStore::new());
        session.set_mode(Mode::Drawing);
        session.handle_input(InputEvent::PointerDown { position: at(0.0, 0.0) });
        session.handle_input(InputEvent::PointerMove { position: at(0.0, 0.001) });
        assert!(session.is_stroke_active());
        assert_eq!(session.overlay().visible()[0].0.len(), 2);
    }

    #[test]
    fn test_style_applies_to_new_strokes_only() {
        let (mut session, _) = session_with(MemoryStore::new());
        session.set_mode(Mode::Drawing);
        drag(&mut session, &[(0.0, 0.0), (0.0, 1.0)]);
        session.set_style("#0000ff", 12);
        drag(&mut session, &[(1.0, 0.0), (1.0, 1.0)]);

        assert_eq!(session.strokes()[0].style(), Style::new("#ff0000", 5));
        assert_eq!(session.strokes()[1].style(), Style::new("#0000ff", 12));
    }

    #[test]
    fn test_idle_mid_stroke_finalizes_and_restores_pan() {
        let (mut session, shared) = session_with(MemoryStore::new());
        session.set_mode(Mode::Drawing);
        assert!(!session.native_pan_enabled());
        session.handle_input(InputEvent::PointerDown { position: at(0.0, 0.0) });
        session.handle_input(InputEvent::PointerMove { position: at(0.0, 0.001) });

        session.set_mode(Mode::Idle);
        assert!(!session.is_stroke_active());
        assert!(session.native_pan_enabled());
        assert_eq!(stored(&shared).len(), 1);
    }

    #[test]
    fn test_erase_splits_and_persists() {
        let (mut session, shared) = session_with(MemoryStore::new());
        session.set_mode(Mode::Drawing);
        let line: Vec<(f64, f64)> = (0..7).map(|i| (0.0, i as f64 * 0.0001)).collect();
        drag(&mut session, &line);

        // weight 5 * 1.5 = 7.5 m radius, neighbours are ~11 m apart
        session.set_mode(Mode::Erasing);
        session.handle_input(InputEvent::PointerDown { position: at(0.0, 0.0003) });
        session.handle_input(InputEvent::PointerUp);

        assert_eq!(session.strokes().len(), 2);
        assert_eq!(session.overlay().visible().len(), 2);
        assert_eq!(stored(&shared).len(), 2);
    }

    #[test]
    fn test_touch_erase_uses_wider_radius() {
        let (mut session, _) = session_with(MemoryStore::new());
        session.set_mode(Mode::Drawing);
        let line: Vec<(f64, f64)> = (0..7).map(|i| (0.0, i as f64 * 0.0001)).collect();
        drag(&mut session, &line);

        // weight 5 * 3.0 = 15 m radius reaches both neighbours
        session.set_mode(Mode::Erasing);
        session.handle_input(InputEvent::TouchStart { position: at(0.0, 0.0003), contacts: 1 });
        session.handle_input(InputEvent::TouchEnd { contacts: 0 });

        let lengths: Vec<usize> = session.strokes().iter().map(Stroke::len).collect();
        assert_eq!(lengths, vec![2, 2]);
    }

    #[test]
    fn test_pinch_never_draws() {
        let (mut session, _) = session_with(MemoryStore::new());
        session.set_mode(Mode::Drawing);
        session.handle_input(InputEvent::TouchStart { position: at(0.0, 0.0), contacts: 2 });
        session.handle_input(InputEvent::TouchMove { position: at(0.0, 0.01), contacts: 2 });
        session.handle_input(InputEvent::TouchMove { position: at(0.0, 0.02), contacts: 2 });
        session.handle_input(InputEvent::TouchEnd { contacts: 0 });
        assert!(session.strokes().is_empty());
    }

    #[test]
    fn test_undo_and_clear() {
        let (mut session, shared) = session_with(MemoryStore::new());
        assert!(!session.undo());

        session.set_mode(Mode::Drawing);
        drag(&mut session, &[(0.0, 0.0), (0.0, 1.0)]);
        drag(&mut session, &[(1.0, 0.0), (1.0, 1.0)]);

        assert!(session.undo());
        assert_eq!(session.strokes().len(), 1);
        assert_eq!(stored(&shared).len(), 1);
        assert_eq!(session.overlay().visible().len(), 1);

        session.clear_all();
        assert!(session.strokes().is_empty());
        assert!(stored(&shared).is_empty());
        assert!(session.overlay().lines.is_empty());
    }

    #[test]
    fn test_loads_existing_drawings_and_renders_them() {
        let mut store = MemoryStore::new();
        store.insert_raw(
            KEY,
            r##"[[{"lat":0,"lng":0,"color":"#abcdef","weight":3},{"lat":0,"lng":1,"color":"#abcdef","weight":3}]]"##,
        );
        let (session, _) = session_with(store);
        assert_eq!(session.strokes().len(), 1);
        assert_eq!(session.overlay().visible()[0].1, Style::new("#abcdef", 3));
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let mut store = MemoryStore::new();
        store.insert_raw(KEY, "not json");
        let (session, _) = session_with(store);
        assert!(session.strokes().is_empty());
    }

    #[test]
    fn test_write_failure_keeps_drawing_in_memory() {
        let (mut session, _) = session_with(MemoryStore::with_quota(10));
        session.set_mode(Mode::Drawing);
        drag(&mut session, &[(0.0, 0.0), (0.0, 1.0)]);

        assert_eq!(session.strokes().len(), 1);
        assert!(session.persist_error().is_some());
        assert!(session.save().is_err());

        // Drawing keeps working after the failure
        drag(&mut session, &[(1.0, 0.0), (1.0, 1.0)]);
        assert_eq!(session.strokes().len(), 2);

        session.dismiss_persist_error();
        assert!(session.persist_error().is_none());
    }

    #[test]
    fn test_save_is_idempotent() {
        let (mut session, shared) = session_with(MemoryStore::new());
        session.set_mode(Mode::Drawing);
        drag(&mut session, &[(0.0, 0.0), (0.0, 1.0)]);
        assert!(session.save().is_ok());
        let first = shared.get(KEY);
        assert!(session.save().is_ok());
        assert_eq!(shared.get(KEY), first);
    }

    #[test]
    fn test_undo_mid_stroke_makes_handle_stale() {
        let (mut session, _) = session_with(MemoryStore::new());
        session.set_mode(Mode::Drawing);
        session.handle_input(InputEvent::PointerDown { position: at(0.0, 0.0) });
        session.handle_input(InputEvent::PointerMove { position: at(0.0, 1.0) });
        assert!(session.undo());
        session.handle_input(InputEvent::PointerMove { position: at(0.0, 2.0) });
        session.handle_input(InputEvent::PointerUp);
        assert!(session.strokes().is_empty());
    }

    #[test]
    fn test_erase_radius() {
        let erase = EraseSettings::default();
        assert_eq!(erase.radius_meters(5, InputSource::Pointer), 7.5);
        assert_eq!(erase.radius_meters(5, InputSource::Touch), 15.0);
    }
}
