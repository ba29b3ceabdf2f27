//! In-memory owner of the drawing state.
//!
//! `PathStore` only mutates data. Rendering and persistence are driven by the
//! session after each mutation.

use super::geo::LatLng;
use super::model::{Point, Stroke, Style};

/// Identifies a stroke that is still receiving points.
///
/// Handles stay valid until the stroke is finalized, undone, cleared or the
/// whole state is replaced; after that every use is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrokeHandle(u64);

/// A stroke that has been started but not finalized yet.
#[derive(Debug)]
struct OpenStroke {
    id: u64,
    style: Style,
}

#[derive(Debug, Default)]
pub struct PathStore {
    strokes: Vec<Stroke>,
    /// Parallel to `strokes`
    ids: Vec<u64>,
    open: Vec<OpenStroke>,
    next_id: u64,
}

impl PathStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        // The stroke being drawn is almost always the last one
        self.ids.iter().rposition(|candidate| *candidate == id)
    }

    fn forget_open(&mut self, id: u64) -> Option<OpenStroke> {
        let pos = self.open.iter().position(|o| o.id == id)?;
        Some(self.open.remove(pos))
    }

    /// Append an empty stroke that later points will be added to.
    pub fn begin_stroke(&mut self, style: &Style) -> StrokeHandle {
        let id = self.allocate_id();
        self.strokes.push(Stroke::default());
        self.ids.push(id);
        self.open.push(OpenStroke {
            id,
            style: style.clone(),
        });
        StrokeHandle(id)
    }

    /// Push a point carrying the stroke's style. Stale handles are ignored.
    pub fn append_point(&mut self, handle: StrokeHandle, position: LatLng) -> bool {
        let Some(open) = self.open.iter().find(|o| o.id == handle.0) else {
            return false;
        };
        let point = Point::new(position, &open.style);
        let Some(index) = self.index_of(handle.0) else {
            return false;
        };
        self.strokes[index].points.push(point);
        true
    }

    /// Close a stroke. Strokes with fewer than two points are removed.
    ///
    /// Returns true if the stroke was kept.
    pub fn finalize_stroke(&mut self, handle: StrokeHandle) -> bool {
        if self.forget_open(handle.0).is_none() {
            return false;
        }
        let Some(index) = self.index_of(handle.0) else {
            return false;
        };
        if self.strokes[index].is_drawable() {
            return true;
        }
        self.strokes.remove(index);
        self.ids.remove(index);
        false
    }

    /// Remove the most recently added stroke, finalized or not.
    pub fn undo_last(&mut self) -> bool {
        let Some(id) = self.ids.pop() else {
            return false;
        };
        self.strokes.pop();
        self.forget_open(id);
        true
    }

    pub fn clear_all(&mut self) {
        self.strokes.clear();
        self.ids.clear();
        self.open.clear();
    }

    /// Bulk replace the state. Every outstanding handle becomes stale.
    pub fn replace_all(&mut self, strokes: Vec<Stroke>) {
        self.clear_all();
        for stroke in strokes {
            let id = self.allocate_id();
            self.strokes.push(stroke);
            self.ids.push(id);
        }
    }

    pub fn snapshot(&self) -> Vec<Stroke> {
        self.strokes.clone()
    }

    /// Borrowed view of the current strokes, in z-order.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Style {
        Style::new("#ff0000", 5)
    }

    #[test]
    fn test_begin_append_finalize_keeps_two_point_stroke() {
        let mut store = PathStore::new();
        let handle = store.begin_stroke(&red());
        store.append_point(handle, LatLng::new(10.0, 20.0));
        store.append_point(handle, LatLng::new(10.001, 20.001));
        assert!(store.finalize_stroke(handle));

        let strokes = store.snapshot();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].len(), 2);
        for p in &strokes[0].points {
            assert_eq!(p.color, "#ff0000");
            assert_eq!(p.weight, 5);
        }
    }

    #[test]
    fn test_single_point_taps_are_discarded() {
        let mut store = PathStore::new();
        for _ in 0..2 {
            let handle = store.begin_stroke(&red());
            store.append_point(handle, LatLng::new(1.0, 1.0));
            assert!(!store.finalize_stroke(handle));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_stroke_is_discarded() {
        let mut store = PathStore::new();
        let handle = store.begin_stroke(&red());
        store.finalize_stroke(handle);
        assert!(store.is_empty());
    }

    #[test]
    fn test_finalize_never_leaves_short_strokes() {
        let mut store = PathStore::new();
        for n in 0..6 {
            let handle = store.begin_stroke(&red());
            for i in 0..n {
                store.append_point(handle, LatLng::new(i as f64, 0.0));
            }
            store.finalize_stroke(handle);
        }
        assert!(store.strokes().iter().all(Stroke::is_drawable));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_append_after_finalize_is_noop() {
        let mut store = PathStore::new();
        let handle = store.begin_stroke(&red());
        store.append_point(handle, LatLng::new(0.0, 0.0));
        store.append_point(handle, LatLng::new(0.0, 1.0));
        store.finalize_stroke(handle);

        assert!(!store.append_point(handle, LatLng::new(0.0, 2.0)));
        assert_eq!(store.point_count(), 2);
        assert!(!store.finalize_stroke(handle));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_append_after_undo_is_noop() {
        let mut store = PathStore::new();
        let handle = store.begin_stroke(&red());
        store.append_point(handle, LatLng::new(0.0, 0.0));
        assert!(store.undo_last());
        assert!(!store.append_point(handle, LatLng::new(0.0, 1.0)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_all_invalidates_handles() {
        let mut store = PathStore::new();
        let handle = store.begin_stroke(&red());
        store.append_point(handle, LatLng::new(0.0, 0.0));
        store.replace_all(Vec::new());
        assert!(!store.append_point(handle, LatLng::new(0.0, 1.0)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_undo_on_empty_reports_nothing_removed() {
        let mut store = PathStore::new();
        assert!(!store.undo_last());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_undo_removes_most_recent() {
        let mut store = PathStore::new();
        for color in ["#111111", "#222222"] {
            let handle = store.begin_stroke(&Style::new(color, 3));
            store.append_point(handle, LatLng::new(0.0, 0.0));
            store.append_point(handle, LatLng::new(0.0, 1.0));
            store.finalize_stroke(handle);
        }
        assert!(store.undo_last());
        assert_eq!(store.len(), 1);
        assert_eq!(store.strokes()[0].style().color, "#111111");
    }

    #[test]
    fn test_replace_then_snapshot_round_trips() {
        let mut store = PathStore::new();
        let handle = store.begin_stroke(&red());
        store.append_point(handle, LatLng::new(0.0, 0.0));
        store.append_point(handle, LatLng::new(0.5, 0.5));
        store.finalize_stroke(handle);

        let before = store.snapshot();
        store.replace_all(store.snapshot());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_style_is_fixed_at_begin() {
        let mut store = PathStore::new();
        let first = store.begin_stroke(&red());
        store.append_point(first, LatLng::new(0.0, 0.0));
        store.append_point(first, LatLng::new(0.0, 1.0));
        store.finalize_stroke(first);

        let second = store.begin_stroke(&Style::new("#0000ff", 12));
        store.append_point(second, LatLng::new(1.0, 0.0));
        store.append_point(second, LatLng::new(1.0, 1.0));
        store.finalize_stroke(second);

        let strokes = store.snapshot();
        assert_eq!(strokes[0].style(), red());
        assert_eq!(strokes[1].style(), Style::new("#0000ff", 12));
    }

    #[test]
    fn test_clear_all() {
        let mut store = PathStore::new();
        let handle = store.begin_stroke(&red());
        store.append_point(handle, LatLng::new(0.0, 0.0));
        store.clear_all();
        assert!(store.is_empty());
        assert!(!store.append_point(handle, LatLng::new(0.0, 0.0)));
    }
}
