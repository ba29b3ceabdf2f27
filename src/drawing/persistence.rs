//! Load/save of the drawing state under a single storage key.
//!
//! Loading never fails: missing, corrupt or oddly shaped data yields an empty
//! (or partially recovered) drawing. Saving reports errors to the caller.

use bevy::prelude::*;

use crate::storage::{KeyValueStore, StorageError};

use super::model::{Stroke, Style};

/// Read persisted strokes.
///
/// Malformed strokes are skipped individually, strokes that cannot be drawn
/// are dropped, and each stroke is restyled from its first point.
pub fn load_drawings(store: &impl KeyValueStore, key: &str) -> Vec<Stroke> {
    let Some(raw) = store.get(key) else {
        return Vec::new();
    };
    decode_drawings(&raw)
}

pub fn decode_drawings(raw: &str) -> Vec<Stroke> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Discarding stored drawings, not valid JSON: {}", e);
            return Vec::new();
        }
    };

    let serde_json::Value::Array(items) = value else {
        warn!("Discarding stored drawings, expected an array");
        return Vec::new();
    };

    let total = items.len();
    let strokes: Vec<Stroke> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Stroke>(item).ok())
        .filter(Stroke::is_drawable)
        .map(uniform_style)
        .collect();

    if strokes.len() < total {
        warn!(
            "Skipped {} unusable stored stroke(s) out of {}",
            total - strokes.len(),
            total
        );
    }
    strokes
}

fn uniform_style(mut stroke: Stroke) -> Stroke {
    let Style { color, weight } = stroke.style();
    for point in &mut stroke.points {
        if point.color != color {
            point.color = color.clone();
        }
        point.weight = weight;
    }
    stroke
}

/// Encode strokes for storage, leaving out any that cannot be drawn.
pub fn encode_drawings(strokes: &[Stroke]) -> Result<String, serde_json::Error> {
    let drawable: Vec<&Stroke> = strokes.iter().filter(|s| s.is_drawable()).collect();
    serde_json::to_string(&drawable)
}

pub fn save_drawings(
    store: &mut impl KeyValueStore,
    key: &str,
    strokes: &[Stroke],
) -> Result<(), StorageError> {
    let json = encode_drawings(strokes)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::geo::LatLng;
    use crate::drawing::model::Point;
    use crate::storage::MemoryStore;

    const KEY: &str = "drawings";

    fn stroke(color: &str, n: usize) -> Stroke {
        let style = Style::new(color, 5);
        Stroke::new(
            (0..n)
                .map(|i| Point::new(LatLng::new(7.5, 125.5 + i as f64 * 0.25), &style))
                .collect(),
        )
    }

    #[test]
    fn test_missing_key_is_empty() {
        let store = MemoryStore::new();
        assert!(load_drawings(&store, KEY).is_empty());
    }

    #[test]
    fn test_not_json_is_empty() {
        let mut store = MemoryStore::new();
        store.insert_raw(KEY, "not json");
        assert!(load_drawings(&store, KEY).is_empty());
    }

    #[test]
    fn test_not_an_array_is_empty() {
        for raw in [r#"{"a":1}"#, "42", "null", r#""text""#] {
            assert!(decode_drawings(raw).is_empty(), "{}", raw);
        }
    }

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        let strokes = vec![stroke("#ff0000", 3), stroke("#2563eb", 2)];
        save_drawings(&mut store, KEY, &strokes).unwrap();
        assert_eq!(load_drawings(&store, KEY), strokes);
    }

    #[test]
    fn test_save_skips_undrawable() {
        let mut store = MemoryStore::new();
        let strokes = vec![stroke("#ff0000", 1), stroke("#ff0000", 2), Stroke::default()];
        save_drawings(&mut store, KEY, &strokes).unwrap();
        let loaded = load_drawings(&store, KEY);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].len(), 2);
    }

    #[test]
    fn test_partial_recovery_skips_bad_strokes() {
        let raw = r##"[
            [{"lat":1,"lng":2,"color":"#ff0000","weight":3},{"lat":1,"lng":3,"color":"#ff0000","weight":3}],
            "garbage",
            [{"lat":1}],
            [{"lat":5,"lng":5,"color":"#000000","weight":2}]
        ]"##;
        let strokes = decode_drawings(raw);
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].style(), Style::new("#ff0000", 3));
    }

    #[test]
    fn test_mixed_styles_take_first_point() {
        let raw = r##"[[
            {"lat":0,"lng":0,"color":"#111111","weight":2},
            {"lat":0,"lng":1,"color":"#222222","weight":9}
        ]]"##;
        let strokes = decode_drawings(raw);
        assert!(strokes[0]
            .points
            .iter()
            .all(|p| p.color == "#111111" && p.weight == 2));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut store = MemoryStore::with_quota(4);
        let result = save_drawings(&mut store, KEY, &[stroke("#ff0000", 2)]);
        assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));
    }
}
