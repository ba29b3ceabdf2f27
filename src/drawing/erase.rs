//! Proximity eraser that cuts strokes into pieces.
//!
//! Points within the radius are dropped and each stroke is split at the gaps.
//! Surviving runs shorter than two points cannot be drawn and are discarded.

use super::geo::{LatLng, distance_meters};
use super::model::{Point, Stroke};

/// Result of one erase pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EraseOutcome {
    pub strokes: Vec<Stroke>,
    /// True if at least one point was within the radius
    pub changed: bool,
}

/// Erase every point within `radius_meters` of `center`.
///
/// Pure: the input is left untouched and the caller stores the result.
pub fn erase_near(center: LatLng, radius_meters: f64, strokes: &[Stroke]) -> EraseOutcome {
    if radius_meters <= 0.0 {
        return EraseOutcome {
            strokes: strokes.to_vec(),
            changed: false,
        };
    }

    let mut changed = false;
    let mut result = Vec::with_capacity(strokes.len());

    for stroke in strokes {
        let keep: Vec<bool> = stroke
            .points
            .iter()
            .map(|p| distance_meters(center, p.position()) > radius_meters)
            .collect();

        if keep.iter().all(|k| *k) {
            result.push(stroke.clone());
            continue;
        }

        changed = true;
        result.extend(split_kept_runs(stroke, &keep));
    }

    EraseOutcome {
        strokes: result,
        changed,
    }
}

/// Collect consecutive kept points into new strokes of at least two points.
fn split_kept_runs(stroke: &Stroke, keep: &[bool]) -> Vec<Stroke> {
    let mut pieces = Vec::new();
    let mut run = Vec::new();

    for (point, kept) in stroke.points.iter().zip(keep) {
        if *kept {
            run.push(point.clone());
        } else if !run.is_empty() {
            push_run(&mut pieces, std::mem::take(&mut run));
        }
    }
    push_run(&mut pieces, run);

    pieces
}

fn push_run(pieces: &mut Vec<Stroke>, run: Vec<Point>) {
    let piece = Stroke::new(run);
    if piece.is_drawable() {
        pieces.push(piece);
    }
}
