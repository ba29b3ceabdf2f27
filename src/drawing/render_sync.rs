//! Projects the stroke list onto the host's line primitives.
//!
//! Rendered lines are disposable. After [`RenderSync::sync`] the overlay holds
//! exactly one line per stroke, in order, and nothing else this module created.

use super::geo::LatLng;
use super::model::{Stroke, Style};

/// Host surface capable of showing styled polylines.
pub trait LineOverlay {
    type Handle;

    fn add_line(&mut self, path: &[LatLng], style: &Style) -> Self::Handle;
    fn remove_line(&mut self, handle: Self::Handle);
}

/// Tracks which overlay lines mirror which strokes.
#[derive(Debug)]
pub struct RenderSync<H> {
    rendered: Vec<(H, Stroke)>,
}

impl<H> Default for RenderSync<H> {
    fn default() -> Self {
        Self {
            rendered: Vec::new(),
        }
    }
}

impl<H> RenderSync<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered.len()
    }

    /// Make the overlay match `strokes`.
    ///
    /// Lines are kept up to the first stroke that differs from what was drawn;
    /// everything after it is destroyed and recreated. While drawing, only the
    /// last stroke changes, so only one line is rebuilt per sample.
    pub fn sync<O>(&mut self, strokes: &[Stroke], overlay: &mut O)
    where
        O: LineOverlay<Handle = H>,
    {
        let unchanged = self
            .rendered
            .iter()
            .zip(strokes)
            .take_while(|((_, drawn), stroke)| drawn == *stroke)
            .count();

        for (handle, _) in self.rendered.drain(unchanged..) {
            overlay.remove_line(handle);
        }

        for stroke in &strokes[unchanged..] {
            let handle = overlay.add_line(&stroke.positions(), &stroke.style());
            self.rendered.push((handle, stroke.clone()));
        }
    }

    /// Remove every line this sync created.
    pub fn clear<O>(&mut self, overlay: &mut O)
    where
        O: LineOverlay<Handle = H>,
    {
        for (handle, _) in self.rendered.drain(..) {
            overlay.remove_line(handle);
        }
    }
}
