//! Per-court drag state.
//!
//! A session exists only while a court is being dragged. It tracks two
//! positions: `target`, where the pointer says the court should be, and
//! `current`, the rendered position that chases the target a little each
//! frame. Commit always uses `target`.

use serde::Serialize;
use tracing::trace;

use crate::capture::InputCapture;
use crate::types::Point;

/// Fraction of the remaining distance covered per frame.
pub const LERP_FACTOR: f64 = 0.3;
/// Per-axis distance under which `current` snaps onto `target`.
pub const SNAP_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DragPhase {
    Idle,
    Dragging,
    Committing,
    Cancelled,
}

/// One interpolation step from `current` toward `target`. Returns the new
/// position and whether it has settled on the target.
pub fn interpolate(current: Point, target: Point) -> (Point, bool) {
    let delta = target - current;
    if delta.x.abs() < SNAP_THRESHOLD && delta.y.abs() < SNAP_THRESHOLD {
        (target, true)
    } else {
        (current + delta * LERP_FACTOR, false)
    }
}

#[derive(Debug)]
pub struct DragSession {
    court_id: String,
    pointer_offset: Point,
    current: Point,
    target: Point,
    _capture: InputCapture,
}

impl DragSession {
    /// Start dragging `court_id`, whose committed position is `anchor`,
    /// from the logical pointer position `pointer`.
    pub fn begin(
        court_id: impl Into<String>,
        anchor: Point,
        pointer: Point,
        capture: InputCapture,
    ) -> Self {
        Self {
            court_id: court_id.into(),
            pointer_offset: pointer - anchor,
            current: anchor,
            target: anchor,
            _capture: capture,
        }
    }

    pub fn court_id(&self) -> &str {
        &self.court_id
    }

    pub fn pointer_offset(&self) -> Point {
        self.pointer_offset
    }

    pub fn current(&self) -> Point {
        self.current
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// New logical pointer position. Moves the goal, not the rendered court.
    pub fn pointer_moved(&mut self, pointer: Point) {
        self.target = pointer - self.pointer_offset;
    }

    /// Advance `current` one frame. Returns true once settled.
    pub fn step(&mut self) -> bool {
        let (next, settled) = interpolate(self.current, self.target);
        self.current = next;
        trace!(
            id = %self.court_id,
            x = next.x,
            y = next.y,
            settled,
            "drag step"
        );
        settled
    }

    /// End the drag and hand back the id and exact target. Dropping the
    /// session releases the input capture.
    pub fn finish(self) -> (String, Point) {
        (self.court_id, self.target)
    }
}
