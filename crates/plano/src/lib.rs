//! Pannable, zoomable court plane with drag repositioning.
//!
//! The crate is headless: hosts feed pointer and keyboard input into a
//! [`Floorplan`], deliver display-refresh frames through a
//! [`FrameScheduler`], and draw the [`Scene`] produced by a
//! [`RenderAdapter`]. Storage lives behind [`CourtSource`].

mod capture;
mod drag;
mod error;
mod floorplan;
mod render;
mod scheduler;
mod source;
mod store;
mod transform;
mod types;
mod viewport;

pub use capture::{CaptureRegistry, InputCapture};
pub use drag::{DragPhase, DragSession, LERP_FACTOR, SNAP_THRESHOLD, interpolate};
pub use error::{PlanoError, SourceError, TransformParseError};
pub use floorplan::{Floorplan, FloorplanEvent};
pub use render::{
    CourtView, EventBinding, RenderAdapter, Scene, VisualCatalog, VisualDescriptor, VisualState,
};
pub use scheduler::{FrameScheduler, FrameToken, ManualFrames};
pub use source::{CourtSource, MemorySource};
pub use store::{PlacedCourt, PositionStore, grid_slot};
pub use transform::{ParsedTransform, Transform, parse_transform, parse_transform_or_identity};
pub use types::{Court, CourtMeta, Key, Point, PointerButton, ViewportState};
pub use viewport::{GridBackground, Viewport, ViewportConfig};
