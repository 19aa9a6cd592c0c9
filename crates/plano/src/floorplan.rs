use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::capture::CaptureRegistry;
use crate::drag::{DragPhase, DragSession};
use crate::error::PlanoError;
use crate::scheduler::{FrameScheduler, FrameToken, ManualFrames};
use crate::source::CourtSource;
use crate::store::PositionStore;
use crate::types::{Key, PointerButton, Point};
use crate::viewport::{Viewport, ViewportConfig};

/// Notifications for the host, collected until [`Floorplan::drain_events`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum FloorplanEvent {
    PositionCommitted {
        id: String,
        position: Point,
    },
    PersistFailed {
        id: String,
        position: Point,
        reason: String,
    },
    RepositionCancelled {
        id: String,
    },
}

/// The plane editor: viewport, committed positions and at most one drag.
pub struct Floorplan<C: CourtSource, F: FrameScheduler> {
    viewport: Viewport,
    store: PositionStore,
    source: C,
    frames: F,
    captures: CaptureRegistry,
    container_id: Option<String>,
    // Court currently in reposition mode
    reposition: Option<String>,
    session: Option<DragSession>,
    phase: DragPhase,
    pending_frame: Option<FrameToken>,
    events: Vec<FloorplanEvent>,
}

impl<C: CourtSource, F: FrameScheduler> Floorplan<C, F> {
    pub fn new(config: ViewportConfig, source: C, frames: F) -> Result<Self, PlanoError> {
        Ok(Self {
            viewport: Viewport::new(config)?,
            store: PositionStore::new(),
            source,
            frames,
            captures: CaptureRegistry::new(),
            container_id: None,
            reposition: None,
            session: None,
            phase: DragPhase::Idle,
            pending_frame: None,
            events: Vec::new(),
        })
    }

    /// Fetch the courts of `container_id` and replace the store with them.
    pub fn refresh(&mut self, container_id: &str) -> Result<usize, PlanoError> {
        self.ensure_idle()?;
        let courts = self
            .source
            .fetch_courts(container_id)
            .map_err(|source| PlanoError::Fetch {
                container: container_id.to_string(),
                source,
            })?;
        self.store.load(courts);
        self.container_id = Some(container_id.to_string());

        if let Some(id) = &self.reposition {
            if !self.store.contains(id) {
                debug!(%id, "court in reposition mode vanished on refresh");
                self.reposition = None;
            }
        }
        Ok(self.store.len())
    }

    /// Refresh the last fetched complex again.
    pub fn reload(&mut self) -> Result<usize, PlanoError> {
        match self.container_id.clone() {
            Some(id) => self.refresh(&id),
            None => Ok(self.store.len()),
        }
    }

    pub fn enter_reposition_mode(&mut self, id: &str) -> Result<(), PlanoError> {
        if let Some(session) = &self.session {
            if session.court_id() == id {
                return Ok(());
            }
            return Err(PlanoError::SessionBusy {
                active: session.court_id().to_string(),
            });
        }
        if !self.store.contains(id) {
            return Err(PlanoError::NotFound(id.to_string()));
        }
        if self.reposition.as_deref() != Some(id) {
            debug!(%id, "entered reposition mode");
            self.reposition = Some(id.to_string());
        }
        Ok(())
    }

    /// Leave reposition mode, discarding any drag in progress.
    pub fn cancel_reposition(&mut self) {
        if let Some(session) = self.session.take() {
            self.set_phase(DragPhase::Cancelled);
            self.cancel_pending_frame();
            let (id, _) = session.finish();
            self.viewport.set_pan_locked(false);
            debug!(%id, "drag cancelled");
            self.set_phase(DragPhase::Idle);
        }
        if let Some(id) = self.reposition.take() {
            self.events.push(FloorplanEvent::RepositionCancelled { id });
        }
    }

    pub fn reposition_target(&self) -> Option<&str> {
        self.reposition.as_deref()
    }

    /// Pointer pressed on court `id`. Starts a drag when `id` is in
    /// reposition mode and the primary button is used. A secondary press
    /// during a drag cancels it; a primary press on another court is
    /// rejected.
    pub fn pointer_down(
        &mut self,
        id: &str,
        screen: Point,
        button: PointerButton,
    ) -> Result<bool, PlanoError> {
        if let Some(session) = &self.session {
            if button == PointerButton::Secondary {
                self.cancel_reposition();
                return Ok(false);
            }
            return Err(PlanoError::SessionBusy {
                active: session.court_id().to_string(),
            });
        }
        if button != PointerButton::Primary || self.reposition.as_deref() != Some(id) {
            return Ok(false);
        }
        let anchor = self
            .store
            .get(id)
            .ok_or_else(|| PlanoError::NotFound(id.to_string()))?;
        let pointer = self.viewport.screen_to_logical(screen);

        self.session = Some(DragSession::begin(
            id,
            anchor,
            pointer,
            self.captures.acquire(),
        ));
        self.viewport.set_pan_locked(true);
        self.set_phase(DragPhase::Dragging);
        self.schedule_frame();
        debug!(%id, x = anchor.x, y = anchor.y, "drag started");
        Ok(true)
    }

    /// Pointer moved anywhere on the page. Feeds the drag while the capture
    /// is held, otherwise a pan in progress.
    pub fn pointer_move(&mut self, screen: Point) {
        let pointer = self.viewport.screen_to_logical(screen);
        match self.session.as_mut() {
            Some(session) => session.pointer_moved(pointer),
            None => self.viewport.pan_move(screen),
        }
    }

    /// Pointer released. Commits a drag in progress and returns the
    /// committed position; otherwise ends a pan and returns `None`.
    pub fn pointer_up(&mut self) -> Result<Option<Point>, PlanoError> {
        match self.session.take() {
            Some(session) => self.commit(session).map(Some),
            None => {
                self.viewport.pan_end();
                Ok(None)
            }
        }
    }

    /// Returns true when the key was consumed.
    pub fn key_down(&mut self, key: Key) -> bool {
        if key == Key::Escape && self.reposition.is_some() {
            self.cancel_reposition();
            return true;
        }
        false
    }

    /// Context-menu request. Cancels a drag in progress.
    pub fn context_menu(&mut self) -> bool {
        if self.session.is_some() {
            self.cancel_reposition();
            return true;
        }
        false
    }

    pub fn pan_start(&mut self, screen: Point) {
        self.viewport.pan_start(screen);
    }

    pub fn pan_move(&mut self, screen: Point) {
        self.viewport.pan_move(screen);
    }

    pub fn pan_end(&mut self) {
        self.viewport.pan_end();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset_view();
    }

    pub fn mount(&mut self, container_origin: Point) {
        self.viewport.mount(container_origin);
    }

    /// Detach from the container. A drag in progress is cancelled so the
    /// input capture and the queued frame are released.
    pub fn unmount(&mut self) {
        if self.session.is_some() {
            debug!("container unmounted during a drag");
            self.cancel_reposition();
        }
        self.viewport.unmount();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
    }

    /// Deliver a frame previously requested from the scheduler. Returns true
    /// when an interpolation step ran.
    pub fn on_frame(&mut self, token: FrameToken) -> bool {
        if self.pending_frame != Some(token) {
            trace!(?token, "ignoring stale frame");
            return false;
        }
        self.pending_frame = None;
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.step();
        self.schedule_frame();
        true
    }

    /// Position a court should be drawn at: the interpolated position for
    /// the court being dragged, the committed one otherwise.
    pub fn display_position(&self, id: &str) -> Option<Point> {
        match &self.session {
            Some(session) if session.court_id() == id => Some(session.current()),
            _ => self.store.get(id),
        }
    }

    pub fn drain_events(&mut self) -> Vec<FloorplanEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn captures(&self) -> &CaptureRegistry {
        &self.captures
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut C {
        &mut self.source
    }

    fn commit(&mut self, session: DragSession) -> Result<Point, PlanoError> {
        self.set_phase(DragPhase::Committing);
        self.cancel_pending_frame();
        let (id, target) = session.finish();
        self.viewport.set_pan_locked(false);
        self.reposition = None;

        let result = self.source.persist_position(&id, target);
        self.set_phase(DragPhase::Idle);

        match result {
            Ok(()) => {
                self.store.apply_committed(&id, target)?;
                info!(%id, x = target.x, y = target.y, "court repositioned");
                self.events.push(FloorplanEvent::PositionCommitted {
                    id,
                    position: target,
                });
                Ok(target)
            }
            Err(source) => {
                warn!(%id, error = %source, "persisting position failed");
                self.events.push(FloorplanEvent::PersistFailed {
                    id: id.clone(),
                    position: target,
                    reason: source.to_string(),
                });
                Err(PlanoError::Persist { id, source })
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), PlanoError> {
        match &self.session {
            Some(session) => Err(PlanoError::SessionBusy {
                active: session.court_id().to_string(),
            }),
            None => Ok(()),
        }
    }

    fn schedule_frame(&mut self) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.frames.request_frame());
        }
    }

    fn cancel_pending_frame(&mut self) {
        if let Some(token) = self.pending_frame.take() {
            self.frames.cancel_frame(token);
        }
    }

    fn set_phase(&mut self, phase: DragPhase) {
        if self.phase != phase {
            trace!(from = ?self.phase, to = ?phase, "drag phase");
            self.phase = phase;
        }
    }
}

impl<C: CourtSource> Floorplan<C, ManualFrames> {
    /// Fire the pending frame, if any.
    pub fn tick(&mut self) -> bool {
        match self.frames.fire() {
            Some(token) => self.on_frame(token),
            None => false,
        }
    }
}

impl<C: CourtSource, F: FrameScheduler> Drop for Floorplan<C, F> {
    fn drop(&mut self) {
        // Releases the input capture.
        self.session.take();
        self.cancel_pending_frame();
    }
}
