//! Display-refresh scheduling for the drag interpolation loop.

/// Handle for one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Something that can call back once on the next display refresh, like a
/// browser's `requestAnimationFrame`. The host delivers the callback by
/// calling [`crate::Floorplan::on_frame`] with the token.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameToken;
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Scheduler driven by hand: frames fire only when the host calls
/// [`ManualFrames::fire`]. Used by the CLI host and by tests to single-step
/// the loop.
#[derive(Debug, Default)]
pub struct ManualFrames {
    next: u64,
    pending: Vec<FrameToken>,
    requested: usize,
    cancelled: usize,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest pending frame, if any.
    pub fn fire(&mut self) -> Option<FrameToken> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self) -> FrameToken {
        self.next += 1;
        let token = FrameToken(self.next);
        self.pending.push(token);
        self.requested += 1;
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        let before = self.pending.len();
        self.pending.retain(|t| *t != token);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}
