use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

/// Tracks document-level pointer capture. Hosts consult [`active`] to decide
/// whether global pointer-move/up listeners should be installed.
///
/// [`active`]: CaptureRegistry::active
#[derive(Debug, Clone, Default)]
pub struct CaptureRegistry {
    active: Rc<Cell<usize>>,
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> InputCapture {
        self.active.set(self.active.get() + 1);
        trace!(active = self.active.get(), "input capture acquired");
        InputCapture {
            active: Rc::clone(&self.active),
        }
    }

    /// Number of captures currently held.
    pub fn active(&self) -> usize {
        self.active.get()
    }
}

/// Held while a drag owns the global pointer listeners. Released on drop.
#[derive(Debug)]
pub struct InputCapture {
    active: Rc<Cell<usize>>,
}

impl Drop for InputCapture {
    fn drop(&mut self) {
        self.active.set(self.active.get().saturating_sub(1));
        trace!(active = self.active.get(), "input capture released");
    }
}
