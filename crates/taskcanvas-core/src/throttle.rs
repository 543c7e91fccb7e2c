//! Single-slot mailbox that coalesces high-rate input to frame cadence.

/// Holds at most one pending value plus a "frame scheduled" flag.
///
/// Posting while a frame is already scheduled overwrites the pending value
/// instead of queueing more work, so each frame processes only the newest
/// input.
#[derive(Debug, Clone)]
pub struct FrameMailbox<T> {
    pending: Option<T>,
    scheduled: bool,
}

impl<T> Default for FrameMailbox<T> {
    fn default() -> Self {
        Self {
            pending: None,
            scheduled: false,
        }
    }
}

impl<T> FrameMailbox<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value`, replacing any pending one.
    ///
    /// Returns `true` when the caller must schedule a frame, i.e. no frame
    /// was scheduled yet.
    pub fn post(&mut self, value: T) -> bool {
        self.pending = Some(value);
        if self.scheduled {
            false
        } else {
            self.scheduled = true;
            true
        }
    }

    /// Consume the pending value at frame time.
    pub fn take(&mut self) -> Option<T> {
        self.scheduled = false;
        self.pending.take()
    }

    /// Whether a frame is scheduled and not yet consumed.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Drop the pending value and unschedule.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.scheduled = false;
    }
}
