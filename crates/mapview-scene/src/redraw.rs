//! Redraw requests.
//!
//! Every state change that affects pixels records why through
//! [`RedrawQueue::request`]. The frame loop paints only when something is
//! pending and drains the queue when it does.

/// Why a repaint was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedrawReason {
    Resize,
    Load,
    Scroll,
    Hover,
    WrapToggle,
    ActiveSource,
    Animation,
    CaretBlink,
    Error,
}

#[derive(Debug, Default, Clone)]
pub struct RedrawQueue {
    pending: Vec<RedrawReason>,
}

impl RedrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent per reason.
    pub fn request(&mut self, reason: RedrawReason) {
        if !self.pending.contains(&reason) {
            self.pending.push(reason);
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn contains(&self, reason: RedrawReason) -> bool {
        self.pending.contains(&reason)
    }

    /// Pending reasons in first-requested order.
    pub fn pending(&self) -> &[RedrawReason] {
        &self.pending
    }

    pub fn take(&mut self) -> Vec<RedrawReason> {
        std::mem::take(&mut self.pending)
    }
}
