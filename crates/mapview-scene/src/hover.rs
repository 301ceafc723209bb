//! Hover state and the hover event stream.
//!
//! There is a single [`HoverState`] for the whole view. It is written by the
//! pane the pointer last moved over and read by both panes when painting.

use std::fmt;

use mapview_core::MappingRecord;

use crate::pane::PaneId;

/// Where the pointer (or a logical hover) currently rests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverState {
    /// Pane that initiated the hover.
    pub pane: PaneId,
    pub line: usize,
    pub row: usize,
    /// Caret position, snapped to the nearer edge.
    pub caret_index: usize,
    pub caret_column: usize,
    /// Position used for containment, snapped to the start edge.
    pub index: usize,
    pub mapping: Option<MappingRecord>,
}

impl HoverState {
    pub fn event(&self) -> HoverEvent {
        HoverEvent {
            pane_index: self.pane.pane_index(),
            line: self.line,
            column: self.index,
            mapping: self.mapping,
        }
    }
}

/// Published to subscribers whenever the hover changes.
///
/// `pane_index` is `None` for the generated pane and the source index for an
/// original pane. `column` is in mapping units (UTF-16 code units).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverEvent {
    pub pane_index: Option<usize>,
    pub line: usize,
    pub column: usize,
    pub mapping: Option<MappingRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type HoverCallback = Box<dyn FnMut(Option<&HoverEvent>)>;

/// Registered hover listeners. `None` is delivered when the hover clears.
#[derive(Default)]
pub struct HoverSubscribers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, HoverCallback)>,
}

impl HoverSubscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(Option<&HoverEvent>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns false when `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    pub fn notify(&mut self, event: Option<&HoverEvent>) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for HoverSubscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoverSubscribers")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event(line: usize) -> HoverEvent {
        HoverEvent {
            pane_index: Some(0),
            line,
            column: 2,
            mapping: None,
        }
    }

    #[test]
    fn test_notify_reaches_every_subscriber() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = HoverSubscribers::new();
        for tag in 0..2 {
            let seen = Rc::clone(&seen);
            subscribers.subscribe(move |event| {
                seen.borrow_mut().push((tag, event.map(|e| e.line)));
            });
        }
        subscribers.notify(Some(&event(4)));
        subscribers.notify(None);
        assert_eq!(
            *seen.borrow(),
            vec![(0, Some(4)), (1, Some(4)), (0, None), (1, None)]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut subscribers = HoverSubscribers::new();
        let counter = Rc::clone(&count);
        let id = subscribers.subscribe(move |_| *counter.borrow_mut() += 1);
        subscribers.notify(None);
        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        subscribers.notify(None);
        assert_eq!(*count.borrow(), 1);
        assert!(subscribers.is_empty());
    }

    #[test]
    fn test_state_event_uses_containment_index() {
        let state = HoverState {
            pane: PaneId::Original(3),
            line: 1,
            row: 1,
            caret_index: 5,
            caret_column: 5,
            index: 4,
            mapping: None,
        };
        let event = state.event();
        assert_eq!(event.pane_index, Some(3));
        assert_eq!(event.column, 4);
    }
}
