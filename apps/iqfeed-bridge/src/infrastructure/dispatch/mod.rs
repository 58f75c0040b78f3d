//! Single-Subscriber Notification Slots
//!
//! Message distribution for the feed adapters. Unlike a fan-out channel,
//! each arrival event has at most one registered handler: the platform's
//! composition root takes exclusive ownership of each feed-adapter instance,
//! and the first registrant wins until it unregisters.
//!
//! This is a contract, not a fallback: registering a second handler while
//! one is present is a no-op, and removal is always honored.

use parking_lot::Mutex;
use std::sync::Arc;

/// Handler invoked with a reference to each delivered record.
pub type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A compare-and-set handler slot with first-registrant-wins semantics.
///
/// Delivery is synchronous on the caller's thread. The handler is cloned out
/// of the slot before invocation, so a handler may unregister itself (or
/// register a replacement) without deadlocking.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use iqfeed_bridge::infrastructure::dispatch::HandlerSlot;
///
/// let slot: HandlerSlot<u32> = HandlerSlot::new();
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// let h = Arc::clone(&hits);
/// assert!(slot.register(Arc::new(move |_value| {
///     h.fetch_add(1, Ordering::SeqCst);
/// })));
///
/// // Second registration loses
/// assert!(!slot.register(Arc::new(|_value| unreachable!())));
///
/// slot.emit(&7);
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
pub struct HandlerSlot<T> {
    handler: Mutex<Option<Handler<T>>>,
}

impl<T> Default for HandlerSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandlerSlot<T> {
    /// Create an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handler: Mutex::new(None),
        }
    }

    /// Register a handler. Returns `true` if the slot was empty and the
    /// handler took ownership; `false` leaves the existing handler in place.
    pub fn register(&self, handler: Handler<T>) -> bool {
        let mut slot = self.handler.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(handler);
        true
    }

    /// Remove the registered handler, if any. Returns `true` if one was
    /// present.
    pub fn unregister(&self) -> bool {
        self.handler.lock().take().is_some()
    }

    /// Check whether a handler is currently registered.
    pub fn is_registered(&self) -> bool {
        self.handler.lock().is_some()
    }

    /// Deliver a record to the registered handler, if any.
    ///
    /// Returns `true` if a handler was invoked.
    pub fn emit(&self, value: &T) -> bool {
        let handler = self.handler.lock().clone();
        if let Some(h) = handler {
            h(value);
            true
        } else {
            false
        }
    }
}

impl<T> std::fmt::Debug for HandlerSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("registered", &self.is_registered())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(hits: &Arc<AtomicUsize>) -> Handler<u32> {
        let hits = Arc::clone(hits);
        Arc::new(move |_value| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn first_registrant_wins() {
        let slot: HandlerSlot<u32> = HandlerSlot::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        assert!(slot.register(counting_handler(&first)));
        assert!(!slot.register(counting_handler(&second)));

        slot.emit(&1);
        slot.emit(&2);

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unregister_then_reregister_hands_over() {
        let slot: HandlerSlot<u32> = HandlerSlot::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        assert!(slot.register(counting_handler(&first)));
        assert!(slot.unregister());
        assert!(slot.register(counting_handler(&second)));

        slot.emit(&1);

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn emit_without_handler_is_noop() {
        let slot: HandlerSlot<u32> = HandlerSlot::new();
        assert!(!slot.emit(&1));
        assert!(!slot.unregister());
    }

    #[test]
    fn handler_may_unregister_itself() {
        let slot: Arc<HandlerSlot<u32>> = Arc::new(HandlerSlot::new());

        let inner = Arc::clone(&slot);
        assert!(slot.register(Arc::new(move |_value| {
            inner.unregister();
        })));

        assert!(slot.emit(&1));
        assert!(!slot.is_registered());
        assert!(!slot.emit(&2));
    }
}
