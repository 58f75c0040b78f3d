//! Subscription Registry
//!
//! Local bookkeeping of active watches, keyed by normalized symbol for
//! level-one data and by (symbol, request id) for interval bars.
//!
//! # Design
//!
//! The registry is deliberately not authoritative for transport watch state:
//! the vendor connector owns that. The registry exists so the adapter can
//! answer membership queries and perform "unwatch all" cleanup on `stop()`.
//! Add and remove are idempotent at the registry level; the adapter decides
//! independently whether to forward a command to the transport.
//!
//! All operations take `&self` and are safe against a platform thread
//! subscribing while a transport callback thread is delivering data.

use std::collections::HashSet;
use std::hash::Hash;

use parking_lot::Mutex;

// =============================================================================
// Keys
// =============================================================================

/// Composite key identifying an interval-bar watch.
///
/// Bars are correlated by caller-supplied request id, so the same symbol may
/// carry several concurrent watches with different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BarSubscriptionKey {
    /// Normalized (uppercased) ticker symbol.
    pub symbol: String,
    /// Caller-supplied request id.
    pub request_id: String,
}

impl BarSubscriptionKey {
    /// Create a key, normalizing the symbol to uppercase.
    pub fn new(symbol: &str, request_id: impl Into<String>) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            request_id: request_id.into(),
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Thread-safe set of active subscription keys.
///
/// # Example
///
/// ```rust
/// use iqfeed_bridge::domain::subscription::SubscriptionRegistry;
///
/// let registry: SubscriptionRegistry<String> = SubscriptionRegistry::new();
///
/// assert!(registry.add("AAPL".to_string()));
/// // Re-adding is a no-op
/// assert!(!registry.add("AAPL".to_string()));
///
/// assert!(registry.contains(&"AAPL".to_string()));
/// assert!(registry.remove(&"AAPL".to_string()));
/// assert!(!registry.remove(&"AAPL".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct SubscriptionRegistry<K: Eq + Hash> {
    entries: Mutex<HashSet<K>>,
}

impl<K: Eq + Hash> SubscriptionRegistry<K> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashSet::new()),
        }
    }

    /// Add a key. Returns `true` if it was newly added.
    pub fn add(&self, key: K) -> bool {
        self.entries.lock().insert(key)
    }

    /// Remove a key. Returns `true` if it was present.
    pub fn remove(&self, key: &K) -> bool {
        self.entries.lock().remove(key)
    }

    /// Check whether a key is currently registered.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.lock().contains(key)
    }

    /// Remove all keys.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<K: Eq + Hash + Clone> SubscriptionRegistry<K> {
    /// Snapshot of all registered keys.
    pub fn keys(&self) -> Vec<K> {
        self.entries.lock().iter().cloned().collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let registry = SubscriptionRegistry::new();

        assert!(registry.add("AAPL".to_string()));
        assert!(!registry.add("AAPL".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_reports_membership() {
        let registry = SubscriptionRegistry::new();
        registry.add("AAPL".to_string());

        assert!(registry.remove(&"AAPL".to_string()));
        assert!(!registry.remove(&"AAPL".to_string()));
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_empties_registry() {
        let registry = SubscriptionRegistry::new();
        registry.add("AAPL".to_string());
        registry.add("MSFT".to_string());

        registry.clear();

        assert!(registry.is_empty());
        assert!(!registry.contains(&"AAPL".to_string()));
    }

    #[test]
    fn bar_key_normalizes_symbol() {
        let key = BarSubscriptionKey::new("aapl", "AAOOA");
        assert_eq!(key.symbol, "AAPL");
        assert_eq!(key.request_id, "AAOOA");
    }

    #[test]
    fn bar_keys_distinct_per_request_id() {
        let registry = SubscriptionRegistry::new();

        assert!(registry.add(BarSubscriptionKey::new("AAPL", "A")));
        assert!(registry.add(BarSubscriptionKey::new("AAPL", "B")));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn thread_safety_concurrent_adds() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(SubscriptionRegistry::new());
        let mut handles = vec![];

        for i in 0..10 {
            let r = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                r.add(format!("SYM{i}"));
                r.add("SHARED".to_string());
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // 10 unique symbols + 1 shared
        assert_eq!(registry.len(), 11);
    }
}
