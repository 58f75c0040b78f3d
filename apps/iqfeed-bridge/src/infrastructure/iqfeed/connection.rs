//! Feed Connection State Tracking
//!
//! Consumes system notifications from the vendor connector and tracks the
//! Connected/Disconnected state of the level-one stream.
//!
//! The vendor connector may emit redundant or out-of-order system
//! notifications; the state guard here is the correctness mechanism that
//! prevents duplicate post-connect setup and duplicate downstream
//! connection-changed notifications. State transitions happen only on
//! explicit system messages, never inferred from data messages.

use crate::domain::market_data::ConnectionState;

/// System message marker for an established feed-server connection.
pub const SERVER_CONNECTED_MARKER: &str = "SERVER CONNECTED";

/// System message marker for a lost feed-server connection.
pub const SERVER_DISCONNECTED_MARKER: &str = "SERVER DISCONNECTED";

/// Deduplicating Connected/Disconnected tracker.
///
/// [`ConnectionTracker::apply_system_message`] returns the new state only
/// when a transition actually occurred, so the caller can hang one-time
/// setup (field-set selection) and downstream notification off the return
/// value without its own guard.
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    state: ConnectionState,
}

impl ConnectionTracker {
    /// Create a tracker in the `Disconnected` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
        }
    }

    /// Current connection state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check whether the tracker is in the `Connected` state.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Apply a system notification.
    ///
    /// Returns `Some(new_state)` when the message caused a transition, and
    /// `None` for duplicate markers or unrelated system content.
    pub fn apply_system_message(&mut self, message: &str) -> Option<ConnectionState> {
        if message.contains(SERVER_CONNECTED_MARKER) {
            if self.state.is_connected() {
                return None;
            }
            self.state = ConnectionState::Connected;
            Some(ConnectionState::Connected)
        } else if message.contains(SERVER_DISCONNECTED_MARKER) {
            if !self.state.is_connected() {
                return None;
            }
            self.state = ConnectionState::Disconnected;
            Some(ConnectionState::Disconnected)
        } else {
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.state(), ConnectionState::Disconnected);
        assert!(!tracker.is_connected());
    }

    #[test]
    fn connects_on_server_connected_marker() {
        let mut tracker = ConnectionTracker::new();

        let transition = tracker.apply_system_message("S,SERVER CONNECTED");

        assert_eq!(transition, Some(ConnectionState::Connected));
        assert!(tracker.is_connected());
    }

    #[test]
    fn duplicate_connected_is_suppressed() {
        let mut tracker = ConnectionTracker::new();

        assert!(tracker.apply_system_message("S,SERVER CONNECTED").is_some());
        assert!(tracker.apply_system_message("S,SERVER CONNECTED").is_none());
        assert!(tracker.is_connected());
    }

    #[test]
    fn disconnect_requires_connected_state() {
        let mut tracker = ConnectionTracker::new();

        // Already disconnected: no transition to report.
        assert!(
            tracker
                .apply_system_message("S,SERVER DISCONNECTED")
                .is_none()
        );

        tracker.apply_system_message("S,SERVER CONNECTED");
        assert_eq!(
            tracker.apply_system_message("S,SERVER DISCONNECTED"),
            Some(ConnectionState::Disconnected)
        );
        assert!(
            tracker
                .apply_system_message("S,SERVER DISCONNECTED")
                .is_none()
        );
    }

    #[test]
    fn reconnect_cycle_reports_each_transition_once() {
        let mut tracker = ConnectionTracker::new();

        assert!(tracker.apply_system_message("S,SERVER CONNECTED").is_some());
        assert!(
            tracker
                .apply_system_message("S,SERVER DISCONNECTED")
                .is_some()
        );
        assert!(tracker.apply_system_message("S,SERVER CONNECTED").is_some());
        assert!(tracker.is_connected());
    }

    #[test]
    fn unrelated_system_messages_are_ignored() {
        let mut tracker = ConnectionTracker::new();

        assert!(tracker.apply_system_message("S,KEYOK").is_none());
        assert!(tracker.apply_system_message("S,CUST,real_time").is_none());
        assert!(!tracker.is_connected());
    }

    #[test]
    fn disconnected_marker_does_not_match_connected_branch() {
        // "SERVER DISCONNECTED" must not be misread as "SERVER CONNECTED".
        let mut tracker = ConnectionTracker::new();
        tracker.apply_system_message("S,SERVER CONNECTED");

        let transition = tracker.apply_system_message("S,SERVER DISCONNECTED");

        assert_eq!(transition, Some(ConnectionState::Disconnected));
    }
}
