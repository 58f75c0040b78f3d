//! Port Interfaces
//!
//! Contracts between the feed adapters and their external collaborators,
//! following the Hexagonal Architecture pattern.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`LevelOneTransport`]: watch/unwatch commands for level-one data
//! - [`BarTransport`]: bar-watch commands for interval bars
//! - [`FeedSession`]: login/logout against the vendor connector
//!
//! ## Driver Ports (Inbound)
//!
//! - [`LevelOneEvents`]: raw push callbacks for the level-one stream
//! - [`BarEvents`]: raw push callback for completed interval bars
//!
//! The vendor connector pushes loosely typed, comma-delimited strings into
//! the inbound ports on threads of its own choosing. Implementations of the
//! inbound ports must not block and must not panic: an escaping panic would
//! take down the vendor's dispatch thread.

use std::sync::Arc;

// =============================================================================
// Error Type
// =============================================================================

/// Errors surfaced by transport and session collaborators.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The vendor connector rejected or failed a command.
    #[error("transport command failed: {0}")]
    CommandFailed(String),

    /// Protocol negotiation with the vendor connector failed.
    #[error("protocol negotiation failed: {0}")]
    ProtocolNegotiation(String),

    /// The session-level login handshake failed.
    #[error("session login failed: {0}")]
    LoginFailed(String),
}

// =============================================================================
// Driven Ports (Outbound)
// =============================================================================

/// Wire command describing an interval-bar watch.
///
/// Mirrors the vendor `BarWatch` parameter list. [`BarWatchCommand::streaming`]
/// fills the defaults used for live streaming subscriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarWatchCommand {
    /// Normalized (uppercased) ticker symbol.
    pub symbol: String,
    /// Interval length in units of `interval_type`.
    pub interval_length: u32,
    /// Begin date-time, empty for "now".
    pub begin_date: String,
    /// Number of days of lookback data.
    pub num_days: u32,
    /// Maximum data points to deliver.
    pub max_points: u32,
    /// Begin-of-day filter time, empty for none.
    pub begin_filter_time: String,
    /// End-of-day filter time, empty for none.
    pub end_filter_time: String,
    /// Caller-supplied request id, echoed on every bar.
    pub request_id: String,
    /// Interval type wire code: "s" seconds, "t" ticks, "v" volume.
    pub interval_type: &'static str,
    /// Update interval in seconds; 0 delivers completed bars only.
    pub update_interval_secs: u32,
}

impl BarWatchCommand {
    /// Build a streaming bar watch with the standard live-data defaults:
    /// no begin date, one day of history, 100 points, no filter window,
    /// completed bars only.
    #[must_use]
    pub fn streaming(
        symbol: String,
        interval_length: u32,
        interval_type: &'static str,
        request_id: String,
    ) -> Self {
        Self {
            symbol,
            interval_length,
            begin_date: String::new(),
            num_days: 1,
            max_points: 100,
            begin_filter_time: String::new(),
            end_filter_time: String::new(),
            request_id,
            interval_type,
            update_interval_secs: 0,
        }
    }
}

/// Outbound commands for the level-one data stream.
///
/// Implemented by the vendor transport binding. Commands are fire-and-forget
/// at the protocol level; the `Result` reports only local submission failure.
#[cfg_attr(test, mockall::automock)]
pub trait LevelOneTransport: Send + Sync {
    /// Negotiate the wire protocol version. Called once at adapter open.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor connector rejects the negotiation.
    fn set_protocol(&self, version: &str) -> Result<(), TransportError>;

    /// Select the update/summary field set delivered on data messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be submitted.
    fn select_update_fields(&self, fields: &str) -> Result<(), TransportError>;

    /// Open a watch for a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be submitted.
    fn watch(&self, symbol: &str) -> Result<(), TransportError>;

    /// Close the watch for a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be submitted.
    fn unwatch(&self, symbol: &str) -> Result<(), TransportError>;

    /// Close all watches held by this connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be submitted.
    fn unwatch_all(&self) -> Result<(), TransportError>;

    /// Register the inbound event sink, replacing any previous registration.
    fn register_events(&self, events: Arc<dyn LevelOneEvents>);
}

/// Outbound commands for the interval-bar stream.
///
/// The bar transport manages its own connection to the vendor connector, so
/// bar watches may be issued without adapter-level connection tracking.
#[cfg_attr(test, mockall::automock)]
pub trait BarTransport: Send + Sync {
    /// Negotiate the wire protocol version. Called once at adapter open.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor connector rejects the negotiation.
    fn set_protocol(&self, version: &str) -> Result<(), TransportError>;

    /// Open an interval-bar watch.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be submitted.
    fn bar_watch(&self, command: &BarWatchCommand) -> Result<(), TransportError>;

    /// Close the bar watch identified by symbol and request id.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be submitted.
    fn bar_unwatch(&self, symbol: &str, request_id: &str) -> Result<(), TransportError>;

    /// Close all bar watches held by this connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be submitted.
    fn unwatch_all(&self) -> Result<(), TransportError>;

    /// Register the inbound event sink, replacing any previous registration.
    fn register_events(&self, events: Arc<dyn BarEvents>);
}

/// Session-level login collaborator for the vendor connector.
#[cfg_attr(test, mockall::automock)]
pub trait FeedSession: Send + Sync {
    /// Establish the vendor session. Returns `true` on successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake cannot be attempted at all.
    fn connect(
        &self,
        login_id: &str,
        password: &str,
        product_id: &str,
        product_version: &str,
    ) -> Result<bool, TransportError>;

    /// Release the vendor session.
    fn disconnect(&self);

    /// Check whether the session is currently established.
    fn is_connected(&self) -> bool;
}

// =============================================================================
// Driver Ports (Inbound)
// =============================================================================

/// Raw push callbacks for the level-one stream.
///
/// The transport delivers each message synchronously on its own callback
/// thread; in-order delivery per message class is the transport's guarantee.
pub trait LevelOneEvents: Send + Sync {
    /// Initial snapshot message for a newly watched symbol.
    fn on_summary(&self, raw: &str);

    /// Incremental update message for a watched symbol.
    fn on_update(&self, raw: &str);

    /// Connection-health notification, distinct from data payloads.
    fn on_system(&self, raw: &str);

    /// Error notification from the vendor connector.
    fn on_error(&self, raw: &str);
}

/// Raw push callback for completed interval bars.
pub trait BarEvents: Send + Sync {
    /// A completed interval bar message.
    fn on_bar_complete(&self, raw: &str);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_bar_watch_defaults() {
        let command = BarWatchCommand::streaming("AAPL".to_string(), 60, "s", "AAOOA".to_string());

        assert_eq!(command.symbol, "AAPL");
        assert_eq!(command.interval_length, 60);
        assert_eq!(command.begin_date, "");
        assert_eq!(command.num_days, 1);
        assert_eq!(command.max_points, 100);
        assert_eq!(command.begin_filter_time, "");
        assert_eq!(command.end_filter_time, "");
        assert_eq!(command.request_id, "AAOOA");
        assert_eq!(command.interval_type, "s");
        assert_eq!(command.update_interval_secs, 0);
    }
}
