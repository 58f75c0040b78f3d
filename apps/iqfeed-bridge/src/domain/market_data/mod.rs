//! Market Data Types
//!
//! Canonical internal representation of level-one ticks, interval bars,
//! and the request types used to subscribe to them. These types are
//! wire-format agnostic; the IQFeed wire parser populates them.
//!
//! # Design
//!
//! - Prices and sizes are `rust_decimal::Decimal` to preserve financial
//!   precision (no binary floating point anywhere on the data path).
//! - A `Tick` always carries last price/size; bid and ask are populated
//!   independently and only when present on the wire.
//! - A `Bar` is all-or-nothing: partial bars are never constructed.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Connection State
// =============================================================================

/// Connection state of a feed adapter.
///
/// Owned exclusively by the connection tracker; transitions happen only on
/// explicit system notifications, never inferred from data messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No live connection to the feed server.
    #[default]
    Disconnected,
    /// Feed server connection established.
    Connected,
}

impl ConnectionState {
    /// Check whether this state is `Connected`.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

// =============================================================================
// Security
// =============================================================================

/// A tradeable instrument, identified by its ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Security {
    /// Ticker symbol (e.g. "AAPL").
    pub symbol: String,
}

impl Security {
    /// Create a security from a symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

// =============================================================================
// Tick
// =============================================================================

/// A level-one quote/trade update.
///
/// `last_price` and `last_size` are always present. Bid and ask fields are
/// populated together per side (price with size) and may be absent when the
/// corresponding wire fields were empty.
///
/// The timestamp is the adapter's capture-time clock at receipt, not an
/// exchange-side time: the summary/update wire schema carries no timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    /// Instrument this tick belongs to.
    pub security: Security,

    /// Market data provider that produced this tick.
    pub provider: String,

    /// Capture time at receipt (UTC).
    pub timestamp: DateTime<Utc>,

    /// Most recent trade price.
    pub last_price: Decimal,

    /// Most recent trade size.
    pub last_size: Decimal,

    /// Best bid price, if present on the wire.
    pub bid_price: Option<Decimal>,

    /// Best bid size; set together with `bid_price`.
    pub bid_size: Option<Decimal>,

    /// Best ask price, if present on the wire.
    pub ask_price: Option<Decimal>,

    /// Best ask size; set together with `ask_price`.
    pub ask_size: Option<Decimal>,
}

impl Tick {
    /// Check whether both bid price and size are populated.
    #[must_use]
    pub const fn has_bid(&self) -> bool {
        self.bid_price.is_some() && self.bid_size.is_some()
    }

    /// Check whether both ask price and size are populated.
    #[must_use]
    pub const fn has_ask(&self) -> bool {
        self.ask_price.is_some() && self.ask_size.is_some()
    }
}

// =============================================================================
// Bar
// =============================================================================

/// A completed interval bar (OHLCV), correlated by caller-supplied request id.
///
/// All four OHLC fields and the volume parse successfully or the whole
/// record is rejected upstream; a constructed `Bar` is always complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Instrument this bar belongs to.
    pub security: Security,

    /// Market data provider that produced this bar.
    pub provider: String,

    /// Caller-supplied request id, echoed back for correlation.
    pub request_id: String,

    /// Bar timestamp as carried on the wire (no offset information).
    pub timestamp: NaiveDateTime,

    /// Open price.
    pub open: Decimal,

    /// High price.
    pub high: Decimal,

    /// Low price.
    pub low: Decimal,

    /// Close price.
    pub close: Decimal,

    /// Traded volume over the interval.
    pub volume: i64,
}

// =============================================================================
// Subscription Requests
// =============================================================================

/// Request to subscribe to (or unsubscribe from) level-one data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSubscription {
    /// Instrument to watch.
    pub security: Security,
}

impl TickSubscription {
    /// Create a subscription request for a symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            security: Security::new(symbol),
        }
    }
}

/// Interval unit for bar subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BarIntervalUnit {
    /// Time-based bars, interval length in seconds.
    #[default]
    Seconds,
    /// Tick-count bars.
    Ticks,
    /// Volume bars.
    Volume,
}

impl BarIntervalUnit {
    /// Wire code for the interval type.
    #[must_use]
    pub const fn wire_code(self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Ticks => "t",
            Self::Volume => "v",
        }
    }
}

/// Request to subscribe to (or unsubscribe from) interval bars.
///
/// The `id` is caller-supplied and is echoed back on every bar event so the
/// platform can correlate bars with the originating request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarDataRequest {
    /// Instrument to watch.
    pub security: Security,

    /// Caller-supplied request id for correlation.
    pub id: String,

    /// Interval length, in units of `interval_unit`. Must be positive.
    pub bar_length: u32,

    /// Interval unit (seconds by default).
    pub interval_unit: BarIntervalUnit,
}

impl BarDataRequest {
    /// Create a seconds-interval bar request.
    pub fn new(symbol: impl Into<String>, id: impl Into<String>, bar_length: u32) -> Self {
        Self {
            security: Security::new(symbol),
            id: id.into(),
            bar_length,
            interval_unit: BarIntervalUnit::Seconds,
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
    fn connection_state_defaults_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
        assert!(!ConnectionState::Disconnected.is_connected());
        assert!(ConnectionState::Connected.is_connected());
    }

    #[test]
    fn tick_side_presence() {
        let mut tick = Tick {
            security: Security::new("AAPL"),
            provider: "IQFeed".to_string(),
            timestamp: Utc::now(),
            last_price: Decimal::new(10150, 2),
            last_size: Decimal::new(100, 0),
            bid_price: None,
            bid_size: None,
            ask_price: Some(Decimal::new(10175, 2)),
            ask_size: Some(Decimal::new(50, 0)),
        };

        assert!(!tick.has_bid());
        assert!(tick.has_ask());

        tick.bid_price = Some(Decimal::new(10125, 2));
        tick.bid_size = Some(Decimal::new(50, 0));
        assert!(tick.has_bid());
    }

    #[test]
    fn bar_interval_unit_wire_codes() {
        assert_eq!(BarIntervalUnit::Seconds.wire_code(), "s");
        assert_eq!(BarIntervalUnit::Ticks.wire_code(), "t");
        assert_eq!(BarIntervalUnit::Volume.wire_code(), "v");
    }

    #[test]
    fn bar_data_request_defaults_to_seconds() {
        let request = BarDataRequest::new("AAPL", "AAOOA", 60);
        assert_eq!(request.interval_unit, BarIntervalUnit::Seconds);
        assert_eq!(request.bar_length, 60);
        assert_eq!(request.id, "AAOOA");
    }
}
