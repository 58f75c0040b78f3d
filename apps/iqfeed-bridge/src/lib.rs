#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access
    )
)]

//! IQFeed Bridge - Market Data Feed Adapter
//!
//! Normalization bridge between the push-based DTN IQFeed vendor connector
//! (loosely typed, comma-delimited string messages) and the trading
//! platform's strongly typed domain model: ticks, interval bars, and
//! connection-state events.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Market data records and subscription bookkeeping
//!   - `market_data`: `Security`, `Tick`, `Bar`, request types
//!   - `subscription`: idempotent watch registries
//!
//! - **Application**: Port definitions
//!   - `ports`: transport/session contracts the vendor bindings implement
//!
//! - **Infrastructure**: Vendor-facing adapters
//!   - `iqfeed`: wire parsing, connection tracking, feed adapters, facade
//!   - `dispatch`: single-subscriber notification slots
//!   - `config`: environment-driven configuration
//!
//! # Data Flow
//!
//! ```text
//! vendor connector ──raw string──► WireMessageParser ──Tick/Bar──► handler slot ──► platform
//! platform ──subscribe/unsubscribe──► adapter ──watch/unwatch──► vendor connector
//! ```
//!
//! Delivery is synchronous and in-order on the transport's callback thread;
//! each arrival channel has at most one registered handler (first
//! registrant wins — the platform composition root takes exclusive
//! ownership of each adapter instance).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Market data types and subscription bookkeeping.
pub mod domain;

/// Application layer - Port definitions.
pub mod application;

/// Infrastructure layer - Vendor-facing adapters.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::market_data::{
    Bar, BarDataRequest, BarIntervalUnit, ConnectionState, Security, Tick, TickSubscription,
};
pub use domain::subscription::{BarSubscriptionKey, SubscriptionRegistry};

// Ports
pub use application::ports::{
    BarEvents, BarTransport, BarWatchCommand, FeedSession, LevelOneEvents, LevelOneTransport,
    TransportError,
};

// Infrastructure config
pub use infrastructure::config::{BridgeConfig, ConfigError, Credentials};

// Dispatch
pub use infrastructure::dispatch::{Handler, HandlerSlot};

// Adapters and facade
pub use infrastructure::iqfeed::bars::IntervalBarFeedAdapter;
pub use infrastructure::iqfeed::connector::{ConnectorError, FeedConnector};
pub use infrastructure::iqfeed::level_one::{LevelOneFeedAdapter, UPDATE_FIELD_SET};
pub use infrastructure::iqfeed::wire::{ParseError, parse_bar, parse_tick};
