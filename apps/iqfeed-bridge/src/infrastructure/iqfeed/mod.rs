//! IQFeed Adapters
//!
//! Everything specific to the vendor wire protocol: positional message
//! parsing, connection-state tracking from system messages, the two feed
//! adapters, and the top-level connector facade.

/// Interval-bar feed adapter.
pub mod bars;

/// Connection-state tracking from system messages.
pub mod connection;

/// Top-level lifecycle facade.
pub mod connector;

/// Level-one feed adapter.
pub mod level_one;

/// Positional wire-message parsing.
pub mod wire;
