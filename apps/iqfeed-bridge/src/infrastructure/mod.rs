//! Infrastructure Layer
//!
//! Adapters over the vendor connector plus supporting machinery:
//!
//! - `iqfeed`: wire parsing, connection tracking, and the feed adapters
//! - `dispatch`: single-subscriber notification slots
//! - `config`: environment-driven configuration

/// Environment-driven configuration.
pub mod config;

/// Single-subscriber notification slots.
pub mod dispatch;

/// IQFeed wire parsing and feed adapters.
pub mod iqfeed;
