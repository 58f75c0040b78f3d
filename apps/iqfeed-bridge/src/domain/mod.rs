//! Domain Layer
//!
//! Core market data types and subscription bookkeeping with no
//! dependency on the vendor transport.

/// Market data value types: securities, ticks, bars, requests.
pub mod market_data;

/// Subscription registry for local watch-state bookkeeping.
pub mod subscription;
