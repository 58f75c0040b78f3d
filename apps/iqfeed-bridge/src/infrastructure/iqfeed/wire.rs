//! IQFeed Wire Message Parsing
//!
//! Pure conversion of raw comma-delimited feed messages into validated
//! domain records. Field access is positional with a fixed schema per
//! message type; there is no schema negotiation.
//!
//! # Schemas
//!
//! Level-one summary/update message (after field-set selection):
//!
//! ```text
//! index: 0      1       2           3          4     5         6     7
//!        <tag>, symbol, last price, last size, bid, bid size, ask, ask size
//! ```
//!
//! Bid and ask are optional: an empty bid field disables both bid price and
//! bid size together (likewise for ask). A populated bid price with an
//! unparseable bid size invalidates the whole record.
//!
//! Interval bar complete message:
//!
//! ```text
//! index: 0           1    2       3          4     5     6    7      8  9
//!        request id, ..., symbol, timestamp, open, high, low, close, .., volume
//! ```
//!
//! The bar timestamp uses the fixed format `yyyy-MM-d HH:mm:ss` with no
//! locale-dependent separators.
//!
//! # Timestamps
//!
//! The level-one schema carries no timestamp, so ticks are stamped with the
//! adapter's capture-time clock at receipt. This is a documented imprecision
//! of the upstream summary/update path, preserved deliberately.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::market_data::{Bar, Security, Tick};

/// Field delimiter for all IQFeed wire messages.
pub const DELIMITER: char = ',';

/// Bar timestamp wire format (`yyyy-MM-d HH:mm:ss`, day not zero-padded).
pub const BAR_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Minimum field count for a level-one tick message.
const TICK_FIELD_COUNT: usize = 8;

/// Minimum field count for an interval bar message.
const BAR_FIELD_COUNT: usize = 10;

// =============================================================================
// Error Type
// =============================================================================

/// A typed wire-parse failure.
///
/// Parse failures never surface to consumers; the adapter logs them together
/// with the originating raw message and drops the record.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The message split into fewer fields than the schema requires.
    #[error("message has {actual} fields, schema requires at least {expected}")]
    FieldCount {
        /// Minimum fields the schema requires.
        expected: usize,
        /// Fields actually present.
        actual: usize,
    },

    /// A price or size field did not parse as an exact decimal.
    #[error("field {index} ({name}) is not a valid decimal: {value:?}")]
    InvalidDecimal {
        /// Positional index of the offending field.
        index: usize,
        /// Schema name of the field.
        name: &'static str,
        /// Raw field content.
        value: String,
    },

    /// The volume field did not parse as a 64-bit integer.
    #[error("field {index} (volume) is not a valid integer: {value:?}")]
    InvalidVolume {
        /// Positional index of the offending field.
        index: usize,
        /// Raw field content.
        value: String,
    },

    /// The bar timestamp did not match the fixed wire format.
    #[error("field {index} (timestamp) does not match {BAR_TIMESTAMP_FORMAT:?}: {value:?}")]
    InvalidTimestamp {
        /// Positional index of the offending field.
        index: usize,
        /// Raw field content.
        value: String,
    },
}

// =============================================================================
// Parsing
// =============================================================================

fn parse_decimal(fields: &[&str], index: usize, name: &'static str) -> Result<Decimal, ParseError> {
    fields[index]
        .parse::<Decimal>()
        .map_err(|_| ParseError::InvalidDecimal {
            index,
            name,
            value: fields[index].to_string(),
        })
}

/// Parse a level-one summary/update message into a [`Tick`].
///
/// `captured_at` is the adapter's receipt-time clock; the wire schema for
/// this path carries no exchange timestamp.
///
/// # Errors
///
/// Returns a [`ParseError`] on field-count mismatch or any numeric field
/// that fails exact-decimal parsing. No partial tick is ever produced.
pub fn parse_tick(
    raw: &str,
    provider: &str,
    captured_at: DateTime<Utc>,
) -> Result<Tick, ParseError> {
    let fields: Vec<&str> = raw.split(DELIMITER).collect();

    if fields.len() < TICK_FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: TICK_FIELD_COUNT,
            actual: fields.len(),
        });
    }

    let last_price = parse_decimal(&fields, 2, "last price")?;
    let last_size = parse_decimal(&fields, 3, "last size")?;

    // Empty bid disables the whole bid side; a populated bid price with an
    // unparseable size invalidates the record.
    let (bid_price, bid_size) = if fields[4].is_empty() {
        (None, None)
    } else {
        (
            Some(parse_decimal(&fields, 4, "bid price")?),
            Some(parse_decimal(&fields, 5, "bid size")?),
        )
    };

    let (ask_price, ask_size) = if fields[6].is_empty() {
        (None, None)
    } else {
        (
            Some(parse_decimal(&fields, 6, "ask price")?),
            Some(parse_decimal(&fields, 7, "ask size")?),
        )
    };

    Ok(Tick {
        security: Security::new(fields[1]),
        provider: provider.to_string(),
        timestamp: captured_at,
        last_price,
        last_size,
        bid_price,
        bid_size,
        ask_price,
        ask_size,
    })
}

/// Parse an interval-bar-complete message into a [`Bar`].
///
/// # Errors
///
/// Returns a [`ParseError`] on field-count mismatch, timestamp-format
/// mismatch, or any OHLC/volume field that fails to parse. All four OHLC
/// fields and the volume must parse or the whole record is rejected; no
/// partial bar is ever produced.
pub fn parse_bar(raw: &str, provider: &str) -> Result<Bar, ParseError> {
    let fields: Vec<&str> = raw.split(DELIMITER).collect();

    if fields.len() < BAR_FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: BAR_FIELD_COUNT,
            actual: fields.len(),
        });
    }

    let timestamp = NaiveDateTime::parse_from_str(fields[3], BAR_TIMESTAMP_FORMAT).map_err(
        |_| ParseError::InvalidTimestamp {
            index: 3,
            value: fields[3].to_string(),
        },
    )?;

    let open = parse_decimal(&fields, 4, "open")?;
    let high = parse_decimal(&fields, 5, "high")?;
    let low = parse_decimal(&fields, 6, "low")?;
    let close = parse_decimal(&fields, 7, "close")?;

    let volume = fields[9]
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidVolume {
            index: 9,
            value: fields[9].to_string(),
        })?;

    Ok(Bar {
        security: Security::new(fields[2]),
        provider: provider.to_string(),
        request_id: fields[0].to_string(),
        timestamp,
        open,
        high,
        low,
        close,
        volume,
    })
}

// =============================================================================
// Tests
// =============================================================================
