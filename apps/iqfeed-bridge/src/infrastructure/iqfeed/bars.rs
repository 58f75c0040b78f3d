//! Interval Bar Feed Adapter
//!
//! Bridges the vendor streaming-bars connector to typed [`Bar`]
//! notifications. Unlike the level-one stream, the bar connector manages
//! its own connection to the feed server, so watch commands are issued
//! unconditionally and no adapter-level connection tracking exists here.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, warn};

use crate::application::ports::{BarEvents, BarTransport, BarWatchCommand, TransportError};
use crate::domain::market_data::{Bar, BarDataRequest};
use crate::domain::subscription::{BarSubscriptionKey, SubscriptionRegistry};
use crate::infrastructure::dispatch::{Handler, HandlerSlot};
use crate::infrastructure::iqfeed::wire;

/// Adapter between the vendor streaming-bars connector and typed bar
/// consumers.
///
/// Bar watches are keyed by (symbol, request id): the same symbol may carry
/// several concurrent watches correlated by caller-supplied ids, and every
/// emitted [`Bar`] echoes the id of the watch that produced it.
pub struct IntervalBarFeedAdapter {
    provider: String,
    protocol_version: String,
    transport: Arc<dyn BarTransport>,
    registry: SubscriptionRegistry<BarSubscriptionKey>,
    bar_slot: HandlerSlot<Bar>,
    stopped: AtomicBool,
}

impl IntervalBarFeedAdapter {
    /// Create an adapter over a bar transport.
    ///
    /// `provider` names the market data provider on every emitted record.
    #[must_use]
    pub fn new(
        provider: String,
        protocol_version: String,
        transport: Arc<dyn BarTransport>,
    ) -> Arc<Self> {
        Arc::new(Self {
            provider,
            protocol_version,
            transport,
            registry: SubscriptionRegistry::new(),
            bar_slot: HandlerSlot::new(),
            stopped: AtomicBool::new(false),
        })
    }

    /// Open the bar connection: hook the inbound callback and negotiate
    /// the protocol version.
    ///
    /// # Errors
    ///
    /// Returns the transport error if protocol negotiation fails; the
    /// adapter is left unopened and the caller may retry explicitly.
    pub fn open(self: &Arc<Self>) -> Result<(), TransportError> {
        self.stopped.store(false, Ordering::SeqCst);

        self.transport
            .register_events(Arc::clone(self) as Arc<dyn BarEvents>);

        self.transport
            .set_protocol(&self.protocol_version)
            .inspect_err(|e| {
                error!(error = %e, "bar protocol negotiation failed");
            })
    }

    /// Subscribe to interval bars.
    ///
    /// The watch is issued unconditionally: the bar connector tracks its
    /// own connection state. Invalid requests (empty symbol, zero interval)
    /// are logged and skipped so a caller iterating many subscriptions is
    /// never aborted.
    pub fn subscribe(&self, request: &BarDataRequest) {
        let symbol = request.security.symbol.to_uppercase();
        if symbol.is_empty() {
            warn!("ignoring bar subscription with empty symbol");
            return;
        }
        if request.bar_length == 0 {
            warn!(%symbol, "ignoring bar subscription with zero interval length");
            return;
        }

        self.registry
            .add(BarSubscriptionKey::new(&symbol, request.id.clone()));

        let command = BarWatchCommand::streaming(
            symbol.clone(),
            request.bar_length,
            request.interval_unit.wire_code(),
            request.id.clone(),
        );

        if let Err(e) = self.transport.bar_watch(&command) {
            error!(%symbol, request_id = %request.id, error = %e, "bar watch command failed");
        }
    }

    /// Unsubscribe from interval bars.
    ///
    /// The unwatch command is issued regardless of registry membership,
    /// defensively, in case local and transport state drifted.
    pub fn unsubscribe(&self, request: &BarDataRequest) {
        let symbol = request.security.symbol.to_uppercase();
        if symbol.is_empty() {
            warn!("ignoring bar unsubscription with empty symbol");
            return;
        }

        self.registry
            .remove(&BarSubscriptionKey::new(&symbol, request.id.clone()));

        if let Err(e) = self.transport.bar_unwatch(&symbol, &request.id) {
            error!(%symbol, request_id = %request.id, error = %e, "bar unwatch command failed");
        }
    }

    /// Stop the adapter: unwatch everything and clear local bookkeeping.
    ///
    /// Safe to call repeatedly and before `open`. After `stop()` no further
    /// bar notifications are delivered, even if the transport still calls
    /// back.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);

        if let Err(e) = self.transport.unwatch_all() {
            error!(error = %e, "bar unwatch-all command failed");
        }

        self.registry.clear();
    }

    /// Number of locally registered bar watches.
    pub fn subscription_count(&self) -> usize {
        self.registry.len()
    }

    /// Check whether a (symbol, request id) watch is locally registered.
    pub fn is_subscribed(&self, symbol: &str, request_id: &str) -> bool {
        self.registry
            .contains(&BarSubscriptionKey::new(symbol, request_id))
    }

    /// Register the bar handler. First registrant wins; returns `false`
    /// if a handler is already in place.
    pub fn register_bar_handler(&self, handler: Handler<Bar>) -> bool {
        self.bar_slot.register(handler)
    }

    /// Remove the bar handler. Returns `true` if one was present.
    pub fn unregister_bar_handler(&self) -> bool {
        self.bar_slot.unregister()
    }
}

impl BarEvents for IntervalBarFeedAdapter {
    fn on_bar_complete(&self, raw: &str) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }

        match wire::parse_bar(raw, &self.provider) {
            Ok(bar) => {
                self.bar_slot.emit(&bar);
            }
            Err(e) => {
                warn!(raw, error = %e, "dropping malformed bar message");
            }
        }
    }
}

impl std::fmt::Debug for IntervalBarFeedAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalBarFeedAdapter")
            .field("provider", &self.provider)
            .field("subscriptions", &self.registry.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
