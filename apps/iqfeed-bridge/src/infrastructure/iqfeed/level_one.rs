//! Level-One Feed Adapter
//!
//! Bridges the vendor level-one stream (raw comma-delimited summary/update
//! messages) to typed [`Tick`] notifications, and tracks the stream's
//! connection state from system messages.
//!
//! # Delivery model
//!
//! The transport calls the inbound [`LevelOneEvents`] methods synchronously
//! on threads of its own choosing. Parsing and dispatch happen in-line on
//! that thread: no queueing, no reordering. Parse failures are logged with
//! the raw payload and dropped; nothing escapes back into the transport's
//! dispatch loop.
//!
//! # Failure policy
//!
//! `subscribe`/`unsubscribe`/`stop` log failures instead of returning them
//! so a caller iterating many subscriptions is never aborted mid-loop.
//! `open` returns a `Result` because retrying the protocol handshake is an
//! explicit caller decision.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::application::ports::{LevelOneEvents, LevelOneTransport, TransportError};
use crate::domain::market_data::{Tick, TickSubscription};
use crate::domain::subscription::SubscriptionRegistry;
use crate::infrastructure::dispatch::{Handler, HandlerSlot};
use crate::infrastructure::iqfeed::connection::ConnectionTracker;
use crate::infrastructure::iqfeed::wire;

/// Update/summary field set requested from the vendor connector after each
/// connect. Field order here defines the positional tick schema.
pub const UPDATE_FIELD_SET: &str =
    "Symbol,Most Recent Trade,Most Recent Trade Size,Bid,Bid Size,Ask,Ask Size";

/// Adapter between the vendor level-one stream and typed tick consumers.
///
/// Owns the symbol [`SubscriptionRegistry`] and the [`ConnectionTracker`]
/// for the quote/trade stream. Exposes a single-subscriber tick slot and a
/// single-subscriber connection-changed slot (`true` = connected).
pub struct LevelOneFeedAdapter {
    provider: String,
    protocol_version: String,
    transport: Arc<dyn LevelOneTransport>,
    registry: SubscriptionRegistry<String>,
    connection: Mutex<ConnectionTracker>,
    tick_slot: HandlerSlot<Tick>,
    connection_slot: HandlerSlot<bool>,
    stopped: AtomicBool,
}

impl LevelOneFeedAdapter {
    /// Create an adapter over a level-one transport.
    ///
    /// `provider` names the market data provider on every emitted record.
    #[must_use]
    pub fn new(
        provider: String,
        protocol_version: String,
        transport: Arc<dyn LevelOneTransport>,
    ) -> Arc<Self> {
        Arc::new(Self {
            provider,
            protocol_version,
            transport,
            registry: SubscriptionRegistry::new(),
            connection: Mutex::new(ConnectionTracker::new()),
            tick_slot: HandlerSlot::new(),
            connection_slot: HandlerSlot::new(),
            stopped: AtomicBool::new(false),
        })
    }

    /// Open the level-one connection: hook the inbound callbacks and
    /// negotiate the protocol version.
    ///
    /// # Errors
    ///
    /// Returns the transport error if protocol negotiation fails; the
    /// adapter is left unopened and the caller may retry explicitly.
    pub fn open(self: &Arc<Self>) -> Result<(), TransportError> {
        self.stopped.store(false, Ordering::SeqCst);

        // Replaces any previous registration, so re-opening never
        // double-hooks the callbacks.
        self.transport
            .register_events(Arc::clone(self) as Arc<dyn LevelOneEvents>);

        self.transport
            .set_protocol(&self.protocol_version)
            .inspect_err(|e| {
                error!(error = %e, "level-one protocol negotiation failed");
            })
    }

    /// Whether the level-one stream is currently connected.
    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_connected()
    }

    /// Subscribe to level-one data for a symbol.
    ///
    /// The symbol is case-normalized and recorded locally regardless of
    /// connection state; the transport watch command is issued only while
    /// connected (the post-connect flow re-issues nothing on the adapter's
    /// behalf, so callers re-subscribe after logon).
    pub fn subscribe(&self, request: &TickSubscription) {
        let symbol = request.security.symbol.to_uppercase();
        if symbol.is_empty() {
            warn!("ignoring level-one subscription with empty symbol");
            return;
        }

        self.registry.add(symbol.clone());

        if !self.is_connected() {
            info!(%symbol, "level-one watch deferred: feed not connected");
            return;
        }

        // The transport, not the registry, is authoritative for watch state;
        // forward even when the registry already held the symbol.
        if let Err(e) = self.transport.watch(&symbol) {
            error!(%symbol, error = %e, "level-one watch command failed");
        }
    }

    /// Unsubscribe from level-one data for a symbol.
    ///
    /// The unwatch command is issued regardless of registry membership:
    /// local and transport state may have drifted, so always tell the
    /// transport to stop.
    pub fn unsubscribe(&self, request: &TickSubscription) {
        let symbol = request.security.symbol.to_uppercase();
        if symbol.is_empty() {
            warn!("ignoring level-one unsubscription with empty symbol");
            return;
        }

        self.registry.remove(&symbol);

        if let Err(e) = self.transport.unwatch(&symbol) {
            error!(%symbol, error = %e, "level-one unwatch command failed");
        }
    }

    /// Stop the adapter: unwatch everything and clear local bookkeeping.
    ///
    /// Safe to call repeatedly and before `open`. After `stop()` no further
    /// arrival notifications are delivered, even if the transport still
    /// calls back.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);

        if let Err(e) = self.transport.unwatch_all() {
            error!(error = %e, "level-one unwatch-all command failed");
        }

        self.registry.clear();
    }

    /// Number of locally registered symbol watches.
    pub fn subscription_count(&self) -> usize {
        self.registry.len()
    }

    /// Check whether a symbol is locally registered (case-normalized).
    pub fn is_subscribed(&self, symbol: &str) -> bool {
        self.registry.contains(&symbol.to_uppercase())
    }

    // =========================================================================
    // Notification slots
    // =========================================================================

    /// Register the tick handler. First registrant wins; returns `false`
    /// if a handler is already in place.
    pub fn register_tick_handler(&self, handler: Handler<Tick>) -> bool {
        self.tick_slot.register(handler)
    }

    /// Remove the tick handler. Returns `true` if one was present.
    pub fn unregister_tick_handler(&self) -> bool {
        self.tick_slot.unregister()
    }

    /// Register the connection-changed handler (`true` = connected).
    /// First registrant wins; returns `false` if a handler is in place.
    pub fn register_connection_handler(&self, handler: Handler<bool>) -> bool {
        self.connection_slot.register(handler)
    }

    /// Remove the connection-changed handler. Returns `true` if one was
    /// present.
    pub fn unregister_connection_handler(&self) -> bool {
        self.connection_slot.unregister()
    }

    // =========================================================================
    // Inbound message handling
    // =========================================================================

    fn handle_data_message(&self, raw: &str) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }

        match wire::parse_tick(raw, &self.provider, Utc::now()) {
            Ok(tick) => {
                self.tick_slot.emit(&tick);
            }
            Err(e) => {
                warn!(raw, error = %e, "dropping malformed level-one message");
            }
        }
    }
}

impl LevelOneEvents for LevelOneFeedAdapter {
    fn on_summary(&self, raw: &str) {
        self.handle_data_message(raw);
    }

    fn on_update(&self, raw: &str) {
        self.handle_data_message(raw);
    }

    fn on_system(&self, raw: &str) {
        // Take the transition decision under the lock, act outside it.
        let transition = self.connection.lock().apply_system_message(raw);

        match transition {
            Some(state) if state.is_connected() => {
                info!("level-one feed connected");

                // One-time post-connect setup: the transition guard ensures
                // the field set is selected once per connect cycle.
                if let Err(e) = self.transport.select_update_fields(UPDATE_FIELD_SET) {
                    error!(error = %e, "field-set selection failed");
                }

                self.connection_slot.emit(&true);
            }
            Some(_) => {
                info!("level-one feed disconnected");
                self.connection_slot.emit(&false);
            }
            None => {
                debug!(raw, "ignoring system message");
            }
        }
    }

    fn on_error(&self, raw: &str) {
        error!(raw, "level-one feed error message");
    }
}

impl std::fmt::Debug for LevelOneFeedAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelOneFeedAdapter")
            .field("provider", &self.provider)
            .field("connected", &self.is_connected())
            .field("subscriptions", &self.registry.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockLevelOneTransport;
    use std::sync::atomic::AtomicUsize;

    fn connected_adapter(mut mock: MockLevelOneTransport) -> Arc<LevelOneFeedAdapter> {
        mock.expect_register_events().return_const(());
        mock.expect_set_protocol().returning(|_| Ok(()));
        mock.expect_select_update_fields().returning(|_| Ok(()));

        let adapter = LevelOneFeedAdapter::new(
            "IQFeed".to_string(),
            "5.2".to_string(),
            Arc::new(mock),
        );
        adapter.open().unwrap();
        adapter.on_system("S,SERVER CONNECTED");
        adapter
    }

    #[test]
    fn open_negotiates_protocol() {
        let mut mock = MockLevelOneTransport::new();
        mock.expect_register_events().times(1).return_const(());
        mock.expect_set_protocol()
            .withf(|v| v == "5.2")
            .times(1)
            .returning(|_| Ok(()));

        let adapter =
            LevelOneFeedAdapter::new("IQFeed".to_string(), "5.2".to_string(), Arc::new(mock));

        assert!(adapter.open().is_ok());
        assert!(!adapter.is_connected());
    }

    #[test]
    fn open_failure_is_reported_for_explicit_retry() {
        let mut mock = MockLevelOneTransport::new();
        mock.expect_register_events().return_const(());
        mock.expect_set_protocol()
            .returning(|_| Err(TransportError::ProtocolNegotiation("refused".to_string())));

        let adapter =
            LevelOneFeedAdapter::new("IQFeed".to_string(), "5.2".to_string(), Arc::new(mock));

        assert!(adapter.open().is_err());
    }

    #[test]
    fn subscribe_before_connect_defers_watch_command() {
        let mut mock = MockLevelOneTransport::new();
        mock.expect_register_events().return_const(());
        mock.expect_set_protocol().returning(|_| Ok(()));
        // No watch expectation: the command must not be issued.
        let adapter =
            LevelOneFeedAdapter::new("IQFeed".to_string(), "5.2".to_string(), Arc::new(mock));
        adapter.open().unwrap();

        adapter.subscribe(&TickSubscription::new("aapl"));

        // Registered locally, normalized to uppercase.
        assert!(adapter.is_subscribed("AAPL"));
        assert_eq!(adapter.subscription_count(), 1);
    }

    #[test]
    fn subscribe_when_connected_issues_watch() {
        let mut mock = MockLevelOneTransport::new();
        mock.expect_watch()
            .withf(|s| s == "AAPL")
            .times(1)
            .returning(|_| Ok(()));

        let adapter = connected_adapter(mock);

        adapter.subscribe(&TickSubscription::new("aapl"));
        assert!(adapter.is_subscribed("aapl"));
    }

    #[test]
    fn duplicate_subscribe_still_forwards_watch() {
        // The transport is authoritative for watch state; the registry only
        // tracks locally, so both subscribes reach the transport.
        let mut mock = MockLevelOneTransport::new();
        mock.expect_watch()
            .withf(|s| s == "AAPL")
            .times(2)
            .returning(|_| Ok(()));

        let adapter = connected_adapter(mock);

        adapter.subscribe(&TickSubscription::new("AAPL"));
        adapter.subscribe(&TickSubscription::new("AAPL"));
        assert_eq!(adapter.subscription_count(), 1);
    }

    #[test]
    fn subscribe_empty_symbol_is_logged_not_forwarded() {
        let mock = MockLevelOneTransport::new();
        let adapter = connected_adapter(mock);

        adapter.subscribe(&TickSubscription::new(""));

        assert_eq!(adapter.subscription_count(), 0);
    }

    #[test]
    fn unsubscribe_always_issues_unwatch() {
        // Never subscribed, and not connected: the unwatch is still sent,
        // defensively, in case transport state drifted.
        let mut mock = MockLevelOneTransport::new();
        mock.expect_register_events().return_const(());
        mock.expect_set_protocol().returning(|_| Ok(()));
        mock.expect_unwatch()
            .withf(|s| s == "MSFT")
            .times(1)
            .returning(|_| Ok(()));

        let adapter =
            LevelOneFeedAdapter::new("IQFeed".to_string(), "5.2".to_string(), Arc::new(mock));
        adapter.open().unwrap();

        adapter.unsubscribe(&TickSubscription::new("msft"));
    }

    #[test]
    fn stop_unwatches_all_and_clears_registry() {
        let mut mock = MockLevelOneTransport::new();
        mock.expect_watch().returning(|_| Ok(()));
        mock.expect_unwatch_all().times(2).returning(|| Ok(()));

        let adapter = connected_adapter(mock);
        adapter.subscribe(&TickSubscription::new("AAPL"));

        adapter.stop();
        assert_eq!(adapter.subscription_count(), 0);

        // Double stop never raises.
        adapter.stop();
    }

    #[test]
    fn stop_before_open_is_a_noop_surface() {
        let mut mock = MockLevelOneTransport::new();
        mock.expect_unwatch_all().returning(|| Ok(()));

        let adapter =
            LevelOneFeedAdapter::new("IQFeed".to_string(), "5.2".to_string(), Arc::new(mock));

        adapter.stop();
    }

    #[test]
    fn summary_message_delivers_tick() {
        let mock = MockLevelOneTransport::new();
        let adapter = connected_adapter(mock);

        let delivered: Arc<Mutex<Vec<Tick>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&delivered);
        adapter.register_tick_handler(Arc::new(move |tick| {
            sink.lock().push(tick.clone());
        }));

        adapter.on_summary("REQ1,AAPL,101.50,100,101.25,50,101.75,50");

        let ticks = delivered.lock();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].security.symbol, "AAPL");
        assert_eq!(ticks[0].last_price, "101.50".parse().unwrap());
    }

    #[test]
    fn malformed_message_is_dropped_silently() {
        let mock = MockLevelOneTransport::new();
        let adapter = connected_adapter(mock);

        let hits = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&hits);
        adapter.register_tick_handler(Arc::new(move |_tick| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));

        adapter.on_update("garbage");
        adapter.on_update("REQ1,AAPL,not-a-price,100,,,,");

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn no_delivery_after_stop_even_if_transport_calls_back() {
        let mut mock = MockLevelOneTransport::new();
        mock.expect_unwatch_all().returning(|| Ok(()));
        let adapter = connected_adapter(mock);

        let hits = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&hits);
        adapter.register_tick_handler(Arc::new(move |_tick| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));

        adapter.stop();
        adapter.on_update("REQ1,AAPL,101.50,100,,,,");

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn duplicate_connect_notifies_once_and_selects_fields_once() {
        let mut mock = MockLevelOneTransport::new();
        mock.expect_register_events().return_const(());
        mock.expect_set_protocol().returning(|_| Ok(()));
        mock.expect_select_update_fields()
            .withf(|f| f == UPDATE_FIELD_SET)
            .times(1)
            .returning(|_| Ok(()));

        let adapter =
            LevelOneFeedAdapter::new("IQFeed".to_string(), "5.2".to_string(), Arc::new(mock));
        adapter.open().unwrap();

        let notifications: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notifications);
        adapter.register_connection_handler(Arc::new(move |connected| {
            sink.lock().push(*connected);
        }));

        adapter.on_system("S,SERVER CONNECTED");
        adapter.on_system("S,SERVER CONNECTED");

        assert_eq!(*notifications.lock(), vec![true]);
        assert!(adapter.is_connected());
    }

    #[test]
    fn disconnect_while_disconnected_notifies_nothing() {
        let mut mock = MockLevelOneTransport::new();
        mock.expect_register_events().return_const(());
        mock.expect_set_protocol().returning(|_| Ok(()));

        let adapter =
            LevelOneFeedAdapter::new("IQFeed".to_string(), "5.2".to_string(), Arc::new(mock));
        adapter.open().unwrap();

        let notifications: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notifications);
        adapter.register_connection_handler(Arc::new(move |connected| {
            sink.lock().push(*connected);
        }));

        adapter.on_system("S,SERVER DISCONNECTED");

        assert!(notifications.lock().is_empty());
    }

    #[test]
    fn reconnect_cycle_selects_fields_each_connect() {
        let mut mock = MockLevelOneTransport::new();
        mock.expect_register_events().return_const(());
        mock.expect_set_protocol().returning(|_| Ok(()));
        mock.expect_select_update_fields()
            .times(2)
            .returning(|_| Ok(()));

        let adapter =
            LevelOneFeedAdapter::new("IQFeed".to_string(), "5.2".to_string(), Arc::new(mock));
        adapter.open().unwrap();

        adapter.on_system("S,SERVER CONNECTED");
        adapter.on_system("S,SERVER DISCONNECTED");
        adapter.on_system("S,SERVER CONNECTED");
    }

    #[test]
    fn second_tick_handler_registration_is_rejected() {
        let mock = MockLevelOneTransport::new();
        let adapter = connected_adapter(mock);

        assert!(adapter.register_tick_handler(Arc::new(|_tick| {})));
        assert!(!adapter.register_tick_handler(Arc::new(|_tick| {})));

        assert!(adapter.unregister_tick_handler());
        assert!(adapter.register_tick_handler(Arc::new(|_tick| {})));
    }

    #[test]
    fn error_messages_do_not_reach_tick_handler() {
        let mock = MockLevelOneTransport::new();
        let adapter = connected_adapter(mock);

        let hits = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&hits);
        adapter.register_tick_handler(Arc::new(move |_tick| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));

        adapter.on_error("E,Invalid symbol");

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
