//! Feed Connector Facade
//!
//! Top-level lifecycle orchestration for the bridge: establishes the vendor
//! session, opens both feed adapters, and exposes aggregated `start`/`stop`
//! to the platform's composition root.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info};

use crate::application::ports::{BarTransport, FeedSession, LevelOneTransport, TransportError};
use crate::infrastructure::config::BridgeConfig;
use crate::infrastructure::config::Credentials;
use crate::infrastructure::iqfeed::bars::IntervalBarFeedAdapter;
use crate::infrastructure::iqfeed::level_one::LevelOneFeedAdapter;

/// Errors raised by [`FeedConnector::start`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The vendor session rejected the login credentials.
    #[error("vendor session login was rejected")]
    LoginRejected,

    /// A transport collaborator failed during startup.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Facade combining the level-one and interval-bar adapters with the
/// vendor login/session collaborator.
///
/// `stop()` tears down both adapters' subscriptions before releasing the
/// session. It keys the session release off the session's own connected
/// flag, not the started bit, so a `start()` that logged in but failed to
/// open an adapter still has its session reclaimed.
pub struct FeedConnector {
    session: Arc<dyn FeedSession>,
    credentials: Credentials,
    level_one: Arc<LevelOneFeedAdapter>,
    bars: Arc<IntervalBarFeedAdapter>,
    started: AtomicBool,
}

impl FeedConnector {
    /// Build a connector from configuration and the vendor collaborators.
    #[must_use]
    pub fn new(
        config: &BridgeConfig,
        session: Arc<dyn FeedSession>,
        level_one_transport: Arc<dyn LevelOneTransport>,
        bar_transport: Arc<dyn BarTransport>,
    ) -> Self {
        let level_one = LevelOneFeedAdapter::new(
            config.provider_name.clone(),
            config.protocol_version.clone(),
            level_one_transport,
        );
        let bars = IntervalBarFeedAdapter::new(
            config.provider_name.clone(),
            config.protocol_version.clone(),
            bar_transport,
        );

        Self {
            session,
            credentials: config.credentials.clone(),
            level_one,
            bars,
            started: AtomicBool::new(false),
        }
    }

    /// The level-one adapter, for subscriptions and handler registration.
    #[must_use]
    pub const fn level_one(&self) -> &Arc<LevelOneFeedAdapter> {
        &self.level_one
    }

    /// The interval-bar adapter, for subscriptions and handler registration.
    #[must_use]
    pub const fn bars(&self) -> &Arc<IntervalBarFeedAdapter> {
        &self.bars
    }

    /// Whether `start` has completed successfully without a later `stop`.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Start the bridge: log in to the vendor session, then open both
    /// adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::LoginRejected`] if the session declines
    /// the credentials, or the underlying [`TransportError`] if an adapter
    /// fails to open. On error nothing is considered started; `start` may
    /// be retried.
    pub fn start(&self) -> Result<(), ConnectorError> {
        let accepted = self.session.connect(
            self.credentials.login_id(),
            self.credentials.password(),
            self.credentials.product_id(),
            self.credentials.product_version(),
        )?;

        if !accepted {
            error!("vendor session rejected login");
            return Err(ConnectorError::LoginRejected);
        }

        self.level_one.open()?;
        self.bars.open()?;

        self.started.store(true, Ordering::SeqCst);
        info!("feed connector started");
        Ok(())
    }

    /// Stop the bridge: tear down both adapters' subscriptions, then
    /// release the vendor session.
    ///
    /// Safe to call repeatedly, before `start`, and after a failed
    /// `start`: the session is released whenever it is still connected,
    /// even if the started bit was never set.
    pub fn stop(&self) {
        let was_started = self.started.swap(false, Ordering::SeqCst);

        self.level_one.stop();
        self.bars.stop();

        if self.session.is_connected() {
            self.session.disconnect();
        }

        if was_started {
            info!("feed connector stopped");
        }
    }
}

impl std::fmt::Debug for FeedConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedConnector")
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
