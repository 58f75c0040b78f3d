//! Bridge Configuration Settings
//!
//! Configuration types for the feed bridge, loaded from environment
//! variables. The provider name is an explicit configuration value handed
//! to adapter construction, not a process-wide constant.

/// Default provider name stamped on emitted records.
pub const DEFAULT_PROVIDER_NAME: &str = "IQFeed";

/// Default vendor wire protocol version.
pub const DEFAULT_PROTOCOL_VERSION: &str = "5.2";

/// Vendor session credentials.
#[derive(Clone)]
pub struct Credentials {
    login_id: String,
    password: String,
    product_id: String,
    product_version: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(
        login_id: String,
        password: String,
        product_id: String,
        product_version: String,
    ) -> Self {
        Self {
            login_id,
            password,
            product_id,
            product_version,
        }
    }

    /// Get the login id.
    #[must_use]
    pub fn login_id(&self) -> &str {
        &self.login_id
    }

    /// Get the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Get the vendor product id.
    #[must_use]
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Get the vendor product version.
    #[must_use]
    pub fn product_version(&self) -> &str {
        &self.product_version
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login_id", &self.login_id)
            .field("password", &"[REDACTED]")
            .field("product_id", &self.product_id)
            .field("product_version", &self.product_version)
            .finish()
    }
}

/// Complete bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Provider name stamped on every emitted tick and bar.
    pub provider_name: String,
    /// Vendor wire protocol version negotiated at adapter open.
    pub protocol_version: String,
    /// Vendor session credentials.
    pub credentials: Credentials,
}

impl BridgeConfig {
    /// Create a configuration with default provider name and protocol
    /// version.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            provider_name: DEFAULT_PROVIDER_NAME.to_string(),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            credentials,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required: `IQFEED_LOGIN_ID`, `IQFEED_PASSWORD`, `IQFEED_PRODUCT_ID`,
    /// `IQFEED_PRODUCT_VERSION`. Optional: `IQFEED_PROVIDER_NAME`,
    /// `IQFEED_PROTOCOL_VERSION`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required environment variable is missing or
    /// empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let login_id = require_env("IQFEED_LOGIN_ID")?;
        let password = require_env("IQFEED_PASSWORD")?;
        let product_id = require_env("IQFEED_PRODUCT_ID")?;
        let product_version = require_env("IQFEED_PRODUCT_VERSION")?;

        let provider_name = std::env::var("IQFEED_PROVIDER_NAME")
            .unwrap_or_else(|_| DEFAULT_PROVIDER_NAME.to_string());
        let protocol_version = std::env::var("IQFEED_PROTOCOL_VERSION")
            .unwrap_or_else(|_| DEFAULT_PROTOCOL_VERSION.to_string());

        Ok(Self {
            provider_name,
            protocol_version,
            credentials: Credentials::new(login_id, password, product_id, product_version),
        })
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    let value =
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;

    if value.is_empty() {
        return Err(ConfigError::EmptyValue(name.to_string()));
    }

    Ok(value)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// A required environment variable was set but empty.
    #[error("environment variable is empty: {0}")]
    EmptyValue(String),
}

// =============================================================================
// Tests
// =============================================================================
