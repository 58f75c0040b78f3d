//! Configuration
//!
//! Bridge configuration types, loaded from environment variables.

mod settings;

pub use settings::{
    BridgeConfig, ConfigError, Credentials, DEFAULT_PROTOCOL_VERSION, DEFAULT_PROVIDER_NAME,
};
