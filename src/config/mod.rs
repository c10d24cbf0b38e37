//! Monitor configuration.
//!
//! Configuration is fixed at process start. It can be assembled three ways:
//!
//! ```rust,no_run
//! use sms_spend_monitor::config::MonitorConfig;
//! use rust_decimal_macros::dec;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Builder
//! let config = MonitorConfig::new()
//!     .regions(["us-east-1", "eu-west-1"])
//!     .warning_cutoff(dec!(0.8))
//!     .direct(["+15550100"]);
//!
//! // Environment (SMS_MONITOR_*)
//! let config = MonitorConfig::from_env()?;
//!
//! // JSON file
//! let config = MonitorConfig::from_file("monitor.json").await?;
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

pub mod delivery;
pub mod env;
pub mod file;
pub mod monitor;
pub mod validator;

pub use delivery::{Audience, DeliveryMode, DeliveryTarget, topic_region};
pub use monitor::{
    DEFAULT_HOME_REGION, DEFAULT_REGIONS, DEFAULT_SENDER_ID, DEFAULT_WARNING_CUTOFF,
    MonitorConfig, RegionFailurePolicy,
};
pub use validator::ConfigValidator;

use thiserror::Error;

/// Errors that can occur in configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Key not found
    #[error("Key not found: {key}")]
    NotFound {
        /// The key that was not found
        key: String,
    },

    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The key with invalid value
        key: String,
        /// Error message
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Multiple validation errors
    #[error("{0}")]
    ValidationErrors(ValidationErrors),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ConfigError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed: ")?;
        let msgs: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", msgs.join("; "))
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
