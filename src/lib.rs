//! # sms-spend-monitor
//!
//! Month-to-date SMS spend monitoring across cloud regions.
//!
//! Each invocation queries every configured region for its monthly SMS spend limit and
//! the latest daily spend data point, computes a use ratio per region, and sends one
//! warning notification when any region is at or above the configured cutoff.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sms_spend_monitor::{AwsProvider, MonitorConfig, UsageMonitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sms_spend_monitor::Error> {
//!     let config = MonitorConfig::from_env()?;
//!     let provider = Arc::new(AwsProvider::from_config(&config).await?);
//!
//!     let monitor = UsageMonitor::builder(config)
//!         .usage_provider(provider.clone())
//!         .notifier(provider.clone())
//!         .identity(provider)
//!         .build()?;
//!
//!     let response = monitor.invoke(serde_json::json!("Local Test")).await?;
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

#[cfg(feature = "aws")]
pub mod aws;
pub mod config;
pub mod dispatch;
pub mod monitor;
pub mod observability;
pub mod provider;
pub mod usage;

#[cfg(feature = "aws")]
pub use aws::{AwsProvider, AwsProviderBuilder};
pub use config::{
    Audience, ConfigError, ConfigValidator, DeliveryMode, DeliveryTarget, MonitorConfig,
    RegionFailurePolicy,
};
pub use dispatch::{
    DeliveryResult, DeliveryStatus, WarningDispatchOutcome, WarningDispatcher,
    format_warning_message, select_sending_region, warning_regions,
};
pub use monitor::{InvocationResponse, UsageMonitor, UsageMonitorBuilder};
pub use provider::{
    AccountIdentity, Datapoint, MessageAttributes, Notifier, ProviderError, ProviderErrorKind,
    PublishAck, UsageProvider,
};
pub use usage::{
    BillingWindow, LimitSource, RegionCollector, RegionFailure, RegionUsage, RegionUsageRecord,
    UsageAggregator,
};

/// Error type for sms-spend-monitor operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A cloud provider API rejected the request or failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse a provider response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Credentials could not be resolved or a request could not be signed.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Topic identifier does not carry a region segment.
    #[error("Cannot extract region metadata from \"{0}\"")]
    MalformedAudience(String),

    /// A single provider call exceeded its timeout.
    #[error("{operation} timed out after {:.1}s", .duration.as_secs_f64())]
    Timeout {
        operation: &'static str,
        duration: std::time::Duration,
    },

    /// Collection for a region failed under the abort policy.
    #[error("Usage collection failed in {region}: {source}")]
    Region {
        region: String,
        #[source]
        source: Box<Error>,
    },

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credential or authorization failures (401, 403)
    Authorization,
    /// Configuration, parsing, or setup errors
    Configuration,
    /// Network, throttling, or server errors that may succeed on a later run
    Transient,
    /// The provider rejected the request (invalid parameter, not found, client error)
    Rejected,
    /// Timeouts
    ResourceLimit,
    /// Internal errors (IO, JSON, unexpected states)
    Internal,
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Auth { .. } => ErrorCategory::Authorization,
            Error::Provider(e) => match e.kind() {
                ProviderErrorKind::Authorization => ErrorCategory::Authorization,
                ProviderErrorKind::Throttling | ProviderErrorKind::Server => {
                    ErrorCategory::Transient
                }
                ProviderErrorKind::InvalidParameter
                | ProviderErrorKind::NotFound
                | ProviderErrorKind::Client => ErrorCategory::Rejected,
            },

            Error::Config(_) | Error::MalformedAudience(_) | Error::Parse(_) => {
                ErrorCategory::Configuration
            }

            Error::Network(_) => ErrorCategory::Transient,
            Error::Timeout { .. } => ErrorCategory::ResourceLimit,
            Error::Region { source, .. } => source.category(),

            Error::Io(_) | Error::Json(_) => ErrorCategory::Internal,
        }
    }

    /// Short machine-readable label used in failure descriptors.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Provider(e) => e.kind().as_str(),
            Error::Network(_) => "network",
            Error::Json(_) => "json",
            Error::Parse(_) => "parse",
            Error::Auth { .. } => "auth",
            Error::Config(_) => "config",
            Error::MalformedAudience(_) => "malformed_audience",
            Error::Timeout { .. } => "timeout",
            Error::Region { source, .. } => source.kind(),
            Error::Io(_) => "io",
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transient | ErrorCategory::ResourceLimit
        )
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Provider(e) => e.status(),
            Error::Region { source, .. } => source.status_code(),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound { key } => {
                Error::Config(format!("Key not found: {}", key))
            }
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Serialization(e) => Error::Json(e),
            config::ConfigError::Io(e) => Error::Io(e),
            config::ConfigError::ValidationErrors(errors) => Error::Config(errors.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
