//! JSON file configuration.
//!
//! Keys mirror [`MonitorConfig`] fields; missing keys keep their defaults.
//!
//! ```json
//! {
//!   "regions": ["us-east-1", "eu-west-1"],
//!   "warning_cutoff": 0.7,
//!   "delivery_mode": "topic",
//!   "audience": "arn:aws:sns:us-east-1:123456789012:sms-alerts",
//!   "sender_id": "AWSWarning"
//! }
//! ```

use std::path::Path;

use super::ConfigResult;
use super::monitor::MonitorConfig;

impl MonitorConfig {
    /// Load configuration from a JSON file.
    pub async fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
