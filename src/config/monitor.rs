//! Monitor configuration values.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::ConfigResult;
use super::delivery::{Audience, DeliveryMode, DeliveryTarget};
use super::validator::ConfigValidator;
use crate::usage::DEFAULT_CONCURRENCY;

pub const DEFAULT_REGIONS: &[&str] = &[
    "us-east-1",
    "us-west-2",
    "eu-west-1",
    "ap-northeast-1",
    "ap-southeast-1",
    "ap-southeast-2",
];

pub const DEFAULT_WARNING_CUTOFF: Decimal = dec!(0.7);
pub const DEFAULT_SENDER_ID: &str = "AWSWarning";
pub const DEFAULT_HOME_REGION: &str = "us-east-1";
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 10;

/// What to do when collection fails for one region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionFailurePolicy {
    /// Record the failure for that region and continue with the rest.
    #[default]
    Isolate,
    /// Fail the whole invocation.
    Abort,
}

impl std::str::FromStr for RegionFailurePolicy {
    type Err = super::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolate" => Ok(Self::Isolate),
            "abort" => Ok(Self::Abort),
            other => Err(super::ConfigError::invalid(
                "region_failure",
                format!("expected 'isolate' or 'abort', got '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Regions to check, in report order.
    pub regions: Vec<String>,
    /// Use ratio at or above which a region is flagged. Must be in (0, 1).
    #[serde(with = "rust_decimal::serde::float")]
    pub warning_cutoff: Decimal,
    pub delivery_mode: DeliveryMode,
    /// Recipient list (direct) or topic ARN (topic).
    pub audience: Option<Audience>,
    /// Sender ID shown on the handset.
    pub sender_id: String,
    /// Timeout for each provider call, in seconds.
    pub call_timeout_secs: u64,
    /// Maximum regions collected at once.
    pub concurrency: usize,
    pub region_failure: RegionFailurePolicy,
    /// Region used for account identity lookups.
    pub home_region: String,
    /// Base URL replacing every provider endpoint (local stacks, tests).
    pub endpoint_url: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            regions: DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect(),
            warning_cutoff: DEFAULT_WARNING_CUTOFF,
            delivery_mode: DeliveryMode::Direct,
            audience: None,
            sender_id: DEFAULT_SENDER_ID.to_string(),
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
            region_failure: RegionFailurePolicy::Isolate,
            home_region: DEFAULT_HOME_REGION.to_string(),
            endpoint_url: None,
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regions(mut self, regions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn warning_cutoff(mut self, cutoff: Decimal) -> Self {
        self.warning_cutoff = cutoff;
        self
    }

    /// Deliver one SMS to each recipient.
    pub fn direct(mut self, recipients: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.delivery_mode = DeliveryMode::Direct;
        self.audience = Some(Audience::List(
            recipients.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Deliver one message to a topic.
    pub fn topic(mut self, topic_arn: impl Into<String>) -> Self {
        self.delivery_mode = DeliveryMode::Topic;
        self.audience = Some(Audience::Single(topic_arn.into()));
        self
    }

    /// Set mode and audience independently, as read from loosely typed settings.
    pub fn delivery(mut self, mode: DeliveryMode, audience: Option<Audience>) -> Self {
        self.delivery_mode = mode;
        self.audience = audience;
        self
    }

    pub fn sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = sender_id.into();
        self
    }

    /// Stored in whole seconds; sub-second values round up to one second.
    /// `UsageMonitorBuilder::call_timeout` keeps the exact duration.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn region_failure(mut self, policy: RegionFailurePolicy) -> Self {
        self.region_failure = policy;
        self
    }

    pub fn home_region(mut self, region: impl Into<String>) -> Self {
        self.home_region = region.into();
        self
    }

    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn call_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Typed delivery target, or `None` when mode and audience disagree.
    pub fn delivery_target(&self) -> Option<DeliveryTarget> {
        DeliveryTarget::resolve(self.delivery_mode, self.audience.as_ref())
    }

    /// Check all values, reporting every problem at once.
    pub fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::new().validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.regions.len(), 6);
        assert_eq!(config.regions[0], "us-east-1");
        assert_eq!(config.warning_cutoff, dec!(0.7));
        assert_eq!(config.sender_id, "AWSWarning");
        assert_eq!(config.region_failure, RegionFailurePolicy::Isolate);
        assert_eq!(config.call_timeout_duration(), Duration::from_secs(10));
        assert!(config.delivery_target().is_none());
    }

    #[test]
    fn test_builder_direct() {
        let config = MonitorConfig::new()
            .regions(["us-east-1"])
            .direct(["+15550100", "+15550101"]);
        assert_eq!(
            config.delivery_target(),
            Some(DeliveryTarget::Direct(vec![
                "+15550100".into(),
                "+15550101".into()
            ]))
        );
    }

    #[test]
    fn test_builder_topic() {
        let config = MonitorConfig::new().topic("arn:aws:sns:us-west-2:123456789012:alerts");
        assert_eq!(config.delivery_mode, DeliveryMode::Topic);
        assert!(matches!(
            config.delivery_target(),
            Some(DeliveryTarget::Topic(_))
        ));
    }

    #[test]
    fn test_mismatched_delivery_has_no_target() {
        let config = MonitorConfig::new().delivery(
            DeliveryMode::Direct,
            Some(Audience::Single("arn:aws:sns:us-east-1:1:t".into())),
        );
        assert!(config.delivery_target().is_none());
    }

    #[test]
    fn test_call_timeout_whole_seconds() {
        let config = MonitorConfig::new().call_timeout(Duration::from_millis(200));
        assert_eq!(config.call_timeout_secs, 1);
        assert_eq!(config.call_timeout_duration(), Duration::from_secs(1));

        let config = MonitorConfig::new().call_timeout(Duration::from_millis(2500));
        assert_eq!(config.call_timeout_secs, 2);
    }

    #[test]
    fn test_failure_policy_from_str() {
        assert_eq!(
            "Abort".parse::<RegionFailurePolicy>().unwrap(),
            RegionFailurePolicy::Abort
        );
        assert!("retry".parse::<RegionFailurePolicy>().is_err());
    }
}
