//! Environment variable configuration.
//!
//! Every setting is read from an `SMS_MONITOR_`-prefixed variable. Unset variables keep
//! their defaults; set but unparsable variables are errors.

use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::delivery::{Audience, DeliveryMode};
use super::monitor::{MonitorConfig, RegionFailurePolicy};
use super::{ConfigError, ConfigResult};

pub const ENV_PREFIX: &str = "SMS_MONITOR_";

pub const REGIONS: &str = "REGIONS";
pub const WARNING_CUTOFF: &str = "WARNING_CUTOFF";
pub const DELIVERY: &str = "DELIVERY";
pub const AUDIENCE: &str = "AUDIENCE";
pub const SENDER_ID: &str = "SENDER_ID";
pub const CALL_TIMEOUT_SECS: &str = "CALL_TIMEOUT_SECS";
pub const CONCURRENCY: &str = "CONCURRENCY";
pub const REGION_FAILURE: &str = "REGION_FAILURE";
pub const HOME_REGION: &str = "HOME_REGION";
pub const ENDPOINT_URL: &str = "ENDPOINT_URL";

impl MonitorConfig {
    /// Load configuration from `SMS_MONITOR_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = MonitorConfig::default();

        if let Some(regions) = var(REGIONS) {
            config.regions = split_list(&regions);
        }
        if let Some(cutoff) = parse_var::<Decimal>(WARNING_CUTOFF, var(WARNING_CUTOFF))? {
            config.warning_cutoff = cutoff;
        }
        if let Some(mode) = var(DELIVERY) {
            config.delivery_mode = mode.parse::<DeliveryMode>()?;
        }
        if let Some(audience) = var(AUDIENCE) {
            config.audience = Some(Audience::parse_for(config.delivery_mode, &audience));
        }
        if let Some(sender_id) = var(SENDER_ID) {
            config.sender_id = sender_id;
        }
        if let Some(secs) = parse_var::<u64>(CALL_TIMEOUT_SECS, var(CALL_TIMEOUT_SECS))? {
            config.call_timeout_secs = secs;
        }
        if let Some(n) = parse_var::<usize>(CONCURRENCY, var(CONCURRENCY))? {
            config.concurrency = n;
        }
        if let Some(policy) = var(REGION_FAILURE) {
            config.region_failure = policy.parse::<RegionFailurePolicy>()?;
        }
        if let Some(region) = var(HOME_REGION) {
            config.home_region = region;
        }
        config.endpoint_url = var(ENDPOINT_URL);

        Ok(config)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_var<T>(name: &str, value: Option<String>) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse::<T>().map_err(|e| {
                ConfigError::invalid(format!("{}{}", ENV_PREFIX, name), format!("'{}': {}", v, e))
            })
        })
        .transpose()
}
