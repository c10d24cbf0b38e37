//! Configuration Validation Layer
//!
//! Validates a [`MonitorConfig`] before use, collecting every problem.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::delivery::{Audience, DeliveryMode, topic_region};
use super::monitor::MonitorConfig;
use super::{ConfigError, ConfigResult, ValidationErrors};

fn e164_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+[1-9][0-9]{1,14}$").expect("valid E.164 regex"))
}

fn sender_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]{1,11}$").expect("valid sender id regex"))
}

fn region_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-[0-9]+$").expect("valid region regex"))
}

/// Rules applied to a [`MonitorConfig`].
///
/// Mode/audience disagreement is not a validation error: it is tolerated at run time
/// and reported when dispatching.
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    strict_regions: bool,
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self {
            strict_regions: true,
        }
    }

    /// Accept any non-blank region name, for non-standard endpoints.
    pub fn lenient_regions(mut self) -> Self {
        self.strict_regions = false;
        self
    }

    pub fn validate(&self, config: &MonitorConfig) -> ConfigResult<()> {
        let errors = self.collect_errors(config);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationErrors(ValidationErrors(errors)))
        }
    }

    pub fn validate_partial(&self, config: &MonitorConfig) -> Vec<ConfigError> {
        self.collect_errors(config)
    }

    fn collect_errors(&self, config: &MonitorConfig) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if config.regions.is_empty() {
            errors.push(ConfigError::NotFound {
                key: "regions".into(),
            });
        }
        for region in &config.regions {
            if region.trim().is_empty() {
                errors.push(ConfigError::invalid("regions", "blank region name"));
            } else if self.strict_regions && !region_regex().is_match(region) {
                errors.push(ConfigError::invalid(
                    "regions",
                    format!("'{}' is not a region code", region),
                ));
            }
        }

        if config.warning_cutoff <= Decimal::ZERO || config.warning_cutoff >= Decimal::ONE {
            errors.push(ConfigError::invalid(
                "warning_cutoff",
                format!("{} not in range (0, 1)", config.warning_cutoff),
            ));
        }

        if !sender_id_regex().is_match(&config.sender_id)
            || !config.sender_id.chars().any(|c| c.is_ascii_alphabetic())
        {
            errors.push(ConfigError::invalid(
                "sender_id",
                format!(
                    "'{}' must be 1-11 alphanumeric characters with at least one letter",
                    config.sender_id
                ),
            ));
        }

        if config.call_timeout_secs == 0 {
            errors.push(ConfigError::invalid("call_timeout_secs", "must be at least 1"));
        }
        if config.concurrency == 0 {
            errors.push(ConfigError::invalid("concurrency", "must be at least 1"));
        }

        match (config.delivery_mode, &config.audience) {
            (DeliveryMode::Direct, Some(Audience::List(recipients))) => {
                if recipients.is_empty() {
                    errors.push(ConfigError::invalid("audience", "no recipients"));
                }
                for recipient in recipients {
                    if !e164_regex().is_match(recipient) {
                        errors.push(ConfigError::invalid(
                            "audience",
                            format!("'{}' is not an E.164 phone number", recipient),
                        ));
                    }
                }
            }
            (DeliveryMode::Topic, Some(Audience::Single(arn))) => {
                if topic_region(arn).is_none() {
                    errors.push(ConfigError::invalid(
                        "audience",
                        format!("cannot extract region metadata from '{}'", arn),
                    ));
                }
            }
            _ => {}
        }

        errors
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
