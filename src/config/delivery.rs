//! Delivery mode and audience.
//!
//! Configuration carries a mode and a loosely typed audience. They are resolved once
//! into a [`DeliveryTarget`]; a pair that does not agree resolves to `None`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// One SMS per recipient phone number.
    #[default]
    #[serde(alias = "sms", alias = "SMS")]
    Direct,
    /// One message to a subscriber topic.
    #[serde(alias = "Topic")]
    Topic,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Topic => "topic",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" | "sms" => Ok(Self::Direct),
            "topic" => Ok(Self::Topic),
            other => Err(ConfigError::invalid(
                "delivery_mode",
                format!("expected 'direct' or 'topic', got '{}'", other),
            )),
        }
    }
}

/// Audience as written in configuration: a list of recipients or a single identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    List(Vec<String>),
    Single(String),
}

impl Audience {
    /// Parse an audience from a single setting value.
    ///
    /// A value starting with `arn:` is a single identifier; anything else is a
    /// comma-separated recipient list.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("arn:") {
            Self::Single(value.to_string())
        } else {
            Self::List(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )
        }
    }

    /// Parse an audience for a known delivery mode.
    ///
    /// In topic mode the whole value is one topic identifier, so a malformed identifier
    /// still reaches topic validation instead of turning into a recipient list.
    pub fn parse_for(mode: DeliveryMode, value: &str) -> Self {
        match mode {
            DeliveryMode::Topic => Self::Single(value.trim().to_string()),
            DeliveryMode::Direct => Self::parse(value),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Single(_) => "single",
        }
    }
}

/// Where warning messages go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    Direct(Vec<String>),
    Topic(String),
}

impl DeliveryTarget {
    /// Resolve a mode and audience. Returns `None` when they disagree or the audience is
    /// missing.
    pub fn resolve(mode: DeliveryMode, audience: Option<&Audience>) -> Option<Self> {
        match (mode, audience?) {
            (DeliveryMode::Direct, Audience::List(recipients)) => {
                Some(Self::Direct(recipients.clone()))
            }
            (DeliveryMode::Topic, Audience::Single(arn)) => Some(Self::Topic(arn.clone())),
            _ => None,
        }
    }

    pub fn mode(&self) -> DeliveryMode {
        match self {
            Self::Direct(_) => DeliveryMode::Direct,
            Self::Topic(_) => DeliveryMode::Topic,
        }
    }
}

/// Region segment of a topic ARN (`arn:PARTITION:sns:REGION:ACCOUNT:NAME`).
pub fn topic_region(arn: &str) -> Option<&str> {
    arn.split(':').nth(3).filter(|region| !region.is_empty())
}
