//! Per-region usage records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::window::BillingWindow;
use crate::Error;

/// Decimal places kept in a use ratio.
pub const RATIO_SCALE: u32 = 3;

/// Where a record's account limit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitSource {
    /// The provider reported an explicit monthly limit.
    Configured,
    /// No limit was set; the fallback value of 1 is in effect.
    Default,
}

/// Spend against limit for one region, evaluated against a warning cutoff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionUsageRecord {
    region_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    latest_usage_in_usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    account_limit: Decimal,
    limit_source: LimitSource,
    #[serde(with = "rust_decimal::serde::float")]
    use_ratio: Decimal,
    is_warning: bool,
    #[serde(with = "rust_decimal::serde::float")]
    warning_cutoff: Decimal,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl RegionUsageRecord {
    /// Evaluate the latest spend against a limit. `account_limit` must be positive.
    pub fn evaluate(
        region_name: impl Into<String>,
        latest_usage_in_usd: Decimal,
        account_limit: Decimal,
        limit_source: LimitSource,
        warning_cutoff: Decimal,
        window: &BillingWindow,
    ) -> Self {
        let use_ratio = use_ratio(latest_usage_in_usd, account_limit);
        Self {
            region_name: region_name.into(),
            latest_usage_in_usd,
            account_limit,
            limit_source,
            use_ratio,
            is_warning: use_ratio >= warning_cutoff,
            warning_cutoff,
            start_time: window.start(),
            end_time: window.end(),
        }
    }

    /// Record for a region with no spend data yet in the window.
    pub fn without_data(
        region_name: impl Into<String>,
        account_limit: Decimal,
        limit_source: LimitSource,
        warning_cutoff: Decimal,
        window: &BillingWindow,
    ) -> Self {
        Self {
            region_name: region_name.into(),
            latest_usage_in_usd: Decimal::ZERO,
            account_limit,
            limit_source,
            use_ratio: Decimal::ZERO,
            is_warning: false,
            warning_cutoff,
            start_time: window.start(),
            end_time: window.end(),
        }
    }

    pub fn region_name(&self) -> &str {
        &self.region_name
    }

    pub fn latest_usage_in_usd(&self) -> Decimal {
        self.latest_usage_in_usd
    }

    pub fn account_limit(&self) -> Decimal {
        self.account_limit
    }

    pub fn limit_source(&self) -> LimitSource {
        self.limit_source
    }

    pub fn use_ratio(&self) -> Decimal {
        self.use_ratio
    }

    pub fn is_warning(&self) -> bool {
        self.is_warning
    }

    pub fn warning_cutoff(&self) -> Decimal {
        self.warning_cutoff
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }
}

/// `usage / limit` rounded half-to-even to [`RATIO_SCALE`] places; zero for a zero limit.
pub fn use_ratio(usage: Decimal, limit: Decimal) -> Decimal {
    usage
        .checked_div(limit)
        .map(|ratio| ratio.round_dp(RATIO_SCALE))
        .unwrap_or(Decimal::ZERO)
}

/// Error kind and message, as carried in serialized results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    pub kind: String,
    pub message: String,
}

impl From<&Error> for ErrorDescriptor {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// A region whose usage could not be collected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionFailure {
    pub region_name: String,
    pub error: ErrorDescriptor,
}

impl RegionFailure {
    pub fn new(region_name: impl Into<String>, err: &Error) -> Self {
        Self {
            region_name: region_name.into(),
            error: err.into(),
        }
    }
}

/// Collection result for one region, in configured region order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RegionUsage {
    Collected(RegionUsageRecord),
    Failed(RegionFailure),
}

impl RegionUsage {
    pub fn region_name(&self) -> &str {
        match self {
            Self::Collected(record) => record.region_name(),
            Self::Failed(failure) => &failure.region_name,
        }
    }

    pub fn record(&self) -> Option<&RegionUsageRecord> {
        match self {
            Self::Collected(record) => Some(record),
            Self::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
