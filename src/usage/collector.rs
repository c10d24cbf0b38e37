//! Per-region usage collection.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{Instrument, debug, info, warn};

use super::record::{LimitSource, RegionUsageRecord};
use super::window::BillingWindow;
use crate::Result;
use crate::observability::region_span;
use crate::provider::{UsageProvider, bounded};

/// Limit assumed when a region has no monthly spend limit configured.
pub const FALLBACK_ACCOUNT_LIMIT: Decimal = Decimal::ONE;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds one [`RegionUsageRecord`] per region from a [`UsageProvider`].
#[derive(Debug, Clone)]
pub struct RegionCollector {
    provider: Arc<dyn UsageProvider>,
    warning_cutoff: Decimal,
    call_timeout: Duration,
}

impl RegionCollector {
    pub fn new(provider: Arc<dyn UsageProvider>, warning_cutoff: Decimal) -> Self {
        Self {
            provider,
            warning_cutoff,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn warning_cutoff(&self) -> Decimal {
        self.warning_cutoff
    }

    /// Collect usage for a single region. Errors affect only this region.
    pub async fn collect(&self, region: &str, window: &BillingWindow) -> Result<RegionUsageRecord> {
        self.collect_inner(region, window)
            .instrument(region_span(region))
            .await
    }

    async fn collect_inner(&self, region: &str, window: &BillingWindow) -> Result<RegionUsageRecord> {
        let (limit, limit_source) = self.spend_limit(region).await?;

        let mut series = bounded(
            "GetMetricStatistics",
            self.call_timeout,
            self.provider.daily_max_spend(region, window),
        )
        .await?;

        series.sort_by_key(|point| point.timestamp);
        let Some(latest) = series.last() else {
            info!(
                start = %window.start(),
                end = %window.end(),
                "No datapoints in billing window"
            );
            return Ok(RegionUsageRecord::without_data(
                region,
                limit,
                limit_source,
                self.warning_cutoff,
                window,
            ));
        };
        debug!(points = series.len(), latest = %latest.timestamp, "Sorted spend series");

        let record = RegionUsageRecord::evaluate(
            region,
            latest.maximum,
            limit,
            limit_source,
            self.warning_cutoff,
            window,
        );

        let ratio_pct = record.use_ratio() * Decimal::ONE_HUNDRED;
        let cutoff_pct = self.warning_cutoff * Decimal::ONE_HUNDRED;
        if record.is_warning() {
            warn!(
                use_ratio = %format!("{:.2}%", ratio_pct),
                "Spending is over {:.2}% of the account limit",
                cutoff_pct
            );
        } else {
            info!(
                use_ratio = %format!("{:.2}%", ratio_pct),
                "Spending is below {:.2}% of the account limit",
                cutoff_pct
            );
        }

        Ok(record)
    }

    async fn spend_limit(&self, region: &str) -> Result<(Decimal, LimitSource)> {
        let limit = bounded(
            "GetSMSAttributes",
            self.call_timeout,
            self.provider.monthly_spend_limit(region),
        )
        .await?;

        match limit {
            Some(limit) if limit > Decimal::ZERO => Ok((limit, LimitSource::Configured)),
            Some(limit) => {
                warn!(%limit, "Non-positive spending limit, continuing with default value 1");
                Ok((FALLBACK_ACCOUNT_LIMIT, LimitSource::Default))
            }
            None => {
                warn!("No spending limit value is set, continuing with default value 1");
                Ok((FALLBACK_ACCOUNT_LIMIT, LimitSource::Default))
            }
        }
    }
}
