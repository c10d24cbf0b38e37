//! Invocation boundary: collect, aggregate, dispatch.

mod response;
#[cfg(test)]
mod tests;

pub use response::{InvocationResponse, STATUS_OK};

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{Instrument, debug, info};

use crate::config::{ConfigValidator, MonitorConfig};
use crate::dispatch::WarningDispatcher;
use crate::observability::invocation_span;
use crate::provider::{AccountIdentity, Notifier, UsageProvider};
use crate::usage::{BillingWindow, RegionCollector, RegionUsageRecord, UsageAggregator};
use crate::{Error, Result};

/// One configured monitor. Each [`invoke`](Self::invoke) is independent; only the
/// resolved account id is reused.
#[derive(Debug)]
pub struct UsageMonitor {
    regions: Vec<String>,
    aggregator: UsageAggregator,
    dispatcher: WarningDispatcher,
}

impl UsageMonitor {
    pub fn builder(config: MonitorConfig) -> UsageMonitorBuilder {
        UsageMonitorBuilder::new(config)
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Run for the current UTC date. The event payload is logged and otherwise ignored.
    pub async fn invoke(&self, event: serde_json::Value) -> Result<InvocationResponse> {
        self.invoke_on(Utc::now().date_naive(), event).await
    }

    /// Run for the billing window ending on `today`.
    pub async fn invoke_on(
        &self,
        today: NaiveDate,
        event: serde_json::Value,
    ) -> Result<InvocationResponse> {
        let span = invocation_span(&today);
        async {
            info!(%event, "Event received");
            let window = BillingWindow::month_to_date(today);

            let usage = self.aggregator.collect_all(&self.regions, &window).await?;
            let details = serde_json::to_string(&usage)?;
            debug!(usage_details = %details, "Usage details");

            let records: Vec<RegionUsageRecord> =
                usage.iter().filter_map(|u| u.record()).cloned().collect();
            let warnings = records.iter().filter(|r| r.is_warning()).count();
            tracing::Span::current().record("regions", usage.len());
            tracing::Span::current().record("warnings", warnings);

            let outcome = self.dispatcher.dispatch(&records, window.today()).await?;
            InvocationResponse::ok(usage, outcome)
        }
        .instrument(span)
        .await
    }
}

pub struct UsageMonitorBuilder {
    config: MonitorConfig,
    usage: Option<Arc<dyn UsageProvider>>,
    notifier: Option<Arc<dyn Notifier>>,
    identity: Option<Arc<dyn AccountIdentity>>,
    call_timeout: Option<Duration>,
    validate: bool,
}

impl UsageMonitorBuilder {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            usage: None,
            notifier: None,
            identity: None,
            call_timeout: None,
            validate: true,
        }
    }

    pub fn usage_provider(mut self, provider: Arc<dyn UsageProvider>) -> Self {
        self.usage = Some(provider);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn AccountIdentity>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Override the configured per-call timeout with sub-second precision.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Build without validating the configuration first.
    pub fn skip_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    pub fn build(self) -> Result<UsageMonitor> {
        if self.validate {
            ConfigValidator::new()
                .lenient_regions()
                .validate(&self.config)?;
        }

        let usage = self
            .usage
            .ok_or_else(|| Error::Config("usage provider is required".into()))?;
        let notifier = self
            .notifier
            .ok_or_else(|| Error::Config("notifier is required".into()))?;
        let identity = self
            .identity
            .ok_or_else(|| Error::Config("account identity is required".into()))?;

        let config = self.config;
        let call_timeout = self
            .call_timeout
            .unwrap_or_else(|| config.call_timeout_duration());

        let collector =
            RegionCollector::new(usage, config.warning_cutoff).with_call_timeout(call_timeout);
        let aggregator = UsageAggregator::new(collector)
            .with_concurrency(config.concurrency)
            .with_failure_policy(config.region_failure);
        let dispatcher = WarningDispatcher::new(
            notifier,
            identity,
            config.delivery_target(),
            config.sender_id.clone(),
            config.warning_cutoff,
        )
        .with_call_timeout(call_timeout);

        Ok(UsageMonitor {
            regions: config.regions,
            aggregator,
            dispatcher,
        })
    }
}
