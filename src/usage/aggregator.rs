//! Fan-out over regions with ordered fan-in.

use futures::StreamExt;
use futures::stream;
use tracing::{error, info};

use super::collector::RegionCollector;
use super::record::{RegionFailure, RegionUsage};
use super::window::BillingWindow;
use crate::config::RegionFailurePolicy;
use crate::{Error, Result};

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct UsageAggregator {
    collector: RegionCollector,
    concurrency: usize,
    policy: RegionFailurePolicy,
}

impl UsageAggregator {
    pub fn new(collector: RegionCollector) -> Self {
        Self {
            collector,
            concurrency: DEFAULT_CONCURRENCY,
            policy: RegionFailurePolicy::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_failure_policy(mut self, policy: RegionFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Collect every region, at most `concurrency` at a time, returning results in the
    /// order of `regions`.
    ///
    /// Under [`RegionFailurePolicy::Abort`] the first failing region (in input order)
    /// fails the whole call.
    pub async fn collect_all(
        &self,
        regions: &[String],
        window: &BillingWindow,
    ) -> Result<Vec<RegionUsage>> {
        let results: Vec<(&String, Result<_>)> = stream::iter(regions)
            .map(|region| async move { (region, self.collector.collect(region, window).await) })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut usage = Vec::with_capacity(results.len());
        for (region, result) in results {
            match result {
                Ok(record) => usage.push(RegionUsage::Collected(record)),
                Err(err) => match self.policy {
                    RegionFailurePolicy::Abort => {
                        return Err(Error::Region {
                            region: region.clone(),
                            source: Box::new(err),
                        });
                    }
                    RegionFailurePolicy::Isolate => {
                        error!(region = %region, error = %err, "Usage collection failed");
                        usage.push(RegionUsage::Failed(RegionFailure::new(region, &err)));
                    }
                },
            }
        }

        info!(
            regions = usage.len(),
            failed = usage.iter().filter(|u| u.is_failed()).count(),
            "Usage collected"
        );
        Ok(usage)
    }
}
