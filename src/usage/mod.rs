//! Per-region SMS spend collection and aggregation.

mod aggregator;
mod collector;
mod record;
mod window;

pub use aggregator::{DEFAULT_CONCURRENCY, UsageAggregator};
pub use collector::{DEFAULT_CALL_TIMEOUT, FALLBACK_ACCOUNT_LIMIT, RegionCollector};
pub use record::{
    ErrorDescriptor, LimitSource, RATIO_SCALE, RegionFailure, RegionUsage, RegionUsageRecord,
    use_ratio,
};
pub use window::BillingWindow;
