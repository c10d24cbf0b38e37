//! Region selection and warning text.
//!
//! Everything here is a pure function of the collected records.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::usage::RegionUsageRecord;

/// Records ordered by use ratio, lowest first. Equal ratios keep input order.
pub fn sort_by_use_ratio(records: &[RegionUsageRecord]) -> Vec<&RegionUsageRecord> {
    let mut sorted: Vec<&RegionUsageRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.use_ratio().cmp(&b.use_ratio()));
    sorted
}

/// Region with the most spending headroom, used to send direct messages.
pub fn select_sending_region(records: &[RegionUsageRecord]) -> Option<&str> {
    sort_by_use_ratio(records)
        .first()
        .copied()
        .map(RegionUsageRecord::region_name)
}

/// Flagged records in ascending use-ratio order.
pub fn warning_regions(records: &[RegionUsageRecord]) -> Vec<&RegionUsageRecord> {
    sort_by_use_ratio(records)
        .into_iter()
        .filter(|record| record.is_warning())
        .collect()
}

/// Fraction as a percentage rounded half away from zero to two places.
pub fn percent(fraction: Decimal) -> Decimal {
    (fraction * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `region (NN.NN%)` entries joined by `", "`.
pub fn format_region_list(warnings: &[&RegionUsageRecord]) -> String {
    warnings
        .iter()
        .map(|record| {
            format!(
                "{} ({:.2}%)",
                record.region_name(),
                percent(record.use_ratio())
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_warning_message(
    account_id: &str,
    warning_cutoff: Decimal,
    warnings: &[&RegionUsageRecord],
) -> String {
    format!(
        "The monthly SMS usage in your AWS account {} is reaching {:.2}% of the limit in the following region(s):\n{}\nPlease take appropriate actions.",
        account_id,
        percent(warning_cutoff),
        format_region_list(warnings)
    )
}

/// Subject line for topic messages, e.g. `SMS Usage Alarm - Oct. 16, 2026`.
pub fn format_subject(today: NaiveDate) -> String {
    format!("SMS Usage Alarm - {}", today.format("%b. %d, %Y"))
}
