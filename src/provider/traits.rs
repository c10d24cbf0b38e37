//! Provider trait definitions.

use std::fmt::Debug;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::types::{Datapoint, MessageAttributes, PublishAck};
use crate::Result;
use crate::usage::BillingWindow;

/// Source of per-region spend limits and spend time series.
#[async_trait]
pub trait UsageProvider: Send + Sync + Debug {
    /// Monthly SMS spend limit for a region, or `None` when no limit attribute is set.
    async fn monthly_spend_limit(&self, region: &str) -> Result<Option<Decimal>>;

    /// Daily maximum of month-to-date spend over the window. May be empty or unsorted.
    async fn daily_max_spend(&self, region: &str, window: &BillingWindow)
    -> Result<Vec<Datapoint>>;
}

/// Delivery channel for warning messages.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    async fn send_direct(
        &self,
        region: &str,
        recipient: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<PublishAck>;

    async fn send_topic(
        &self,
        region: &str,
        topic_arn: &str,
        subject: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<PublishAck>;
}

/// Resolves the account the monitor runs under. Used only for message text.
#[async_trait]
pub trait AccountIdentity: Send + Sync + Debug {
    async fn account_id(&self) -> Result<String>;
}
