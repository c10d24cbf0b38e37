//! In-memory cloud for monitor tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::provider::{
    AccountIdentity, Datapoint, MessageAttributes, Notifier, ProviderError, PublishAck,
    UsageProvider,
};
use crate::usage::BillingWindow;
use crate::{Error, ErrorCategory, Result};

pub const ACCOUNT_ID: &str = "123456789012";

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub region: String,
    pub target: String,
    pub subject: Option<String>,
    pub body: String,
    pub sender_id: String,
}

#[derive(Debug, Default)]
pub struct FakeCloud {
    limits: HashMap<String, Decimal>,
    spend: HashMap<String, Vec<Datapoint>>,
    broken_regions: HashSet<String>,
    published: Mutex<Vec<Published>>,
    identity_calls: AtomicUsize,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Region with a configured limit and a single month-to-date value.
    pub fn region(mut self, region: &str, limit: Decimal, spend: Decimal) -> Self {
        self.limits.insert(region.to_string(), limit);
        self.spend.insert(
            region.to_string(),
            vec![Datapoint::new(
                Utc.with_ymd_and_hms(2026, 9, 14, 0, 0, 0).unwrap(),
                spend,
            )],
        );
        self
    }

    /// Region whose metric calls fail with an authorization error.
    pub fn broken(mut self, region: &str) -> Self {
        self.broken_regions.insert(region.to_string());
        self
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    pub fn identity_calls(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst)
    }

    fn check_region(&self, region: &str) -> Result<()> {
        if self.broken_regions.contains(region) {
            return Err(ProviderError::new(
                "monitoring",
                Some(403),
                "AccessDenied",
                format!("not authorized in {region}"),
            )
            .into());
        }
        Ok(())
    }

    fn record(&self, publish: Published) -> PublishAck {
        let mut published = self.published.lock().unwrap();
        published.push(publish);
        PublishAck::new(format!("msg-{}", published.len()))
    }
}

#[async_trait]
impl UsageProvider for FakeCloud {
    async fn monthly_spend_limit(&self, region: &str) -> Result<Option<Decimal>> {
        self.check_region(region)?;
        Ok(self.limits.get(region).copied())
    }

    async fn daily_max_spend(
        &self,
        region: &str,
        _window: &BillingWindow,
    ) -> Result<Vec<Datapoint>> {
        self.check_region(region)?;
        Ok(self.spend.get(region).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl Notifier for FakeCloud {
    async fn send_direct(
        &self,
        region: &str,
        recipient: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<PublishAck> {
        Ok(self.record(Published {
            region: region.to_string(),
            target: recipient.to_string(),
            subject: None,
            body: body.to_string(),
            sender_id: attributes.sender_id.clone(),
        }))
    }

    async fn send_topic(
        &self,
        region: &str,
        topic_arn: &str,
        subject: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<PublishAck> {
        Ok(self.record(Published {
            region: region.to_string(),
            target: topic_arn.to_string(),
            subject: Some(subject.to_string()),
            body: body.to_string(),
            sender_id: attributes.sender_id.clone(),
        }))
    }
}

#[async_trait]
impl AccountIdentity for FakeCloud {
    async fn account_id(&self) -> Result<String> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ACCOUNT_ID.to_string())
    }
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 15).unwrap()
}

pub fn is_region_auth_error(err: &Error, expected_region: &str) -> bool {
    matches!(err, Error::Region { region, .. } if region == expected_region)
        && err.category() == ErrorCategory::Authorization
}
