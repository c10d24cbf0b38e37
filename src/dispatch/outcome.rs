//! Delivery results.

use serde::Serialize;

use crate::Error;
use crate::provider::PublishAck;
use crate::usage::ErrorDescriptor;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered(PublishAck),
    Failed(ErrorDescriptor),
}

/// Result of one send: a recipient in direct mode, the topic in topic mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryResult {
    pub target: String,
    pub region: String,
    pub result: DeliveryStatus,
}

impl DeliveryResult {
    pub fn delivered(target: impl Into<String>, region: impl Into<String>, ack: PublishAck) -> Self {
        Self {
            target: target.into(),
            region: region.into(),
            result: DeliveryStatus::Delivered(ack),
        }
    }

    pub fn failed(target: impl Into<String>, region: impl Into<String>, err: &Error) -> Self {
        Self {
            target: target.into(),
            region: region.into(),
            result: DeliveryStatus::Failed(err.into()),
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self.result, DeliveryStatus::Delivered(_))
    }
}

/// Ordered delivery results of one dispatch. Empty when nothing was sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WarningDispatchOutcome {
    deliveries: Vec<DeliveryResult>,
}

impl WarningDispatchOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(deliveries: Vec<DeliveryResult>) -> Self {
        Self { deliveries }
    }

    pub fn deliveries(&self) -> &[DeliveryResult] {
        &self.deliveries
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn delivered_count(&self) -> usize {
        self.deliveries.iter().filter(|d| d.is_delivered()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.len() - self.delivered_count()
    }
}
