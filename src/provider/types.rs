use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const SENDER_ID_ATTRIBUTE: &str = "AWS.SNS.SMS.SenderID";
pub const SMS_TYPE_ATTRIBUTE: &str = "AWS.SNS.SMS.SMSType";
pub const TRANSACTIONAL: &str = "Transactional";

/// One point of the daily-maximum spend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    pub timestamp: DateTime<Utc>,
    pub maximum: Decimal,
}

impl Datapoint {
    pub fn new(timestamp: DateTime<Utc>, maximum: Decimal) -> Self {
        Self { timestamp, maximum }
    }
}

/// String attributes attached to every outgoing SMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttributes {
    pub sender_id: String,
    pub sms_type: String,
}

impl MessageAttributes {
    pub fn transactional(sender_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            sms_type: TRANSACTIONAL.to_string(),
        }
    }

    /// Attribute name/value pairs in wire order.
    pub fn entries(&self) -> [(&'static str, &str); 2] {
        [
            (SENDER_ID_ATTRIBUTE, self.sender_id.as_str()),
            (SMS_TYPE_ATTRIBUTE, self.sms_type.as_str()),
        ]
    }
}

/// Provider acknowledgment of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishAck {
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl PublishAck {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
