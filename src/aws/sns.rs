//! SNS query-protocol requests: `GetSMSAttributes` and `Publish`.

use std::str::FromStr;

use rust_decimal::Decimal;
use url::form_urlencoded::Serializer;

use crate::provider::{MessageAttributes, PublishAck};
use crate::{Error, Result};

pub const SERVICE: &str = "sns";
const API_VERSION: &str = "2010-03-31";
pub const MONTHLY_SPEND_LIMIT: &str = "MonthlySpendLimit";

/// Destination of one `Publish` call.
#[derive(Debug, Clone, Copy)]
pub enum PublishTarget<'a> {
    Phone(&'a str),
    Topic { arn: &'a str, subject: &'a str },
}

pub fn sms_attributes_form() -> String {
    Serializer::new(String::new())
        .append_pair("Action", "GetSMSAttributes")
        .append_pair("Version", API_VERSION)
        .append_pair("attributes.member.1", MONTHLY_SPEND_LIMIT)
        .finish()
}

pub fn publish_form(target: PublishTarget<'_>, body: &str, attributes: &MessageAttributes) -> String {
    let mut form = Serializer::new(String::new());
    form.append_pair("Action", "Publish")
        .append_pair("Version", API_VERSION)
        .append_pair("Message", body);

    match target {
        PublishTarget::Phone(number) => {
            form.append_pair("PhoneNumber", number);
        }
        PublishTarget::Topic { arn, subject } => {
            form.append_pair("TopicArn", arn).append_pair("Subject", subject);
        }
    }

    for (i, (name, value)) in attributes.entries().iter().enumerate() {
        let prefix = format!("MessageAttributes.entry.{}", i + 1);
        form.append_pair(&format!("{}.Name", prefix), name)
            .append_pair(&format!("{}.Value.DataType", prefix), "String")
            .append_pair(&format!("{}.Value.StringValue", prefix), value);
    }

    form.finish()
}

/// The configured monthly limit, `None` when the account has none set.
pub fn parse_spend_limit(response: &serde_json::Value) -> Result<Option<Decimal>> {
    let Some(attributes) =
        response.pointer("/GetSMSAttributesResponse/GetSMSAttributesResult/attributes")
    else {
        return Ok(None);
    };

    let raw = match attributes {
        serde_json::Value::Object(map) => match map.get("entry") {
            Some(entries) => entry_value(entries),
            None => map.get(MONTHLY_SPEND_LIMIT).and_then(|v| v.as_str()),
        },
        entries @ serde_json::Value::Array(_) => entry_value(entries),
        _ => None,
    };

    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Decimal::from_str(value).map(Some).map_err(|e| {
            Error::Parse(format!("{} '{}': {}", MONTHLY_SPEND_LIMIT, value, e))
        }),
    }
}

fn entry_value(entries: &serde_json::Value) -> Option<&str> {
    entries.as_array()?.iter().find_map(|entry| {
        (entry.get("key")?.as_str()? == MONTHLY_SPEND_LIMIT)
            .then(|| entry.get("value")?.as_str())
            .flatten()
    })
}

pub fn parse_publish(response: &serde_json::Value) -> Result<PublishAck> {
    let message_id = response
        .pointer("/PublishResponse/PublishResult/MessageId")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Parse("Publish response has no MessageId".into()))?;

    let ack = PublishAck::new(message_id);
    Ok(
        match response
            .pointer("/PublishResponse/ResponseMetadata/RequestId")
            .and_then(|v| v.as_str())
        {
            Some(request_id) => ack.with_request_id(request_id),
            None => ack,
        },
    )
}
