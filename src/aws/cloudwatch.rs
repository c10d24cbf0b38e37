//! CloudWatch `GetMetricStatistics` over the JSON 1.0 protocol.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::provider::Datapoint;
use crate::usage::BillingWindow;
use crate::{Error, Result};

pub const SERVICE: &str = "monitoring";
pub const TARGET: &str = "GraniteServiceVersion20100801.GetMetricStatistics";

const NAMESPACE: &str = "AWS/SNS";
const METRIC_NAME: &str = "SMSMonthToDateSpentUSD";
const PERIOD_SECS: u32 = 86_400;

pub fn metric_statistics_body(window: &BillingWindow) -> serde_json::Value {
    json!({
        "Namespace": NAMESPACE,
        "MetricName": METRIC_NAME,
        "StartTime": window.start().timestamp(),
        "EndTime": window.end().timestamp(),
        "Period": PERIOD_SECS,
        "Statistics": ["Maximum"],
        "Unit": "Count",
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MetricStatisticsResponse {
    #[serde(default)]
    datapoints: Vec<WireDatapoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireDatapoint {
    timestamp: WireTimestamp,
    #[serde(with = "rust_decimal::serde::float")]
    maximum: Decimal,
}

/// Epoch seconds, or RFC 3339 from endpoints that answer in that form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Epoch(f64),
    Text(DateTime<Utc>),
}

impl WireTimestamp {
    fn to_utc(&self) -> Result<DateTime<Utc>> {
        match self {
            Self::Epoch(secs) => {
                let millis = (secs * 1000.0).round() as i64;
                DateTime::from_timestamp_millis(millis)
                    .ok_or_else(|| Error::Parse(format!("timestamp out of range: {}", secs)))
            }
            Self::Text(ts) => Ok(*ts),
        }
    }
}

/// Datapoints in response order; the collector sorts them.
pub fn parse_datapoints(response: serde_json::Value) -> Result<Vec<Datapoint>> {
    if response.is_null() {
        return Ok(Vec::new());
    }
    let parsed: MetricStatisticsResponse =
        serde_json::from_value(response).map_err(|e| Error::Parse(e.to_string()))?;
    parsed
        .datapoints
        .iter()
        .map(|dp| Ok(Datapoint::new(dp.timestamp.to_utc()?, dp.maximum)))
        .collect()
}
