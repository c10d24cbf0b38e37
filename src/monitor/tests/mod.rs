//! End-to-end invocation tests over an in-memory cloud.

mod helpers;

use std::sync::Arc;

use rust_decimal_macros::dec;

use self::helpers::{ACCOUNT_ID, FakeCloud, is_region_auth_error, today};
use super::{InvocationResponse, UsageMonitor};
use crate::config::{Audience, DeliveryMode, MonitorConfig, RegionFailurePolicy};
use crate::usage::RegionUsage;
use crate::{Error, Result};

const TOPIC_ARN: &str = "arn:aws:sns:eu-west-1:123456789012:sms-alerts";

fn monitor(config: MonitorConfig, cloud: &Arc<FakeCloud>) -> UsageMonitor {
    UsageMonitor::builder(config)
        .usage_provider(cloud.clone())
        .notifier(cloud.clone())
        .identity(cloud.clone())
        .build()
        .unwrap()
}

fn three_regions() -> FakeCloud {
    FakeCloud::new()
        .region("A", dec!(1), dec!(0.9))
        .region("B", dec!(1), dec!(0.5))
        .region("C", dec!(1), dec!(0.3))
}

async fn invoke(monitor: &UsageMonitor) -> Result<InvocationResponse> {
    monitor
        .invoke_on(today(), serde_json::json!("Local Test"))
        .await
}

#[tokio::test]
async fn test_all_regions_below_cutoff() {
    let cloud = Arc::new(
        FakeCloud::new()
            .region("us-east-1", dec!(100), dec!(12))
            .region("eu-west-1", dec!(50), dec!(34.99)),
    );
    let config = MonitorConfig::new()
        .regions(["us-east-1", "eu-west-1"])
        .direct(["+15550100"]);

    let response = invoke(&monitor(config, &cloud)).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert!(!response.is_base64_encoded);
    assert_eq!(response.usage_details.len(), 2);
    assert_eq!(response.body, "[]");
    assert!(cloud.published().is_empty());
    assert_eq!(cloud.identity_calls(), 0);
}

#[tokio::test]
async fn test_reference_scenario_direct() {
    let cloud = Arc::new(three_regions());
    let config = MonitorConfig::new()
        .regions(["A", "B", "C"])
        .direct(["+15550100", "+15550101"]);

    let response = invoke(&monitor(config, &cloud)).await.unwrap();

    let names: Vec<&str> = response
        .usage_details
        .iter()
        .map(RegionUsage::region_name)
        .collect();
    assert_eq!(names, ["A", "B", "C"]);

    let published = cloud.published();
    assert_eq!(published.len(), 2);
    for sent in &published {
        assert_eq!(sent.region, "C");
        assert_eq!(sent.sender_id, "AWSWarning");
        assert!(sent.subject.is_none());
        assert_eq!(
            sent.body,
            format!(
                "The monthly SMS usage in your AWS account {} is reaching 70.00% of the limit in the following region(s):\nA (90.00%)\nPlease take appropriate actions.",
                ACCOUNT_ID
            )
        );
    }
    assert_eq!(response.outcome.delivered_count(), 2);

    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["target"], "+15550100");
}

#[tokio::test]
async fn test_topic_delivery() {
    let cloud = Arc::new(three_regions());
    let config = MonitorConfig::new().regions(["A", "B", "C"]).topic(TOPIC_ARN);

    let response = invoke(&monitor(config, &cloud)).await.unwrap();

    let published = cloud.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].region, "eu-west-1");
    assert_eq!(published[0].target, TOPIC_ARN);
    assert_eq!(
        published[0].subject.as_deref(),
        Some("SMS Usage Alarm - Sep. 15, 2026")
    );
    assert_eq!(response.outcome.len(), 1);
}

#[tokio::test]
async fn test_mode_audience_mismatch_sends_nothing() {
    let cloud = Arc::new(three_regions());
    let config = MonitorConfig::new()
        .regions(["A", "B", "C"])
        .delivery(DeliveryMode::Direct, Some(Audience::Single(TOPIC_ARN.into())));

    let response = invoke(&monitor(config, &cloud)).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert!(response.outcome.is_empty());
    assert!(cloud.published().is_empty());
}

#[tokio::test]
async fn test_topic_without_region_from_env_is_fatal() {
    let vars = [
        ("SMS_MONITOR_REGIONS", "A,B,C"),
        ("SMS_MONITOR_DELIVERY", "topic"),
        ("SMS_MONITOR_AUDIENCE", "sms-alerts"),
    ];
    let config = MonitorConfig::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .unwrap();

    let cloud = Arc::new(three_regions());
    let build_err = UsageMonitor::builder(config.clone())
        .usage_provider(cloud.clone())
        .notifier(cloud.clone())
        .identity(cloud.clone())
        .build()
        .unwrap_err();
    assert!(build_err.is_configuration_error());

    let monitor = UsageMonitor::builder(config)
        .usage_provider(cloud.clone())
        .notifier(cloud.clone())
        .identity(cloud.clone())
        .skip_validation()
        .build()
        .unwrap();
    let err = invoke(&monitor).await.unwrap_err();
    assert!(matches!(err, Error::MalformedAudience(ref topic) if topic == "sms-alerts"));
    assert!(cloud.published().is_empty());
}

#[tokio::test]
async fn test_region_failure_isolated() {
    let cloud = Arc::new(three_regions().broken("B"));
    let config = MonitorConfig::new()
        .regions(["A", "B", "C"])
        .direct(["+15550100"]);

    let response = invoke(&monitor(config, &cloud)).await.unwrap();

    assert!(response.usage_details[1].is_failed());
    let details = serde_json::to_value(&response.usage_details).unwrap();
    assert_eq!(details[1]["region_name"], "B");
    assert_eq!(details[1]["error"]["kind"], "authorization");

    let published = cloud.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].region, "C");
}

#[tokio::test]
async fn test_region_failure_aborts() {
    let cloud = Arc::new(three_regions().broken("B"));
    let config = MonitorConfig::new()
        .regions(["A", "B", "C"])
        .direct(["+15550100"])
        .region_failure(RegionFailurePolicy::Abort);

    let err = invoke(&monitor(config, &cloud)).await.unwrap_err();

    assert!(is_region_auth_error(&err, "B"));
    assert!(cloud.published().is_empty());
}

#[tokio::test]
async fn test_account_id_reused_across_invocations() {
    let cloud = Arc::new(three_regions());
    let config = MonitorConfig::new().regions(["A", "B", "C"]).topic(TOPIC_ARN);
    let monitor = monitor(config, &cloud);

    invoke(&monitor).await.unwrap();
    invoke(&monitor).await.unwrap();

    assert_eq!(cloud.published().len(), 2);
    assert_eq!(cloud.identity_calls(), 1);
}

#[test]
fn test_build_requires_collaborators() {
    let err = UsageMonitor::builder(MonitorConfig::new().direct(["+15550100"]))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_build_rejects_invalid_config() {
    let cloud = Arc::new(FakeCloud::new());
    let err = UsageMonitor::builder(MonitorConfig::new().warning_cutoff(dec!(1.5)))
        .usage_provider(cloud.clone())
        .notifier(cloud.clone())
        .identity(cloud)
        .build()
        .unwrap_err();
    assert!(err.is_configuration_error());

    let cloud = Arc::new(FakeCloud::new());
    let monitor = UsageMonitor::builder(MonitorConfig::new().warning_cutoff(dec!(1.5)))
        .usage_provider(cloud.clone())
        .notifier(cloud.clone())
        .identity(cloud)
        .skip_validation()
        .build()
        .unwrap();
    assert_eq!(monitor.regions().len(), 6);
}
