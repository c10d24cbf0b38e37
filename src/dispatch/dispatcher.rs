//! Warning dispatch over direct or topic delivery.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use rust_decimal::Decimal;
use tokio::sync::OnceCell;
use tracing::{Instrument, error, info};

use super::message::{
    format_subject, format_warning_message, select_sending_region, warning_regions,
};
use super::outcome::{DeliveryResult, WarningDispatchOutcome};
use crate::config::{DeliveryTarget, topic_region};
use crate::observability::PublishSpan;
use crate::provider::{AccountIdentity, MessageAttributes, Notifier, bounded};
use crate::usage::{DEFAULT_CALL_TIMEOUT, RegionUsageRecord};
use crate::{Error, Result};

/// Sends at most one warning per invocation to the configured target.
#[derive(Debug)]
pub struct WarningDispatcher {
    notifier: Arc<dyn Notifier>,
    identity: Arc<dyn AccountIdentity>,
    target: Option<DeliveryTarget>,
    attributes: MessageAttributes,
    warning_cutoff: Decimal,
    call_timeout: Duration,
    account_id: OnceCell<String>,
}

impl WarningDispatcher {
    /// `target` is `None` when configuration did not yield a usable delivery target.
    pub fn new(
        notifier: Arc<dyn Notifier>,
        identity: Arc<dyn AccountIdentity>,
        target: Option<DeliveryTarget>,
        sender_id: impl Into<String>,
        warning_cutoff: Decimal,
    ) -> Self {
        Self {
            notifier,
            identity,
            target,
            attributes: MessageAttributes::transactional(sender_id),
            warning_cutoff,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            account_id: OnceCell::new(),
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn target(&self) -> Option<&DeliveryTarget> {
        self.target.as_ref()
    }

    /// Notify about every flagged record.
    ///
    /// Returns an empty outcome when nothing is flagged or no target is configured.
    /// Topic-mode failures and a malformed topic ARN are returned as errors.
    pub async fn dispatch(
        &self,
        records: &[RegionUsageRecord],
        today: NaiveDate,
    ) -> Result<WarningDispatchOutcome> {
        let sending_region = select_sending_region(records);
        let warnings = warning_regions(records);
        info!(
            warnings = ?warnings.iter().map(|r| r.region_name()).collect::<Vec<_>>(),
            "Warning regions selected"
        );

        if warnings.is_empty() {
            return Ok(WarningDispatchOutcome::empty());
        }

        let Some(target) = &self.target else {
            error!("Warning delivery and warning audience type mismatch, no notification sent");
            return Ok(WarningDispatchOutcome::empty());
        };

        let account_id = self.account_id().await?;
        let body = format_warning_message(account_id, self.warning_cutoff, &warnings);

        match target {
            DeliveryTarget::Direct(recipients) => {
                let Some(region) = sending_region else {
                    return Ok(WarningDispatchOutcome::empty());
                };
                Ok(self.send_direct(region, recipients, &body).await)
            }
            DeliveryTarget::Topic(topic_arn) => {
                let subject = format_subject(today);
                self.send_topic(topic_arn, &subject, &body).await
            }
        }
    }

    async fn account_id(&self) -> Result<&str> {
        let id = self
            .account_id
            .get_or_try_init(|| async {
                bounded(
                    "GetCallerIdentity",
                    self.call_timeout,
                    self.identity.account_id(),
                )
                .await
            })
            .await?;
        Ok(id.as_str())
    }

    async fn send_direct(
        &self,
        region: &str,
        recipients: &[String],
        body: &str,
    ) -> WarningDispatchOutcome {
        let sends = recipients.iter().map(|recipient| {
            let span = PublishSpan::new("direct", region, recipient);
            let call = bounded(
                "Publish",
                self.call_timeout,
                self.notifier
                    .send_direct(region, recipient, body, &self.attributes),
            )
            .instrument(span.span().clone());

            async move {
                match call.await {
                    Ok(ack) => {
                        info!(recipient = %recipient, message_id = %ack.message_id, "Message published");
                        span.finish(false);
                        DeliveryResult::delivered(recipient.as_str(), region, ack)
                    }
                    Err(err) => {
                        error!(recipient = %recipient, error = %err, "Message publish failed");
                        span.finish(true);
                        DeliveryResult::failed(recipient.as_str(), region, &err)
                    }
                }
            }
        });

        WarningDispatchOutcome::new(join_all(sends).await)
    }

    async fn send_topic(
        &self,
        topic_arn: &str,
        subject: &str,
        body: &str,
    ) -> Result<WarningDispatchOutcome> {
        let Some(region) = topic_region(topic_arn) else {
            error!(topic = %topic_arn, "Cannot extract region metadata from topic");
            return Err(Error::MalformedAudience(topic_arn.to_string()));
        };

        let span = PublishSpan::new("topic", region, topic_arn);
        let result = bounded(
            "Publish",
            self.call_timeout,
            self.notifier
                .send_topic(region, topic_arn, subject, body, &self.attributes),
        )
        .instrument(span.span().clone())
        .await;

        match result {
            Ok(ack) => {
                info!(topic = %topic_arn, message_id = %ack.message_id, "Message published");
                span.finish(false);
                Ok(WarningDispatchOutcome::new(vec![DeliveryResult::delivered(
                    topic_arn, region, ack,
                )]))
            }
            Err(err) => {
                error!(topic = %topic_arn, error = %err, "Topic publish failed");
                span.finish(true);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderError, PublishAck};
    use crate::usage::{BillingWindow, LimitSource};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Sent {
        region: String,
        target: String,
        subject: Option<String>,
        body: String,
        attributes: MessageAttributes,
    }

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Sent>>,
        failing: Vec<String>,
        topic_error: Option<ProviderError>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_direct(
            &self,
            region: &str,
            recipient: &str,
            body: &str,
            attributes: &MessageAttributes,
        ) -> Result<PublishAck> {
            if self.failing.iter().any(|r| r == recipient) {
                return Err(
                    ProviderError::new("sns", Some(400), "InvalidParameter", "Invalid phone").into(),
                );
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push(Sent {
                region: region.into(),
                target: recipient.into(),
                subject: None,
                body: body.into(),
                attributes: attributes.clone(),
            });
            Ok(PublishAck::new(format!("msg-{}", sent.len())))
        }

        async fn send_topic(
            &self,
            region: &str,
            topic_arn: &str,
            subject: &str,
            body: &str,
            attributes: &MessageAttributes,
        ) -> Result<PublishAck> {
            if let Some(err) = &self.topic_error {
                return Err(err.clone().into());
            }
            self.sent.lock().unwrap().push(Sent {
                region: region.into(),
                target: topic_arn.into(),
                subject: Some(subject.into()),
                body: body.into(),
                attributes: attributes.clone(),
            });
            Ok(PublishAck::new("topic-msg"))
        }
    }

    #[derive(Debug, Default)]
    struct CountingIdentity {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AccountIdentity for CountingIdentity {
        async fn account_id(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("123456789012".into())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn record(region: &str, usage: Decimal) -> RegionUsageRecord {
        RegionUsageRecord::evaluate(
            region,
            usage,
            dec!(1),
            LimitSource::Configured,
            dec!(0.7),
            &BillingWindow::month_to_date(today()),
        )
    }

    fn scenario() -> Vec<RegionUsageRecord> {
        vec![
            record("us-east-1", dec!(0.9)),
            record("eu-west-1", dec!(0.5)),
            record("ap-southeast-2", dec!(0.3)),
        ]
    }

    fn dispatcher(
        notifier: Arc<RecordingNotifier>,
        identity: Arc<CountingIdentity>,
        target: Option<DeliveryTarget>,
    ) -> WarningDispatcher {
        WarningDispatcher::new(notifier, identity, target, "AWSWarning", dec!(0.7))
    }

    fn direct(recipients: &[&str]) -> Option<DeliveryTarget> {
        Some(DeliveryTarget::Direct(
            recipients.iter().map(|s| s.to_string()).collect(),
        ))
    }

    #[tokio::test]
    async fn test_direct_sends_from_lowest_ratio_region() {
        let notifier = Arc::new(RecordingNotifier::default());
        let d = dispatcher(
            notifier.clone(),
            Arc::default(),
            direct(&["+15550100", "+15550101"]),
        );

        let outcome = d.dispatch(&scenario(), today()).await.unwrap();
        assert_eq!(outcome.len(), 2);
        assert_eq!(outcome.delivered_count(), 2);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|s| s.region == "ap-southeast-2"));
        assert!(sent[0].body.contains("us-east-1 (90.00%)"));
        assert!(sent[0].body.contains("123456789012"));
        assert_eq!(sent[0].attributes, MessageAttributes::transactional("AWSWarning"));
    }

    #[tokio::test]
    async fn test_one_failing_recipient_is_isolated() {
        let notifier = Arc::new(RecordingNotifier {
            failing: vec!["+15550101".into()],
            ..Default::default()
        });
        let d = dispatcher(
            notifier.clone(),
            Arc::default(),
            direct(&["+15550100", "+15550101", "+15550102"]),
        );

        let outcome = d.dispatch(&scenario(), today()).await.unwrap();
        assert_eq!(outcome.len(), 3);
        assert_eq!(outcome.failed_count(), 1);
        assert!(!outcome.deliveries()[1].is_delivered());
        assert_eq!(outcome.deliveries()[1].target, "+15550101");
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_no_warnings_sends_nothing() {
        let notifier = Arc::new(RecordingNotifier::default());
        let identity = Arc::new(CountingIdentity::default());
        let d = dispatcher(notifier.clone(), identity.clone(), direct(&["+15550100"]));

        let records = vec![record("us-east-1", dec!(0.1)), record("eu-west-1", dec!(0.69))];
        let outcome = d.dispatch(&records, today()).await.unwrap();

        assert!(outcome.is_empty());
        assert!(notifier.sent().is_empty());
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_target_sends_nothing() {
        let notifier = Arc::new(RecordingNotifier::default());
        let d = dispatcher(notifier.clone(), Arc::default(), None);

        let outcome = d.dispatch(&scenario(), today()).await.unwrap();
        assert!(outcome.is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_topic_uses_arn_region() {
        let notifier = Arc::new(RecordingNotifier::default());
        let arn = "arn:aws:sns:eu-central-1:123456789012:sms-alerts";
        let d = dispatcher(
            notifier.clone(),
            Arc::default(),
            Some(DeliveryTarget::Topic(arn.into())),
        );

        let outcome = d.dispatch(&scenario(), today()).await.unwrap();
        assert_eq!(outcome.len(), 1);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].region, "eu-central-1");
        assert_eq!(sent[0].target, arn);
        assert_eq!(
            sent[0].subject.as_deref(),
            Some("SMS Usage Alarm - Oct. 16, 2026")
        );
    }

    #[tokio::test]
    async fn test_malformed_topic_is_fatal_without_sending() {
        let notifier = Arc::new(RecordingNotifier::default());
        let d = dispatcher(
            notifier.clone(),
            Arc::default(),
            Some(DeliveryTarget::Topic("sms-alerts".into())),
        );

        let err = d.dispatch(&scenario(), today()).await.unwrap_err();
        assert!(matches!(err, Error::MalformedAudience(_)));
        assert!(err.is_configuration_error());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_topic_rejection_is_fatal() {
        let notifier = Arc::new(RecordingNotifier {
            topic_error: Some(ProviderError::new(
                "sns",
                Some(404),
                "NotFound",
                "Topic does not exist",
            )),
            ..Default::default()
        });
        let d = dispatcher(
            notifier,
            Arc::default(),
            Some(DeliveryTarget::Topic(
                "arn:aws:sns:us-east-1:123456789012:gone".into(),
            )),
        );

        let err = d.dispatch(&scenario(), today()).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_account_id_resolved_once() {
        let identity = Arc::new(CountingIdentity::default());
        let d = dispatcher(
            Arc::new(RecordingNotifier::default()),
            identity.clone(),
            direct(&["+15550100"]),
        );

        d.dispatch(&scenario(), today()).await.unwrap();
        d.dispatch(&scenario(), today()).await.unwrap();
        assert_eq!(identity.calls.load(Ordering::SeqCst), 1);
    }
}
