//! AWS implementation of the provider contracts.
//!
//! Spend limits and publishing go to SNS, the spend series comes from CloudWatch, and the
//! account id from STS. Every request is SigV4-signed for the region it targets. One
//! [`AwsProvider`] serves all three collaborator roles.

mod cloudwatch;
mod credentials;
mod executor;
mod signer;
mod sns;
mod sts;

pub use credentials::{AwsCredentials, CachedAwsCredentials};
pub use executor::parse_error;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;
use rust_decimal::Decimal;
use tracing::debug;

use self::executor::{JSON_10_CONTENT_TYPE, QUERY_CONTENT_TYPE, RequestExecutor, ServiceCall};
use self::sns::PublishTarget;
use crate::Result;
use crate::config::{DEFAULT_HOME_REGION, MonitorConfig};
use crate::provider::{
    AccountIdentity, Datapoint, MessageAttributes, Notifier, PublishAck, UsageProvider,
};
use crate::usage::BillingWindow;

/// SigV4-signed client for SNS, CloudWatch and STS.
#[derive(Debug)]
pub struct AwsProvider {
    http: reqwest::Client,
    credentials: AwsCredentials,
    endpoint_url: Option<String>,
    home_region: String,
}

impl AwsProvider {
    pub fn builder() -> AwsProviderBuilder {
        AwsProviderBuilder::default()
    }

    /// Provider using the default credential chain, the configured home region and
    /// the optional endpoint override.
    pub async fn from_config(config: &MonitorConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .home_region(&config.home_region)
            .request_timeout(config.call_timeout_duration());
        if let Some(ref url) = config.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        builder.build().await
    }

    pub fn home_region(&self) -> &str {
        &self.home_region
    }

    fn endpoint(&self, service: &str, region: &str) -> String {
        match &self.endpoint_url {
            Some(url) => url.clone(),
            None => format!("https://{}.{}.amazonaws.com/", service, region),
        }
    }

    async fn query(
        &self,
        service: &'static str,
        region: &str,
        form: String,
    ) -> Result<serde_json::Value> {
        let url = self.endpoint(service, region);
        RequestExecutor::send(
            &self.http,
            &self.credentials,
            ServiceCall {
                service,
                region,
                url: &url,
                content_type: QUERY_CONTENT_TYPE,
                target: None,
                body: form.into_bytes(),
            },
        )
        .await
    }

    async fn publish(
        &self,
        region: &str,
        target: PublishTarget<'_>,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<PublishAck> {
        let form = sns::publish_form(target, body, attributes);
        let response = self.query(sns::SERVICE, region, form).await?;
        sns::parse_publish(&response)
    }
}

#[async_trait]
impl UsageProvider for AwsProvider {
    async fn monthly_spend_limit(&self, region: &str) -> Result<Option<Decimal>> {
        let response = self
            .query(sns::SERVICE, region, sns::sms_attributes_form())
            .await?;
        sns::parse_spend_limit(&response)
    }

    async fn daily_max_spend(
        &self,
        region: &str,
        window: &BillingWindow,
    ) -> Result<Vec<Datapoint>> {
        let url = self.endpoint(cloudwatch::SERVICE, region);
        let body = serde_json::to_vec(&cloudwatch::metric_statistics_body(window))?;
        let response = RequestExecutor::send(
            &self.http,
            &self.credentials,
            ServiceCall {
                service: cloudwatch::SERVICE,
                region,
                url: &url,
                content_type: JSON_10_CONTENT_TYPE,
                target: Some(cloudwatch::TARGET),
                body,
            },
        )
        .await?;
        let points = cloudwatch::parse_datapoints(response)?;
        debug!(region = %region, datapoints = points.len(), "Spend series fetched");
        Ok(points)
    }
}

#[async_trait]
impl Notifier for AwsProvider {
    async fn send_direct(
        &self,
        region: &str,
        recipient: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<PublishAck> {
        self.publish(region, PublishTarget::Phone(recipient), body, attributes)
            .await
    }

    async fn send_topic(
        &self,
        region: &str,
        topic_arn: &str,
        subject: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<PublishAck> {
        self.publish(
            region,
            PublishTarget::Topic {
                arn: topic_arn,
                subject,
            },
            body,
            attributes,
        )
        .await
    }
}

#[async_trait]
impl AccountIdentity for AwsProvider {
    async fn account_id(&self) -> Result<String> {
        let response = self
            .query(sts::SERVICE, &self.home_region, sts::caller_identity_form())
            .await?;
        sts::parse_account_id(&response)
    }
}

#[derive(Default)]
pub struct AwsProviderBuilder {
    credentials: Option<AwsCredentials>,
    endpoint_url: Option<String>,
    home_region: Option<String>,
    request_timeout: Option<Duration>,
    http: Option<reqwest::Client>,
}

impl AwsProviderBuilder {
    /// Fixed access keys instead of the default credential chain.
    pub fn static_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        self.credentials = Some(AwsCredentials::from_static(
            access_key_id,
            secret_access_key,
            session_token,
        ));
        self
    }

    pub fn credentials_provider(mut self, provider: Arc<dyn ProvideCredentials>) -> Self {
        self.credentials = Some(AwsCredentials::new(provider));
        self
    }

    /// Send every request to `url` instead of the regional service endpoint.
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Region used for account identity lookups.
    pub fn home_region(mut self, region: impl Into<String>) -> Self {
        self.home_region = Some(region.into());
        self
    }

    /// Transport-level timeout; calls are additionally bounded by the monitor.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub async fn build(self) -> Result<AwsProvider> {
        let credentials = match self.credentials {
            Some(credentials) => credentials,
            None => AwsCredentials::from_default_chain().await?,
        };

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.request_timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(AwsProvider {
            http,
            credentials,
            endpoint_url: self.endpoint_url,
            home_region: self
                .home_region
                .unwrap_or_else(|| DEFAULT_HOME_REGION.to_string()),
        })
    }
}
