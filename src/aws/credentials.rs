//! Cached AWS credentials.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_credential_types::provider::ProvideCredentials;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{Error, Result};

/// Credentials are refreshed this long before their reported expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct CachedAwsCredentials {
    pub access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<SecretString>,
    expiry: Option<SystemTime>,
}

impl fmt::Debug for CachedAwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedAwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[redacted]")
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl CachedAwsCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
        expiry: Option<SystemTime>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            session_token: session_token.map(SecretString::from),
            expiry,
        }
    }

    fn from_provided(creds: &Credentials) -> Self {
        Self::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            creds.session_token().map(str::to_string),
            creds.expiry(),
        )
    }

    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_ref().map(|s| s.expose_secret())
    }

    pub fn expiry(&self) -> Option<SystemTime> {
        self.expiry
    }

    pub fn is_expired(&self) -> bool {
        self.expiry
            .map(|exp| SystemTime::now() + REFRESH_MARGIN >= exp)
            .unwrap_or(false)
    }

    /// Credentials in the form the signer expects.
    pub fn to_sdk(&self) -> Credentials {
        Credentials::new(
            &self.access_key_id,
            self.secret_access_key(),
            self.session_token().map(str::to_string),
            self.expiry,
            "sms-spend-monitor",
        )
    }
}

/// Credential provider with a shared read-mostly cache.
pub struct AwsCredentials {
    provider: Arc<dyn ProvideCredentials>,
    cache: RwLock<Option<CachedAwsCredentials>>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials").finish_non_exhaustive()
    }
}

impl AwsCredentials {
    pub fn new(provider: Arc<dyn ProvideCredentials>) -> Self {
        Self {
            provider,
            cache: RwLock::new(None),
        }
    }

    /// Default chain: environment, profile, container and instance metadata.
    pub async fn from_default_chain() -> Result<Self> {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let provider = config
            .credentials_provider()
            .ok_or_else(|| Error::auth("No AWS credentials found"))?;
        Ok(Self::new(Arc::new(provider)))
    }

    pub fn from_static(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        let creds = Credentials::from_keys(access_key_id, secret_access_key, session_token);
        Self::new(Arc::new(creds))
    }

    pub async fn get(&self) -> Result<CachedAwsCredentials> {
        {
            let cache = self.cache.read().await;
            if let Some(ref creds) = *cache
                && !creds.is_expired()
            {
                return Ok(creds.clone());
            }
        }

        let creds = self
            .provider
            .provide_credentials()
            .await
            .map_err(|e| Error::auth(e.to_string()))?;
        let cached = CachedAwsCredentials::from_provided(&creds);
        debug!(expiry = ?cached.expiry(), "AWS credentials refreshed");

        *self.cache.write().await = Some(cached.clone());
        Ok(cached)
    }
}
