//! Collaborator contracts for spend data and notification delivery.
//!
//! The monitor never talks to a cloud API directly. It reads limits and spend series
//! through [`UsageProvider`], delivers warnings through [`Notifier`], and names the
//! account through [`AccountIdentity`].

mod error;
mod traits;
mod types;

pub use error::{ProviderError, ProviderErrorKind};
pub use traits::{AccountIdentity, Notifier, UsageProvider};
pub use types::{
    Datapoint, MessageAttributes, PublishAck, SENDER_ID_ATTRIBUTE, SMS_TYPE_ATTRIBUTE,
    TRANSACTIONAL,
};

use std::future::Future;
use std::time::Duration;

use crate::{Error, Result};

/// Run one provider call under a timeout, mapping expiry to [`Error::Timeout`].
pub(crate) async fn bounded<T, F>(operation: &'static str, duration: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            operation,
            duration,
        }),
    }
}
