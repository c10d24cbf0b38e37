//! Provider error types.

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a provider-side failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    InvalidParameter,
    NotFound,
    Throttling,
    Authorization,
    Client,
    Server,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "invalid_parameter",
            Self::NotFound => "not_found",
            Self::Throttling => "throttling",
            Self::Authorization => "authorization",
            Self::Client => "client",
            Self::Server => "server",
        }
    }

    /// Classify an error code and HTTP status returned by a provider.
    pub fn classify(code: &str, status: Option<u16>) -> Self {
        let code = code.strip_suffix("Exception").unwrap_or(code);
        match code {
            "InvalidParameter"
            | "InvalidParameterValue"
            | "InvalidParameterCombination"
            | "MissingParameter"
            | "MissingRequiredParameter"
            | "ValidationError"
            | "Validation" => Self::InvalidParameter,
            "NotFound" | "ResourceNotFound" | "TopicNotFound" => Self::NotFound,
            "Throttling" | "Throttled" | "RequestLimitExceeded" | "ThrottledRequest" => {
                Self::Throttling
            }
            "AuthorizationError"
            | "AccessDenied"
            | "InvalidClientTokenId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken"
            | "UnrecognizedClient"
            | "MissingAuthenticationToken" => Self::Authorization,
            "InternalFailure" | "InternalError" | "ServiceUnavailable" => Self::Server,
            _ => match status {
                Some(401 | 403) => Self::Authorization,
                Some(404) => Self::NotFound,
                Some(429) => Self::Throttling,
                Some(500..=599) => Self::Server,
                _ => Self::Client,
            },
        }
    }
}

/// An error response from a cloud provider API.
#[derive(Debug, Clone, Error)]
#[error("{service} error ({}) {code}: {message}", status.map(|s| format!("HTTP {}", s)).unwrap_or_else(|| "no status".into()))]
pub struct ProviderError {
    service: String,
    status: Option<u16>,
    code: String,
    message: String,
    kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(
        service: impl Into<String>,
        status: Option<u16>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let code = code.into();
        let kind = ProviderErrorKind::classify(&code, status);
        Self {
            service: service.into(),
            status,
            code,
            message: message.into(),
            kind,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> ProviderErrorKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_code() {
        assert_eq!(
            ProviderErrorKind::classify("InvalidParameter", Some(400)),
            ProviderErrorKind::InvalidParameter
        );
        assert_eq!(
            ProviderErrorKind::classify("InvalidParameterValueException", Some(400)),
            ProviderErrorKind::InvalidParameter
        );
        assert_eq!(
            ProviderErrorKind::classify("NotFound", Some(404)),
            ProviderErrorKind::NotFound
        );
        assert_eq!(
            ProviderErrorKind::classify("Throttling", Some(400)),
            ProviderErrorKind::Throttling
        );
        assert_eq!(
            ProviderErrorKind::classify("AuthorizationError", Some(403)),
            ProviderErrorKind::Authorization
        );
    }

    #[test]
    fn test_classify_falls_back_to_status() {
        assert_eq!(
            ProviderErrorKind::classify("Weird", Some(503)),
            ProviderErrorKind::Server
        );
        assert_eq!(
            ProviderErrorKind::classify("Weird", Some(400)),
            ProviderErrorKind::Client
        );
        assert_eq!(
            ProviderErrorKind::classify("", None),
            ProviderErrorKind::Client
        );
    }

    #[test]
    fn test_display() {
        let err = ProviderError::new("sns", Some(400), "InvalidParameter", "bad phone");
        assert_eq!(
            err.to_string(),
            "sns error (HTTP 400) InvalidParameter: bad phone"
        );
    }
}
