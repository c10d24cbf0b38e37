//! SigV4 request signing.

use std::time::SystemTime;

use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings, sign};
use aws_sigv4::sign::v4::SigningParams;
use aws_smithy_runtime_api::client::identity::Identity;

use super::credentials::CachedAwsCredentials;
use crate::{Error, Result};

/// Request to be signed for one service in one region.
pub struct SigningRequest<'a> {
    pub service: &'a str,
    pub region: &'a str,
    pub method: &'a str,
    pub url: &'a str,
    pub headers: &'a [(&'a str, String)],
    pub body: &'a [u8],
}

/// Headers to add to the request, including `authorization` and `x-amz-date`.
pub fn sign_request(
    creds: &CachedAwsCredentials,
    request: &SigningRequest<'_>,
) -> Result<Vec<(String, String)>> {
    let identity = Identity::new(creds.to_sdk(), creds.expiry());

    let signing_params = SigningParams::builder()
        .identity(&identity)
        .region(request.region)
        .name(request.service)
        .time(SystemTime::now())
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| Error::auth(e.to_string()))?;

    let signable_request = SignableRequest::new(
        request.method,
        request.url,
        request
            .headers
            .iter()
            .map(|(name, value)| (*name, value.as_str())),
        SignableBody::Bytes(request.body),
    )
    .map_err(|e| Error::auth(e.to_string()))?;

    let (signing_instructions, _) = sign(signable_request, &signing_params.into())
        .map_err(|e| Error::auth(e.to_string()))?
        .into_parts();

    Ok(signing_instructions
        .headers()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect())
}
