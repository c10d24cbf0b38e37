//! Signed POST execution and AWS error decoding.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::credentials::AwsCredentials;
use super::signer::{SigningRequest, sign_request};
use crate::Result;
use crate::provider::ProviderError;

pub const QUERY_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
pub const JSON_10_CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// One call to a regional service endpoint.
pub struct ServiceCall<'a> {
    pub service: &'static str,
    pub region: &'a str,
    pub url: &'a str,
    pub content_type: &'static str,
    pub target: Option<&'static str>,
    pub body: Vec<u8>,
}

pub struct RequestExecutor;

impl RequestExecutor {
    /// Sign and send `call`, returning the decoded JSON body of a 2xx response.
    pub async fn send(
        http: &reqwest::Client,
        credentials: &AwsCredentials,
        call: ServiceCall<'_>,
    ) -> Result<serde_json::Value> {
        let mut headers = vec![("content-type", call.content_type.to_string())];
        if let Some(target) = call.target {
            headers.push(("x-amz-target", target.to_string()));
        }

        let creds = credentials.get().await?;
        let signed = sign_request(
            &creds,
            &SigningRequest {
                service: call.service,
                region: call.region,
                method: "POST",
                url: call.url,
                headers: &headers,
                body: &call.body,
            },
        )?;

        let mut req = http
            .post(call.url)
            .header("Accept", "application/json")
            .body(call.body);
        for (name, value) in headers {
            req = req.header(name, value);
        }
        for (name, value) in signed {
            req = req.header(&name, &value);
        }

        debug!(service = call.service, region = call.region, url = call.url, "Sending request");
        let response = req.send().await?;
        let response = Self::check_response(call.service, response).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn check_response(
        service: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(service, status, &text).into());
        }
        Ok(response)
    }
}

fn xml_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<Code>([^<]+)</Code>").expect("valid code regex"))
}

fn xml_message_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<Message>([^<]*)</Message>").expect("valid message regex"))
}

/// Decode an AWS error body. Query services answer `{"Error": {...}}` or XML,
/// JSON 1.0 services answer `{"__type": ..., "message": ...}`.
pub fn parse_error(service: &str, status: u16, body: &str) -> ProviderError {
    let (code, message) = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json_error_parts(&json),
        Err(_) => (
            xml_code_regex()
                .captures(body)
                .map(|c| c[1].to_string()),
            xml_message_regex()
                .captures(body)
                .map(|c| c[1].to_string()),
        ),
    };

    let code = code.unwrap_or_else(|| format!("HTTP{}", status));
    let message = message.unwrap_or_else(|| body.trim().to_string());
    ProviderError::new(service, Some(status), code, message)
}

fn json_error_parts(json: &serde_json::Value) -> (Option<String>, Option<String>) {
    let str_at = |value: &serde_json::Value, keys: &[&str]| {
        keys.iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
    };

    if let Some(error) = json.get("Error") {
        return (
            str_at(error, &["Code"]),
            str_at(error, &["Message", "message"]),
        );
    }

    let code = str_at(json, &["__type", "code", "Code"]).map(|t| match t.rsplit_once('#') {
        Some((_, short)) => short.to_string(),
        None => t,
    });
    (code, str_at(json, &["message", "Message"]))
}
