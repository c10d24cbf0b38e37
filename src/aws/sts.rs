//! STS `GetCallerIdentity`.

use url::form_urlencoded::Serializer;

use crate::{Error, Result};

pub const SERVICE: &str = "sts";
const API_VERSION: &str = "2011-06-15";

pub fn caller_identity_form() -> String {
    Serializer::new(String::new())
        .append_pair("Action", "GetCallerIdentity")
        .append_pair("Version", API_VERSION)
        .finish()
}

pub fn parse_account_id(response: &serde_json::Value) -> Result<String> {
    response
        .pointer("/GetCallerIdentityResponse/GetCallerIdentityResult/Account")
        .and_then(|v| v.as_str())
        .filter(|account| !account.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Parse("GetCallerIdentity response has no Account".into()))
}
