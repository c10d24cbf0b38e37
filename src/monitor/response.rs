use serde::Serialize;

use crate::dispatch::WarningDispatchOutcome;
use crate::usage::RegionUsage;

pub const STATUS_OK: u16 = 200;

/// Result payload of one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationResponse {
    pub usage_details: Vec<RegionUsage>,
    #[serde(rename = "isBase64Encoded")]
    pub is_base64_encoded: bool,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON trace of the dispatch outcome.
    pub body: String,
    #[serde(skip)]
    pub outcome: WarningDispatchOutcome,
}

impl InvocationResponse {
    pub fn ok(usage_details: Vec<RegionUsage>, outcome: WarningDispatchOutcome) -> crate::Result<Self> {
        Ok(Self {
            body: serde_json::to_string(&outcome)?,
            usage_details,
            is_base64_encoded: false,
            status_code: STATUS_OK,
            outcome,
        })
    }
}
