use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Error body returned by the remote services on non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
