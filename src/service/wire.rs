use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;
use crate::models::AnnotationRecord;

pub const STATUS_OK: u16 = 200;
pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_SERVER_ERROR: u16 = 500;

const UNKNOWN_SERVER_ERROR: &str = "Unknown server error";

#[derive(Debug, Serialize)]
pub(crate) struct ProcessImageRequest<'a> {
    pub image: &'a str,
    pub symbols: &'a [String],
}

/// Body of a successful `/api/process-image` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessImageResponse {
    pub annotations: Vec<AnnotationRecord>,
    /// Symbol the service spotted in the page corner, if it was asked to look.
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerErrorBody {
    details: String,
}

/// Turns a status code and raw body into the page outcome.
pub fn classify_response(
    status: u16,
    body: &[u8],
) -> Result<ProcessImageResponse, AnnotationError> {
    match status {
        STATUS_OK => serde_json::from_slice(body).map_err(|e| {
            tracing::warn!("Unparseable annotation response: {}", e);
            AnnotationError::InvalidResponse
        }),
        STATUS_UNAUTHORIZED => Err(AnnotationError::AuthenticationError),
        STATUS_SERVER_ERROR => {
            let details = serde_json::from_slice::<ServerErrorBody>(body)
                .map(|body| body.details)
                .unwrap_or_else(|_| UNKNOWN_SERVER_ERROR.to_string());
            Err(AnnotationError::ServerError(details))
        }
        other => {
            tracing::warn!("Unexpected status from annotation service: {}", other);
            Err(AnnotationError::InvalidResponse)
        }
    }
}
