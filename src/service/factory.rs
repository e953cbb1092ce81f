use crate::config::Config;
use crate::error::Result;
use crate::service::{AnnotationService, HttpAnnotationClient};
use std::sync::Arc;
use std::time::Duration;

/// Builds the production client. The token comes from the sign-in flow and is
/// passed through untouched.
pub fn create_client(config: &Config, auth_token: &str) -> Result<Arc<dyn AnnotationService>> {
    if auth_token.trim().is_empty() {
        return Err(crate::PresubmitError::InvalidArgument(
            "An auth token is required to call the annotation service".to_string(),
        ));
    }

    let client = HttpAnnotationClient::new(
        &config.service_base_url,
        auth_token.to_string(),
        Duration::from_secs(config.request_timeout_secs),
        config.jpeg_quality,
    )?;
    Ok(Arc::new(client))
}
