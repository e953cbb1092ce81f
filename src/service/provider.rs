use async_trait::async_trait;

use crate::error::AnnotationError;
use crate::models::PageImage;
use crate::service::ProcessImageResponse;

/// Remote service that finds mistakes on a page image.
///
/// One call is one request; implementations hold no per-call state so a
/// single instance can serve a whole batch concurrently.
#[async_trait]
pub trait AnnotationService: Send + Sync {
    async fn submit(
        &self,
        image: &PageImage,
        symbols: &[String],
    ) -> Result<ProcessImageResponse, AnnotationError>;
}
