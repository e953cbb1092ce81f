use base64::Engine;
use image::codecs::jpeg::JpegEncoder;

use crate::error::AnnotationError;
use crate::models::PageImage;

/// JPEG-compresses a page and base64-encodes it for the request body.
pub fn encode_page(image: &PageImage, quality: u8) -> Result<String, AnnotationError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(AnnotationError::InvalidImage);
    }

    let rgb = image.raster().to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| {
            tracing::warn!("Failed to encode page as JPEG: {}", e);
            AnnotationError::InvalidImage
        })?;

    let payload = base64::engine::general_purpose::STANDARD.encode(&jpeg);
    tracing::debug!(
        "Encoded {}x{} page: {} JPEG bytes, {} base64 chars",
        image.width(),
        image.height(),
        jpeg.len(),
        payload.len()
    );
    Ok(payload)
}
