use serde::Serialize;
use uuid::Uuid;

use crate::batch::BatchSubmitter;
use crate::config::Config;
use crate::error::{AnnotationError, Result};
use crate::geometry::Size;
use crate::models::{Document, Page, PageImage};
use crate::overlay::{page_overlays, OverlayMarker, OverlaySelectionController};

/// Submits every page of a capture session and builds the document once all
/// submissions have finished. Failed pages are kept, empty, with their error.
pub async fn process_document(
    submitter: &BatchSubmitter,
    display_name: &str,
    images: Vec<PageImage>,
    symbols: &[String],
) -> Result<Document> {
    let outcomes = submitter.submit_all(&images, symbols).await;
    let document = Document::assemble(display_name, images, outcomes)?;

    let failed = document.failed_pages();
    if failed.is_empty() {
        tracing::info!(
            "Document '{}' processed: {} page(s)",
            document.display_name,
            document.page_count()
        );
    } else {
        tracing::warn!(
            "Document '{}' processed with {} failed page(s): {:?}",
            document.display_name,
            failed.len(),
            failed
        );
    }
    Ok(document)
}

/// Re-submits only the pages that failed. Returns the indices that now
/// succeed; pages that fail again keep their new error.
pub async fn retry_failed_pages(
    submitter: &BatchSubmitter,
    document: &mut Document,
    symbols: &[String],
) -> Vec<usize> {
    let failed = document.failed_pages();
    if failed.is_empty() {
        return Vec::new();
    }

    tracing::info!("Retrying {} failed page(s)", failed.len());
    let images = document.images();
    let mut recovered = Vec::new();
    for (index, outcome) in submitter.submit_pages(&images, &failed, symbols).await {
        let succeeded = outcome.is_ok();
        if document.reattach(index, outcome) && succeeded {
            recovered.push(index);
        }
    }
    recovered
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageReportStatus {
    Processed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub page: usize,
    pub status: PageReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AnnotationError>,
    pub annotation_count: usize,
    pub mistake_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub overlays: Vec<OverlayMarker>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub id: Uuid,
    pub display_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub pages: Vec<PageReport>,
}

/// Summarises a document for display at `viewport_width`, with every popup
/// closed.
pub fn document_report(
    document: &Document,
    config: &Config,
    viewport_width: f64,
) -> Result<DocumentReport> {
    let popup = Size::new(config.popup_width, config.popup_height);
    let pages = document
        .pages()
        .iter()
        .enumerate()
        .map(|(index, page)| page_report(index, page, config, viewport_width, popup))
        .collect::<Result<Vec<_>>>()?;

    Ok(DocumentReport {
        id: document.id,
        display_name: document.display_name.clone(),
        created_at: document.created_at,
        pages,
    })
}

fn page_report(
    index: usize,
    page: &Page,
    config: &Config,
    viewport_width: f64,
    popup: Size,
) -> Result<PageReport> {
    let viewport = Size::new(
        viewport_width,
        crate::geometry::displayed_height(page.image().size(), viewport_width)?,
    );
    let controller = OverlaySelectionController::new(index);
    let overlays = page_overlays(page, viewport, popup, &controller)?
        .into_iter()
        .filter(|marker| marker.is_selectable)
        .collect();

    let symbol = page.detected_symbol().map(str::to_string);
    let folder = symbol
        .as_deref()
        .and_then(|s| config.folder_for_symbol(s))
        .map(str::to_string);

    Ok(PageReport {
        page: index + 1,
        status: if page.is_failed() {
            PageReportStatus::Failed
        } else {
            PageReportStatus::Processed
        },
        error: page.error().cloned(),
        annotation_count: page.annotations().len(),
        mistake_count: page.mistakes().count(),
        symbol,
        folder,
        overlays,
    })
}
