use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AnnotationError, Result};
use crate::models::{Annotation, PageImage};
use crate::service::ProcessImageResponse;
use crate::PresubmitError;

/// Outcome of one page's submission, as seen by a caller.
pub type PageOutcome = std::result::Result<ProcessImageResponse, AnnotationError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    /// The service examined the page; zero annotations here means no mistakes.
    Processed,
    /// The request failed; the page has no annotations because nobody looked.
    Failed(AnnotationError),
}

/// One page of a document
#[derive(Debug, Clone)]
pub struct Page {
    image: PageImage,
    annotations: Vec<Annotation>,
    status: PageStatus,
    detected_symbol: Option<String>,
}

impl Page {
    /// Builds a page from its submission outcome, minting annotation ids.
    pub fn from_outcome(image: PageImage, outcome: PageOutcome) -> Self {
        match outcome {
            Ok(response) => Page {
                image,
                annotations: response.annotations.into_iter().map(Annotation::attach).collect(),
                status: PageStatus::Processed,
                detected_symbol: response.symbol.filter(|s| !s.trim().is_empty()),
            },
            Err(error) => Page {
                image,
                annotations: Vec::new(),
                status: PageStatus::Failed(error),
                detected_symbol: None,
            },
        }
    }

    pub fn image(&self) -> &PageImage {
        &self.image
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: Uuid) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// Annotations that carry a mistake description, in service order.
    pub fn mistakes(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(|a| a.is_selectable())
    }

    pub fn status(&self) -> &PageStatus {
        &self.status
    }

    pub fn error(&self) -> Option<&AnnotationError> {
        match &self.status {
            PageStatus::Failed(error) => Some(error),
            PageStatus::Processed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error().is_some()
    }

    /// Examined by the service and nothing was flagged.
    pub fn is_flawless(&self) -> bool {
        !self.is_failed() && self.mistakes().next().is_none()
    }

    pub fn detected_symbol(&self) -> Option<&str> {
        self.detected_symbol.as_deref()
    }
}

/// A finalized capture session
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pages: Vec<Page>,
}

impl Document {
    /// Attaches per-page outcomes to their images. Both lists are in page order.
    pub fn assemble(
        display_name: &str,
        images: Vec<PageImage>,
        outcomes: Vec<PageOutcome>,
    ) -> Result<Self> {
        if images.len() != outcomes.len() {
            return Err(PresubmitError::InvalidArgument(format!(
                "{} pages but {} submission outcomes",
                images.len(),
                outcomes.len()
            )));
        }

        let created_at = Utc::now();
        let pages = images
            .into_iter()
            .zip(outcomes)
            .map(|(image, outcome)| Page::from_outcome(image, outcome))
            .collect();

        Ok(Document {
            id: Uuid::new_v4(),
            display_name: resolve_display_name(display_name, created_at),
            created_at,
            pages,
        })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Indices of pages whose submission failed.
    pub fn failed_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.is_failed())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn images(&self) -> Vec<PageImage> {
        self.pages.iter().map(|page| page.image.clone()).collect()
    }

    /// Replaces a failed page with a fresh outcome. Pages that were processed
    /// are left alone; returns whether the page was replaced.
    pub(crate) fn reattach(&mut self, index: usize, outcome: PageOutcome) -> bool {
        match self.pages.get_mut(index) {
            Some(page) if page.is_failed() => {
                *page = Page::from_outcome(page.image.clone(), outcome);
                true
            }
            _ => false,
        }
    }
}

fn resolve_display_name(requested: &str, created_at: DateTime<Utc>) -> String {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        format!("Document_{}", created_at.format("%Y-%m-%d_%H-%M-%S"))
    } else {
        trimmed.to_string()
    }
}
