pub mod batch;
pub mod commands;
pub mod config;
mod error;
pub mod geometry;
pub mod logger;
pub mod models;
pub mod overlay;
pub mod service;

pub use error::{AnnotationError, GeometryError, PresubmitError, Result};

pub use batch::BatchSubmitter;
pub use commands::{document_report, process_document, retry_failed_pages};
pub use models::{Annotation, Document, Page, PageImage, PageOutcome, PageStatus};
pub use overlay::{OverlaySelectionController, SelectionState};
pub use service::{create_client, AnnotationService, HttpAnnotationClient};
