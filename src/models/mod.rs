mod annotation;
mod document;
mod page_image;

pub use annotation::{Annotation, AnnotationRecord, BoundingBox};
pub use document::{Document, Page, PageOutcome, PageStatus};
pub use page_image::PageImage;
