mod process;

pub use process::{
    document_report, process_document, retry_failed_pages, DocumentReport, PageReport,
    PageReportStatus,
};
