//! Concurrent submission of a document's pages.
//!
//! Every page gets its own request. The batch waits for all of them, and a
//! failed page never affects its neighbours. Results come back in page order
//! whatever order the service answers in.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};

use crate::models::{PageImage, PageOutcome};
use crate::service::AnnotationService;

pub struct BatchSubmitter {
    service: Arc<dyn AnnotationService>,
    max_in_flight: Option<usize>,
}

impl BatchSubmitter {
    /// Submits every page at once.
    pub fn new(service: Arc<dyn AnnotationService>) -> Self {
        BatchSubmitter {
            service,
            max_in_flight: None,
        }
    }

    /// Caps how many requests are outstanding at a time. `None` or `Some(0)`
    /// lifts the cap.
    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight.filter(|limit| *limit > 0);
        self
    }

    pub fn max_in_flight(&self) -> Option<usize> {
        self.max_in_flight
    }

    /// One outcome per image, in input order.
    pub async fn submit_all(&self, images: &[PageImage], symbols: &[String]) -> Vec<PageOutcome> {
        let indices: Vec<usize> = (0..images.len()).collect();
        self.submit_pages(images, &indices, symbols)
            .await
            .into_iter()
            .map(|(_, outcome)| outcome)
            .collect()
    }

    /// Submits only the pages at `indices`, e.g. to retry failures. Each
    /// outcome is paired with its page index, in the order given. Indices
    /// out of range are skipped.
    pub async fn submit_pages(
        &self,
        images: &[PageImage],
        indices: &[usize],
        symbols: &[String],
    ) -> Vec<(usize, PageOutcome)> {
        let jobs: Vec<(usize, usize, &PageImage)> = indices
            .iter()
            .enumerate()
            .filter_map(|(slot, &page)| images.get(page).map(|image| (slot, page, image)))
            .collect();
        if jobs.is_empty() {
            return Vec::new();
        }

        let limit = self.max_in_flight.unwrap_or(jobs.len()).max(1);
        tracing::info!(
            "Submitting {} page(s) with up to {} in flight",
            jobs.len(),
            limit
        );
        let batch_started = Instant::now();

        let service = &self.service;
        let mut completed: Vec<(usize, usize, PageOutcome)> = stream::iter(jobs)
            .map(|(slot, page, image)| async move {
                let started = Instant::now();
                let outcome = service.submit(image, symbols).await;
                match &outcome {
                    Ok(response) => tracing::debug!(
                        "Page {} returned {} annotation(s) in {:?}",
                        page + 1,
                        response.annotations.len(),
                        started.elapsed()
                    ),
                    Err(e) => tracing::warn!("Page {} failed after {:?}: {}", page + 1, started.elapsed(), e),
                }
                (slot, page, outcome)
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        // Completion order is arbitrary; the slot fixes the position.
        completed.sort_unstable_by_key(|(slot, _, _)| *slot);

        let failures = completed.iter().filter(|(_, _, outcome)| outcome.is_err()).count();
        tracing::info!(
            "Batch finished in {:?}: {} succeeded, {} failed",
            batch_started.elapsed(),
            completed.len() - failures,
            failures
        );

        completed
            .into_iter()
            .map(|(_, page, outcome)| (page, outcome))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnnotationError;
    use crate::models::{AnnotationRecord, BoundingBox};
    use crate::service::ProcessImageResponse;
    use async_trait::async_trait;
    use image::DynamicImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fake service that identifies a page by its pixel width.
    struct ScriptedService {
        delay_for_width: fn(u32) -> Duration,
        unauthorized_width: Option<u32>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl ScriptedService {
        fn new(delay_for_width: fn(u32) -> Duration) -> Self {
            ScriptedService {
                delay_for_width,
                unauthorized_width: None,
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AnnotationService for ScriptedService {
        async fn submit(
            &self,
            image: &PageImage,
            _symbols: &[String],
        ) -> Result<ProcessImageResponse, AnnotationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep((self.delay_for_width)(image.width())).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if Some(image.width()) == self.unauthorized_width {
                return Err(AnnotationError::AuthenticationError);
            }
            Ok(ProcessImageResponse {
                annotations: vec![AnnotationRecord {
                    text: format!("page {}", image.width()),
                    bbox: BoundingBox::from([0, 0, 1, 1]),
                    mistake_description: String::new(),
                }],
                symbol: None,
            })
        }
    }

    fn pages(count: u32) -> Vec<PageImage> {
        (1..=count)
            .map(|width| PageImage::new(DynamicImage::new_rgb8(width, 1)))
            .collect()
    }

    fn page_text(outcome: &PageOutcome) -> &str {
        &outcome.as_ref().unwrap().annotations[0].text
    }

    #[tokio::test]
    async fn test_output_follows_input_order() {
        // First page answers last.
        let service = Arc::new(ScriptedService::new(|width| {
            Duration::from_millis(u64::from(6 - width) * 30)
        }));
        let submitter = BatchSubmitter::new(service.clone());

        let outcomes = submitter.submit_all(&pages(5), &[]).await;

        let texts: Vec<&str> = outcomes.iter().map(page_text).collect();
        assert_eq!(texts, vec!["page 1", "page 2", "page 3", "page 4", "page 5"]);
        assert_eq!(service.peak_in_flight.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_sink_the_batch() {
        let mut service = ScriptedService::new(|_| Duration::from_millis(5));
        service.unauthorized_width = Some(2);
        let submitter = BatchSubmitter::new(Arc::new(service));

        let outcomes = submitter.submit_all(&pages(3), &[]).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(page_text(&outcomes[0]), "page 1");
        assert_eq!(outcomes[1], Err(AnnotationError::AuthenticationError));
        assert_eq!(page_text(&outcomes[2]), "page 3");
    }

    #[tokio::test]
    async fn test_in_flight_limit_is_respected() {
        let service = Arc::new(ScriptedService::new(|_| Duration::from_millis(20)));
        let submitter = BatchSubmitter::new(service.clone()).with_max_in_flight(Some(2));

        let outcomes = submitter.submit_all(&pages(6), &[]).await;

        assert_eq!(outcomes.len(), 6);
        assert!(outcomes.iter().all(|o| o.is_ok()));
        assert!(service.peak_in_flight.load(Ordering::SeqCst) <= 2);
        assert_eq!(service.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_zero_limit_means_unbounded() {
        let submitter = BatchSubmitter::new(Arc::new(ScriptedService::new(|_| Duration::ZERO)))
            .with_max_in_flight(Some(0));
        assert_eq!(submitter.max_in_flight(), None);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let service = Arc::new(ScriptedService::new(|_| Duration::ZERO));
        let submitter = BatchSubmitter::new(service.clone());

        assert!(submitter.submit_all(&[], &[]).await.is_empty());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_pages_only_touches_requested_pages() {
        let service = Arc::new(ScriptedService::new(|width| {
            Duration::from_millis(u64::from(5 - width) * 10)
        }));
        let submitter = BatchSubmitter::new(service.clone());

        let outcomes = submitter.submit_pages(&pages(4), &[3, 1, 9], &[]).await;

        let indices: Vec<usize> = outcomes.iter().map(|(index, _)| *index).collect();
        assert_eq!(indices, vec![3, 1]);
        assert_eq!(page_text(&outcomes[0].1), "page 4");
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    }
}
