//! Progress-callback trait for per-document batch events.
//!
//! Inject an `Arc<dyn PublishProgressCallback>` via
//! [`crate::config::PublishConfigBuilder::progress`] to receive events as
//! the batch processes each document. The callback is the single shared
//! handle through which workers report — console output serialisation is
//! the implementation's responsibility (the CLI's implementation routes
//! everything through one internally synchronised progress bar).
//!
//! All methods have default no-op implementations so callers only override
//! what they care about. Documents complete out of order under concurrency;
//! implementations must protect shared mutable state accordingly.

use std::path::Path;
use std::sync::Arc;

/// Called by the batch orchestrator as it processes each document.
pub trait PublishProgressCallback: Send + Sync {
    /// Called once before any document is processed.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when a worker picks up a document.
    fn on_document_start(&self, document: &Path) {
        let _ = document;
    }

    /// Called when a document's pipeline completed and its output was
    /// written. `image_count` is the number of distinct images uploaded or
    /// reused.
    fn on_document_complete(&self, document: &Path, image_count: usize) {
        let _ = (document, image_count);
    }

    /// Called when a document's pipeline failed.
    fn on_document_error(&self, document: &Path, error: String) {
        let _ = (document, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let _ = (total_documents, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PublishProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PublishConfig`].
pub type ProgressCallback = Arc<dyn PublishProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
    }

    impl PublishProgressCallback for TrackingCallback {
        fn on_document_start(&self, _document: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_document_complete(&self, _document: &Path, _image_count: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        fn on_document_error(&self, _document: &Path, _error: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(3);
        cb.on_document_start(Path::new("a.md"));
        cb.on_document_complete(Path::new("a.md"), 2);
        cb.on_document_error(Path::new("b.md"), "missing images".to_string());
        cb.on_batch_complete(3, 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        };

        tracker.on_document_start(Path::new("a.md"));
        tracker.on_document_complete(Path::new("a.md"), 1);
        tracker.on_document_start(Path::new("b.md"));
        tracker.on_document_error(Path::new("b.md"), "boom".to_string());

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn arc_dyn_callback_is_send_in_spawn() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        tokio::spawn(async move {
            cb.on_document_error(Path::new("a.md"), "err".to_string());
        })
        .await
        .expect("spawn must succeed");
    }
}
