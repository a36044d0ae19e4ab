//! Batch orchestration: discovery, a bounded worker pool, and the summary.
//!
//! Each document runs its whole pipeline as an independent spawned task on
//! the multi-threaded runtime, with at most
//! `min(concurrency, number_of_documents)` in flight. Documents share only
//! the immutable configuration and the once-constructed backend handle;
//! outcomes accumulate into append-only success/failure lists. One
//! document's failure never aborts another's run.

use crate::config::PublishConfig;
use crate::error::PublishError;
use crate::output::{BatchSummary, DocumentFailure, DocumentResult};
use crate::publish::publish_with_backend;
use crate::uploader::BackendHandle;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Process every document through the per-file pipeline and aggregate the
/// outcomes.
///
/// The backend clients are constructed once, before any document I/O; a
/// configuration problem fails the whole batch here rather than once per
/// document.
pub async fn publish_batch(
    documents: Vec<PathBuf>,
    config: &PublishConfig,
) -> Result<BatchSummary, PublishError> {
    let backend = Arc::new(BackendHandle::new(config)?);
    let total = documents.len();
    let workers = config.concurrency.min(total).max(1);

    info!("publishing {total} document(s), {workers} worker(s)");
    if let Some(cb) = &config.progress {
        cb.on_batch_start(total);
    }

    let results: Vec<(PathBuf, Result<DocumentResult, PublishError>)> =
        stream::iter(documents.into_iter().map(|document| {
            let backend = Arc::clone(&backend);
            let config = config.clone();
            async move {
                if let Some(cb) = &config.progress {
                    cb.on_document_start(&document);
                }

                let task_document = document.clone();
                let task_config = config.clone();
                let task_backend = Arc::clone(&backend);
                let result = tokio::spawn(async move {
                    publish_with_backend(&task_document, &task_config, &task_backend).await
                })
                .await
                .unwrap_or_else(|e| {
                    Err(PublishError::Internal(format!("worker task failed: {e}")))
                });

                if let Some(cb) = &config.progress {
                    match &result {
                        Ok(r) => cb.on_document_complete(&document, r.images.len()),
                        Err(e) => cb.on_document_error(&document, e.to_string()),
                    }
                }
                (document, result)
            }
        }))
        .buffer_unordered(workers)
        .collect()
        .await;

    let mut summary = BatchSummary::default();
    for (document, result) in results {
        match result {
            Ok(doc_result) => summary.succeeded.push(doc_result),
            Err(error) => summary.failed.push(DocumentFailure {
                input: document,
                error,
            }),
        }
    }

    info!(
        "batch complete: {} succeeded, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );
    if let Some(cb) = &config.progress {
        cb.on_batch_complete(total, summary.succeeded.len());
    }

    Ok(summary)
}

/// Select input documents: a single file, or every glob match under a
/// directory.
///
/// File names containing `exclude` are skipped (pass an empty string to
/// disable), so generated outputs are never picked up as inputs on the
/// next run. Results are sorted for deterministic processing order.
pub fn discover_documents(
    path: &Path,
    pattern: &str,
    exclude: &str,
) -> Result<Vec<PathBuf>, PublishError> {
    if !path.is_dir() {
        return if path.is_file() {
            Ok(vec![path.to_path_buf()])
        } else {
            Err(PublishError::DocumentNotFound {
                path: path.to_path_buf(),
            })
        };
    }

    let full_pattern = path.join(pattern);
    let entries = glob::glob(&full_pattern.to_string_lossy()).map_err(|e| {
        PublishError::InvalidPattern {
            pattern: pattern.to_string(),
            detail: e.to_string(),
        }
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let candidate = match entry {
            Ok(p) => p,
            Err(e) => {
                warn!("skipping unreadable path during discovery: {e}");
                continue;
            }
        };
        if !candidate.is_file() {
            continue;
        }
        if !exclude.is_empty() {
            let name = candidate
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if name.contains(exclude) {
                continue;
            }
        }
        files.push(candidate);
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn single_file_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("post.md");
        fs::write(&file, "# hi").unwrap();

        let docs = discover_documents(&file, "**/*.md", "absolute").unwrap();
        assert_eq!(docs, vec![file]);
    }

    #[test]
    fn missing_input_is_an_error() {
        let err = discover_documents(Path::new("/no/such/file.md"), "**/*.md", "").unwrap_err();
        assert!(matches!(err, PublishError::DocumentNotFound { .. }));
    }

    #[test]
    fn directory_glob_finds_nested_markdown() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.md"), "a").unwrap();
        fs::write(dir.path().join("sub/b.md"), "b").unwrap();
        fs::write(dir.path().join("notes.txt"), "not markdown").unwrap();

        let docs = discover_documents(dir.path(), "**/*.md", "").unwrap();
        assert_eq!(
            docs,
            vec![dir.path().join("a.md"), dir.path().join("sub/b.md")]
        );
    }

    #[test]
    fn exclusion_substring_filters_generated_outputs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("post.md"), "a").unwrap();
        fs::write(dir.path().join("post.absolute.md"), "generated").unwrap();

        let docs = discover_documents(dir.path(), "**/*.md", "absolute").unwrap();
        assert_eq!(docs, vec![dir.path().join("post.md")]);
    }

    #[test]
    fn empty_exclusion_disables_filtering() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("post.md"), "a").unwrap();
        fs::write(dir.path().join("post.absolute.md"), "generated").unwrap();

        let docs = discover_documents(dir.path(), "**/*.md", "").unwrap();
        assert_eq!(docs.len(), 2);
    }
}
