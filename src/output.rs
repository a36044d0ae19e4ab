//! Result types: per-document outcomes and the batch summary.

use crate::error::PublishError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The outcome of one successfully published document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    /// The input document.
    pub input: PathBuf,
    /// Where the rewritten document was written.
    pub output: PathBuf,
    /// Raw relative target → final remote URL, for every extracted
    /// reference. Empty when the document had no relative images.
    pub images: BTreeMap<String, String>,
}

/// A captured per-document failure.
#[derive(Debug)]
pub struct DocumentFailure {
    /// The input document that failed.
    pub input: PathBuf,
    /// What went wrong. Already-uploaded images for this document are not
    /// rolled back.
    pub error: PublishError,
}

/// Aggregated outcome of a batch run: successes and failures, reported once
/// after every document has been attempted.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<DocumentResult>,
    pub failed: Vec<DocumentFailure>,
}

impl BatchSummary {
    /// True when no document failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of documents attempted.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_success_flag() {
        let mut summary = BatchSummary::default();
        assert!(summary.is_success());
        assert_eq!(summary.total(), 0);

        summary.failed.push(DocumentFailure {
            input: PathBuf::from("a.md"),
            error: PublishError::Internal("boom".into()),
        });
        assert!(!summary.is_success());
        assert_eq!(summary.total(), 1);
    }

    #[test]
    fn document_result_serialises() {
        let mut images = BTreeMap::new();
        images.insert("img/a.png".to_string(), "https://h/a.png".to_string());
        let result = DocumentResult {
            input: PathBuf::from("post.md"),
            output: PathBuf::from("post.absolute.md"),
            images,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("img/a.png"));
        assert!(json.contains("https://h/a.png"));
    }
}
