//! Substitution: rewrite targets to URLs and write the output document.
//!
//! Substitution is a plain literal replacement per mapping entry, applied
//! to the whole text. It runs only after every extracted target has a URL,
//! so a document is either rewritten completely or not at all.

use crate::error::PublishError;
use std::path::Path;

/// Replace every occurrence of each raw target with its remote URL.
///
/// Replacement order across distinct targets follows the mapping order;
/// every occurrence of every target is replaced.
pub fn substitute(text: &str, mapping: &[(String, String)]) -> String {
    let mut result = text.to_string();
    for (raw, url) in mapping {
        result = result.replace(raw.as_str(), url.as_str());
    }
    result
}

/// Write the rewritten document, fully overwriting any existing file.
///
/// Writes to a sibling temp file and renames into place so a crash mid-write
/// never leaves a truncated output.
pub async fn write_output(path: &Path, text: &str) -> Result<(), PublishError> {
    let tmp_path = path.with_extension("md.tmp");

    tokio::fs::write(&tmp_path, text)
        .await
        .map_err(|e| PublishError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| PublishError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mapping_leaves_text_untouched() {
        let text = "# Title\n\nNo images.\n";
        assert_eq!(substitute(text, &[]), text);
    }

    #[test]
    fn replaces_every_occurrence() {
        let text = "![a](x.png) mid ![b](x.png) end ![c](x.png)";
        let mapping = vec![("x.png".to_string(), "https://h/x.png".to_string())];
        let out = substitute(text, &mapping);
        assert_eq!(out.matches("https://h/x.png").count(), 3);
        assert!(!out.contains("(x.png)"));
    }

    #[test]
    fn replaces_multiple_distinct_targets() {
        let text = "![a](one.png) and ![b](two.png)";
        let mapping = vec![
            ("one.png".to_string(), "https://h/1.png".to_string()),
            ("two.png".to_string(), "https://h/2.png".to_string()),
        ];
        let out = substitute(text, &mapping);
        assert!(out.contains("https://h/1.png"));
        assert!(out.contains("https://h/2.png"));
    }

    #[tokio::test]
    async fn write_output_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        std::fs::write(&path, "old").unwrap();

        write_output(&path, "new contents\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new contents\n");
    }

    #[tokio::test]
    async fn write_output_fails_for_missing_directory() {
        let err = write_output(Path::new("/no/such/dir/out.md"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::OutputWriteFailed { .. }));
    }
}
