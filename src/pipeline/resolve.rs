//! Path resolution: map raw targets to absolute filesystem paths.
//!
//! Targets are percent-decoded before resolution because markdown tools
//! routinely encode spaces in link targets (`my%20image.png`) while the
//! file on disk carries the literal name.
//!
//! Missing files are aggregated: the caller gets every missing path in one
//! error, and the document aborts before any network call is made.

use crate::error::PublishError;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// One image reference: the raw target as written, plus its resolved
/// absolute location on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// The exact target string from the markdown text. Substitution keys
    /// on this value.
    pub raw: String,
    /// The target resolved against the document's directory.
    pub path: PathBuf,
}

/// Resolve every raw target against `base_dir` and verify existence.
///
/// # Errors
/// [`PublishError::MissingImages`] listing **all** resolved paths that do
/// not exist, when there is at least one.
pub fn resolve_targets(
    base_dir: &Path,
    raw_targets: &[String],
) -> Result<Vec<ImageRef>, PublishError> {
    let refs: Vec<ImageRef> = raw_targets
        .iter()
        .map(|raw| {
            let decoded = percent_decode_str(raw).decode_utf8_lossy();
            ImageRef {
                raw: raw.clone(),
                path: base_dir.join(decoded.as_ref()),
            }
        })
        .collect();

    let missing: Vec<PathBuf> = refs
        .iter()
        .filter(|r| !r.path.exists())
        .map(|r| r.path.clone())
        .collect();

    if !missing.is_empty() {
        return Err(PublishError::MissingImages { paths: missing });
    }

    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/a.png"), b"png").unwrap();

        let refs = resolve_targets(dir.path(), &["img/a.png".to_string()]).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "img/a.png");
        assert_eq!(refs[0].path, dir.path().join("img/a.png"));
    }

    #[test]
    fn percent_decodes_before_resolution() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("my image.png"), b"png").unwrap();

        let refs = resolve_targets(dir.path(), &["my%20image.png".to_string()]).unwrap();
        assert_eq!(refs[0].raw, "my%20image.png");
        assert_eq!(refs[0].path, dir.path().join("my image.png"));
    }

    #[test]
    fn aggregates_every_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("here.png"), b"png").unwrap();

        let err = resolve_targets(
            dir.path(),
            &[
                "gone1.png".to_string(),
                "here.png".to_string(),
                "gone2.png".to_string(),
            ],
        )
        .unwrap_err();

        match err {
            PublishError::MissingImages { paths } => {
                assert_eq!(paths.len(), 2);
                assert!(paths.contains(&dir.path().join("gone1.png")));
                assert!(paths.contains(&dir.path().join("gone2.png")));
            }
            other => panic!("expected MissingImages, got {other:?}"),
        }
    }

    #[test]
    fn empty_target_list_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_targets(dir.path(), &[]).unwrap().is_empty());
    }
}
