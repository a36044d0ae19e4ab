//! Configuration types for publishing runs.
//!
//! All behaviour is controlled through [`PublishConfig`], built via its
//! [`PublishConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share the configuration read-only across concurrent workers
//! and to diff two runs to understand why their outputs differ.
//!
//! The backend is a tagged choice fixed at configuration time:
//! [`BackendConfig::S3`] or [`BackendConfig::Imgur`]. The configuration is
//! immutable once built — it is constructed before any upload starts and
//! shared by every worker in the batch.

use crate::error::PublishError;
use crate::progress::ProgressCallback;
use crate::uploader::Uploader;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default output filename pattern; `{filename}` expands to the input stem.
pub const DEFAULT_OUTPUT_PATTERN: &str = "{filename}.absolute.md";

/// Default exclusion substring for directory discovery, so generated
/// `*.absolute.md` outputs are never re-processed as inputs.
pub const DEFAULT_EXCLUDE: &str = "absolute";

/// Default glob pattern for directory discovery.
pub const DEFAULT_GLOB: &str = "**/*.md";

const DEFAULT_ACL: &str = "private";
const DEFAULT_CACHE_CONTROL: &str = "public, max-age=31536000";

/// Configuration for a publishing run (single document or batch).
///
/// Built via [`PublishConfig::builder()`].
///
/// # Example
/// ```rust
/// use md2abs::{BackendConfig, PublishConfig, S3Options};
///
/// let config = PublishConfig::builder(BackendConfig::S3(
///     S3Options::new("my-bucket", "blog/{filename}"),
/// ))
/// .concurrency(4)
/// .build()
/// .unwrap();
/// ```
#[derive(Clone)]
pub struct PublishConfig {
    /// Which upload destination to use. Fixed for the whole batch.
    pub backend: BackendConfig,

    /// Output filename pattern. `{filename}` expands to the input's stem.
    /// Default: `{filename}.absolute.md`.
    pub output_pattern: String,

    /// Directory for output files. Must already exist. When `None`, each
    /// output is written beside its input.
    pub output_dir: Option<PathBuf>,

    /// Number of documents processed in parallel. Default: 1.
    ///
    /// The effective pool size is `min(concurrency, number_of_documents)`;
    /// raising this only helps when the run is network-bound across many
    /// documents.
    pub concurrency: usize,

    /// Always upload, unconditionally overwriting remote objects.
    /// Default: false (skip images already present and unchanged).
    pub override_remote: bool,

    /// When an object already exists remotely, compare its reported content
    /// digest against the local file's MD5 and re-upload on mismatch.
    /// Default: true. With `false`, mere existence is enough to skip.
    pub validate_digest: bool,

    /// Pre-constructed uploader. Takes precedence over `backend` when set.
    /// Useful in tests or when the caller needs custom upload behaviour.
    pub uploader: Option<Arc<dyn Uploader>>,

    /// Optional progress callback receiving per-document events.
    pub progress: Option<ProgressCallback>,
}

impl fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishConfig")
            .field("backend", &self.backend)
            .field("output_pattern", &self.output_pattern)
            .field("output_dir", &self.output_dir)
            .field("concurrency", &self.concurrency)
            .field("override_remote", &self.override_remote)
            .field("validate_digest", &self.validate_digest)
            .field("uploader", &self.uploader.as_ref().map(|_| "<dyn Uploader>"))
            .finish()
    }
}

impl PublishConfig {
    /// Create a new builder for the given backend.
    pub fn builder(backend: BackendConfig) -> PublishConfigBuilder {
        PublishConfigBuilder {
            config: PublishConfig {
                backend,
                output_pattern: DEFAULT_OUTPUT_PATTERN.to_string(),
                output_dir: None,
                concurrency: 1,
                override_remote: false,
                validate_digest: true,
                uploader: None,
                progress: None,
            },
        }
    }

    /// Compute the output path for an input document.
    ///
    /// Expands `{filename}` in the output pattern with the input's stem and
    /// places the result beside the input, or under the configured output
    /// directory (which must already exist).
    pub fn output_path_for(&self, input: &Path) -> Result<PathBuf, PublishError> {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = self.output_pattern.replace("{filename}", &stem);

        match &self.output_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(PublishError::OutputDirMissing { path: dir.clone() });
                }
                Ok(dir.join(name))
            }
            None => Ok(input.with_file_name(name)),
        }
    }
}

/// Builder for [`PublishConfig`].
#[derive(Debug)]
pub struct PublishConfigBuilder {
    config: PublishConfig,
}

impl PublishConfigBuilder {
    pub fn output_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.output_pattern = pattern.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn override_remote(mut self, v: bool) -> Self {
        self.config.override_remote = v;
        self
    }

    pub fn validate_digest(mut self, v: bool) -> Self {
        self.config.validate_digest = v;
        self
    }

    pub fn uploader(mut self, uploader: Arc<dyn Uploader>) -> Self {
        self.config.uploader = Some(uploader);
        self
    }

    pub fn progress(mut self, callback: ProgressCallback) -> Self {
        self.config.progress = Some(callback);
        self
    }

    /// Build the configuration, validating backend parameters.
    ///
    /// A misconfigured backend fails here, before any file or network I/O.
    pub fn build(self) -> Result<PublishConfig, PublishError> {
        self.config.backend.validate()?;
        if self.config.output_pattern.is_empty() {
            return Err(PublishError::InvalidConfig(
                "output pattern must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Backend configuration ────────────────────────────────────────────────

/// Immutable parameter set fully describing one upload destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BackendConfig {
    /// Amazon S3 (or S3-compatible) object storage.
    S3(S3Options),
    /// The Imgur image host.
    Imgur(ImgurOptions),
}

impl BackendConfig {
    pub(crate) fn validate(&self) -> Result<(), PublishError> {
        match self {
            BackendConfig::S3(opts) => opts.validate(),
            BackendConfig::Imgur(opts) => opts.validate(),
        }
    }
}

/// Object-storage backend options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Options {
    /// Target bucket name. Required.
    pub bucket: String,

    /// Key prefix template. Required. Supports `{filename}` (document stem),
    /// `{parent_0}` (the document's immediate parent directory name), and
    /// `{random_hex}` (a random 8-digit hex token, fresh per document).
    pub key_prefix: String,

    /// Canned ACL attached to each PUT. Default: `private`.
    pub acl: Option<String>,

    /// Custom domain used for URL construction instead of the bucket's
    /// default `<bucket>.s3.amazonaws.com` host. Must not carry a scheme.
    pub custom_domain: Option<String>,

    /// Cache-Control header attached to each PUT.
    /// Default: `public, max-age=31536000`.
    pub cache_control: Option<String>,

    /// AWS region name. Default: `us-east-1`.
    pub region: Option<String>,

    /// Named credentials profile. Used when no explicit key pair is given.
    pub profile: Option<String>,

    /// Explicit credentials. When set, takes precedence over `profile` and
    /// the environment chain.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl S3Options {
    /// Create options with the required fields and the standard defaults.
    pub fn new(bucket: impl Into<String>, key_prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key_prefix: key_prefix.into(),
            acl: Some(DEFAULT_ACL.to_string()),
            custom_domain: None,
            cache_control: Some(DEFAULT_CACHE_CONTROL.to_string()),
            region: None,
            profile: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
        }
    }

    fn validate(&self) -> Result<(), PublishError> {
        if self.bucket.is_empty() {
            return Err(PublishError::InvalidConfig(
                "S3 bucket must not be empty".into(),
            ));
        }
        if self.key_prefix.is_empty() {
            return Err(PublishError::InvalidConfig(
                "S3 key prefix must not be empty".into(),
            ));
        }
        if let Some(domain) = &self.custom_domain {
            if domain.starts_with("http://") || domain.starts_with("https://") {
                return Err(PublishError::InvalidConfig(format!(
                    "custom domain must not carry a scheme: '{domain}'"
                )));
            }
        }
        Ok(())
    }

    /// Expand the key-prefix template for one document and normalise
    /// surrounding slashes.
    pub(crate) fn key_prefix_for(&self, document: &Path) -> String {
        expand_key_prefix(&self.key_prefix, document)
    }
}

/// Image-host backend options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImgurOptions {
    /// OAuth bearer token. Required.
    pub access_token: String,
}

impl ImgurOptions {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    fn validate(&self) -> Result<(), PublishError> {
        if self.access_token.is_empty() {
            return Err(PublishError::InvalidConfig(
                "Imgur access token must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Expand `{filename}` / `{parent_0}` / `{random_hex}` in a key-prefix
/// template against a document path, then strip leading/trailing slashes.
pub(crate) fn expand_key_prefix(template: &str, document: &Path) -> String {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent_0 = document
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut expanded = template
        .replace("{filename}", &stem)
        .replace("{parent_0}", &parent_0);
    if expanded.contains("{random_hex}") {
        let token = format!("{:08x}", rand::thread_rng().gen::<u32>());
        expanded = expanded.replace("{random_hex}", &token);
    }
    expanded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn s3_backend() -> BackendConfig {
        BackendConfig::S3(S3Options::new("b", "docs/{filename}"))
    }

    #[test]
    fn builder_defaults() {
        let config = PublishConfig::builder(s3_backend()).build().unwrap();
        assert_eq!(config.output_pattern, "{filename}.absolute.md");
        assert_eq!(config.concurrency, 1);
        assert!(!config.override_remote);
        assert!(config.validate_digest);
    }

    #[test]
    fn concurrency_is_clamped_to_one() {
        let config = PublishConfig::builder(s3_backend())
            .concurrency(0)
            .build()
            .unwrap();
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn empty_bucket_is_rejected() {
        let err = PublishConfig::builder(BackendConfig::S3(S3Options::new("", "p")))
            .build()
            .unwrap_err();
        assert!(matches!(err, PublishError::InvalidConfig(_)));
    }

    #[test]
    fn empty_key_prefix_is_rejected() {
        let err = PublishConfig::builder(BackendConfig::S3(S3Options::new("b", "")))
            .build()
            .unwrap_err();
        assert!(matches!(err, PublishError::InvalidConfig(_)));
    }

    #[test]
    fn custom_domain_with_scheme_is_rejected() {
        let mut opts = S3Options::new("b", "p");
        opts.custom_domain = Some("https://cdn.example.com".into());
        let err = PublishConfig::builder(BackendConfig::S3(opts))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn empty_imgur_token_is_rejected() {
        let err = PublishConfig::builder(BackendConfig::Imgur(ImgurOptions::new("")))
            .build()
            .unwrap_err();
        assert!(matches!(err, PublishError::InvalidConfig(_)));
    }

    #[test]
    fn output_path_beside_input() {
        let config = PublishConfig::builder(s3_backend()).build().unwrap();
        let out = config
            .output_path_for(Path::new("/notes/post.md"))
            .unwrap();
        assert_eq!(out, PathBuf::from("/notes/post.absolute.md"));
    }

    #[test]
    fn output_path_with_custom_pattern() {
        let config = PublishConfig::builder(s3_backend())
            .output_pattern("{filename}.web.md")
            .build()
            .unwrap();
        let out = config
            .output_path_for(Path::new("/notes/post.md"))
            .unwrap();
        assert_eq!(out, PathBuf::from("/notes/post.web.md"));
    }

    #[test]
    fn missing_output_dir_is_an_error() {
        let config = PublishConfig::builder(s3_backend())
            .output_dir("/definitely/not/a/real/dir")
            .build()
            .unwrap();
        let err = config
            .output_path_for(Path::new("/notes/post.md"))
            .unwrap_err();
        assert!(matches!(err, PublishError::OutputDirMissing { .. }));
    }

    #[test]
    fn key_prefix_expands_filename_and_parent() {
        let expanded = expand_key_prefix("docs/{filename}", Path::new("notes/post.md"));
        assert_eq!(expanded, "docs/post");

        let expanded = expand_key_prefix("{parent_0}/img", Path::new("notes/post.md"));
        assert_eq!(expanded, "notes/img");
    }

    #[test]
    fn key_prefix_strips_surrounding_slashes() {
        let expanded = expand_key_prefix("/blog/assets/", Path::new("post.md"));
        assert_eq!(expanded, "blog/assets");
    }

    #[test]
    fn key_prefix_random_token_is_hex() {
        let expanded = expand_key_prefix("u/{random_hex}", Path::new("post.md"));
        let token = expanded.strip_prefix("u/").unwrap();
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
