//! # md2abs
//!
//! Publish Markdown documents by uploading their relative images to a
//! remote store and rewriting every link to the resulting absolute URL.
//!
//! ## Why this crate?
//!
//! Markdown written locally references images by relative path
//! (`![chart](img/chart.png)`), which breaks the moment the document leaves
//! its directory — pasted into a CMS, a gist, an email. md2abs is the
//! "publish" step: it pushes each referenced image to S3 or Imgur and emits
//! a self-contained document whose image links work anywhere.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document.md
//!  │
//!  ├─ 1. Extract     distinct relative image targets (naive `![..](..)` scan)
//!  ├─ 2. Resolve     percent-decode, anchor to the document dir, verify on disk
//!  ├─ 3. Upload      S3 (HEAD-before-PUT skip policy) or Imgur (multipart POST)
//!  ├─ 4. Substitute  every occurrence of every target → its URL
//!  └─ 5. Output      document.absolute.md + target→URL mapping
//! ```
//!
//! Batches run the whole per-document pipeline concurrently across a
//! bounded worker pool; per-document failures are isolated and reported in
//! a final summary.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2abs::{publish, BackendConfig, PublishConfig, S3Options};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PublishConfig::builder(BackendConfig::S3(
//!         S3Options::new("my-bucket", "blog/{filename}"),
//!     ))
//!     .build()?;
//!
//!     let result = publish("notes/post.md", &config).await?;
//!     println!("wrote {}", result.output.display());
//!     for (target, url) in &result.images {
//!         println!("  {target} -> {url}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2abs` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! md2abs = { version = "0.2", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod publish;
pub mod uploader;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{discover_documents, publish_batch};
pub use config::{
    BackendConfig, ImgurOptions, PublishConfig, PublishConfigBuilder, S3Options, DEFAULT_EXCLUDE,
    DEFAULT_GLOB, DEFAULT_OUTPUT_PATTERN,
};
pub use error::PublishError;
pub use output::{BatchSummary, DocumentFailure, DocumentResult};
pub use progress::{NoopProgressCallback, ProgressCallback, PublishProgressCallback};
pub use publish::publish;
pub use uploader::{BackendHandle, Uploader};
