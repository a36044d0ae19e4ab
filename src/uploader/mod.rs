//! Upload backends: the pluggable destination for image bytes.
//!
//! The capability surface is a single-operation trait, [`Uploader`]: hand it
//! a local image path, get back the public URL where that image now lives.
//! Which backend is used is decided once, at configuration time, through
//! [`crate::config::BackendConfig`].
//!
//! ## One-time client construction
//!
//! Remote clients (the S3 bucket handle, the HTTP client) are built exactly
//! once per batch inside [`BackendHandle::new`], before any worker starts,
//! and shared read-only. Workers never race to construct a client — the
//! handle is created first and passed in, so no lock is needed at upload
//! time. Per-document [`BackendHandle::uploader_for`] values are cheap
//! views over the shared client carrying document-specific state (the
//! expanded key prefix).

pub mod imgur;
pub mod s3;

use crate::config::{BackendConfig, PublishConfig};
use crate::error::PublishError;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// A destination that can receive one image and return its public URL.
///
/// Implementations are invoked many times concurrently from batch workers
/// and must be internally thread-safe.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload `image` and return the URL at which it is now reachable.
    ///
    /// With `override_remote = false` a backend may skip the transfer when
    /// the remote copy already exists and is unchanged, returning the
    /// existing URL. With `true` the transfer always happens.
    async fn upload(&self, image: &Path, override_remote: bool) -> Result<String, PublishError>;
}

/// The per-batch backend: clients constructed once, shared by every worker.
pub struct BackendHandle {
    inner: Inner,
}

enum Inner {
    S3 {
        bucket: Arc<::s3::Bucket>,
        options: crate::config::S3Options,
        validate_digest: bool,
    },
    Imgur {
        client: reqwest::Client,
        options: crate::config::ImgurOptions,
    },
    /// Caller-supplied uploader (tests, custom destinations).
    Custom(Arc<dyn Uploader>),
}

impl BackendHandle {
    /// Construct the backend clients for one batch.
    ///
    /// Fails with [`PublishError::InvalidConfig`] before any upload I/O when
    /// required parameters are missing or credentials cannot be resolved.
    pub fn new(config: &PublishConfig) -> Result<Self, PublishError> {
        if let Some(uploader) = &config.uploader {
            return Ok(Self {
                inner: Inner::Custom(Arc::clone(uploader)),
            });
        }

        config.backend.validate()?;
        let inner = match &config.backend {
            BackendConfig::S3(options) => Inner::S3 {
                bucket: Arc::new(s3::build_bucket(options)?),
                options: options.clone(),
                validate_digest: config.validate_digest,
            },
            BackendConfig::Imgur(options) => Inner::Imgur {
                // reqwest::Client is an Arc internally; one client serves
                // every worker in the batch.
                client: reqwest::Client::new(),
                options: options.clone(),
            },
        };
        Ok(Self { inner })
    }

    /// The uploader for one document.
    ///
    /// For S3 this expands the key-prefix template (`{filename}`,
    /// `{parent_0}`, `{random_hex}`) against the document path; the
    /// underlying client is shared, not rebuilt.
    pub fn uploader_for(&self, document: &Path) -> Arc<dyn Uploader> {
        match &self.inner {
            Inner::S3 {
                bucket,
                options,
                validate_digest,
            } => Arc::new(s3::S3Uploader::new(
                Arc::clone(bucket),
                options,
                document,
                *validate_digest,
            )),
            Inner::Imgur { client, options } => Arc::new(imgur::ImgurUploader::new(
                client.clone(),
                options.access_token.clone(),
            )),
            Inner::Custom(uploader) => Arc::clone(uploader),
        }
    }
}
