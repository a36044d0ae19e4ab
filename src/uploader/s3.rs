//! Object-storage backend: keyed PUTs with a conditional-upload policy.
//!
//! The remote key is `<expanded_prefix>/<basename>`; the public URL is
//! `https://<host>/<encoded key>` where the host is either a configured
//! custom domain or the bucket's default `<bucket>.s3.amazonaws.com`.
//!
//! ## Conditional uploads
//!
//! Unless overriding, a HEAD request decides whether the PUT can be
//! skipped:
//!
//! * object missing → upload;
//! * object present, digest validation off or no ETag reported → skip;
//! * object present, remote ETag equals the local MD5 → skip;
//! * ETags differ → the content drifted, upload and overwrite.
//!
//! Any HEAD failure other than "not found" is fatal for the document and
//! propagates untouched.

use crate::config::S3Options;
use crate::error::PublishError;
use crate::uploader::Uploader;
use async_trait::async_trait;
use md5::{Digest, Md5};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Encode everything except unreserved characters and the key separator,
/// matching how object keys appear in canonical S3 URLs.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

const DEFAULT_REGION: &str = "us-east-1";

/// Build the shared bucket client for a batch.
///
/// Cache-Control and ACL headers are attached to the client once so every
/// PUT carries them.
pub(crate) fn build_bucket(options: &S3Options) -> Result<Bucket, PublishError> {
    let region: Region = options
        .region
        .as_deref()
        .unwrap_or(DEFAULT_REGION)
        .parse()
        .map_err(|e| PublishError::InvalidConfig(format!("invalid S3 region: {e}")))?;

    let credentials = resolve_credentials(options)?;

    let mut bucket = Bucket::new(&options.bucket, region, credentials)
        .map_err(|e| PublishError::InvalidConfig(format!("failed to initialise S3 client: {e}")))?;

    if let Some(cache_control) = &options.cache_control {
        bucket.add_header("Cache-Control", cache_control);
    }
    if let Some(acl) = &options.acl {
        bucket.add_header("x-amz-acl", acl);
    }

    Ok(bucket)
}

/// Credential chain: explicit key pair, else named profile, else the
/// default environment/profile/instance chain.
fn resolve_credentials(options: &S3Options) -> Result<Credentials, PublishError> {
    let credentials = match (&options.access_key_id, &options.secret_access_key) {
        (Some(access_key), Some(secret_key)) => Credentials::new(
            Some(access_key),
            Some(secret_key),
            options.session_token.as_deref(),
            None,
            None,
        ),
        _ => match &options.profile {
            Some(profile) => Credentials::from_profile(Some(profile)),
            None => Credentials::default(),
        },
    };
    credentials
        .map_err(|e| PublishError::InvalidConfig(format!("could not resolve AWS credentials: {e}")))
}

/// Uploader for one document: shared bucket client plus the
/// document-expanded key prefix.
pub struct S3Uploader {
    bucket: Arc<Bucket>,
    key_prefix: String,
    host: String,
    validate_digest: bool,
}

impl S3Uploader {
    pub fn new(
        bucket: Arc<Bucket>,
        options: &S3Options,
        document: &Path,
        validate_digest: bool,
    ) -> Self {
        let host = options
            .custom_domain
            .clone()
            .unwrap_or_else(|| format!("{}.s3.amazonaws.com", options.bucket));
        Self {
            bucket,
            key_prefix: options.key_prefix_for(document),
            host,
            validate_digest,
        }
    }

    async fn probe_remote(&self, key: &str) -> Result<RemoteProbe, PublishError> {
        // Depending on transport, a missing object surfaces either as an Ok
        // carrying a 404 status or as an HTTP-failure error; both mean
        // "not found" here.
        match self.bucket.head_object(key).await {
            Ok((_, 404)) => Ok(RemoteProbe::Missing),
            Ok((head, _)) => Ok(RemoteProbe::Exists {
                etag: head.e_tag.map(|t| t.trim_matches('"').to_string()),
            }),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(RemoteProbe::Missing),
            Err(e) => Err(PublishError::RemoteCheckFailed {
                key: key.to_string(),
                detail: e.to_string(),
            }),
        }
    }

    async fn put(&self, key: &str, bytes: &[u8], image: &Path) -> Result<(), PublishError> {
        let content_type = mime_guess::from_path(image).first_or_octet_stream();
        self.bucket
            .put_object_with_content_type(key, bytes, content_type.as_ref())
            .await
            .map_err(|e| PublishError::UploadFailed {
                path: image.to_path_buf(),
                detail: e.to_string(),
            })?;
        Ok(())
    }
}

#[async_trait]
impl Uploader for S3Uploader {
    async fn upload(&self, image: &Path, override_remote: bool) -> Result<String, PublishError> {
        let key = object_key(&self.key_prefix, image);
        let url = public_url(&self.host, &key);

        if !override_remote {
            let probe = self.probe_remote(&key).await?;
            match upload_decision(&probe, self.validate_digest) {
                Decision::Skip => {
                    debug!("object already present, skipping: {key}");
                    return Ok(url);
                }
                Decision::CompareDigest { remote_etag } => {
                    let bytes = read_image(image).await?;
                    if md5_hex(&bytes) == remote_etag {
                        debug!("object unchanged, skipping: {key}");
                        return Ok(url);
                    }
                    debug!("content drifted, overwriting: {key}");
                    self.put(&key, &bytes, image).await?;
                    return Ok(url);
                }
                Decision::Upload => {}
            }
        }

        let bytes = read_image(image).await?;
        self.put(&key, &bytes, image).await?;
        debug!("uploaded {} -> {url}", image.display());
        Ok(url)
    }
}

// ── Policy ───────────────────────────────────────────────────────────────

/// What a HEAD request reported about the target key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RemoteProbe {
    Missing,
    Exists { etag: Option<String> },
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    Upload,
    Skip,
    CompareDigest { remote_etag: String },
}

/// Skip/upload decision for a non-overriding run.
pub(crate) fn upload_decision(probe: &RemoteProbe, validate_digest: bool) -> Decision {
    match probe {
        RemoteProbe::Missing => Decision::Upload,
        RemoteProbe::Exists { etag: None } => Decision::Skip,
        RemoteProbe::Exists { etag: Some(_) } if !validate_digest => Decision::Skip,
        RemoteProbe::Exists { etag: Some(t) } => Decision::CompareDigest {
            remote_etag: t.clone(),
        },
    }
}

// ── Key and URL construction ─────────────────────────────────────────────

pub(crate) fn object_key(prefix: &str, image: &Path) -> String {
    let name = image
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}/{name}")
    }
}

pub(crate) fn public_url(host: &str, key: &str) -> String {
    format!("https://{host}/{}", utf8_percent_encode(key, KEY_ENCODE_SET))
}

fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}

async fn read_image(path: &Path) -> Result<Vec<u8>, PublishError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| PublishError::ImageRead {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_joins_prefix_and_basename() {
        assert_eq!(
            object_key("docs/post", Path::new("./img/a.png")),
            "docs/post/a.png"
        );
        assert_eq!(object_key("", Path::new("a.png")), "a.png");
    }

    #[test]
    fn url_for_default_bucket_host() {
        // The worked example: bucket `b`, prefix `docs/{filename}` for
        // `notes/post.md`, image `./img/a.png`.
        let prefix = crate::config::expand_key_prefix("docs/{filename}", Path::new("notes/post.md"));
        let key = object_key(&prefix, Path::new("./img/a.png"));
        let url = public_url("b.s3.amazonaws.com", &key);
        assert_eq!(url, "https://b.s3.amazonaws.com/docs/post/a.png");
    }

    #[test]
    fn url_encodes_key_characters() {
        let url = public_url("b.s3.amazonaws.com", "docs/my image+1.png");
        assert_eq!(url, "https://b.s3.amazonaws.com/docs/my%20image%2B1.png");
    }

    #[test]
    fn decision_uploads_when_missing() {
        assert_eq!(upload_decision(&RemoteProbe::Missing, true), Decision::Upload);
        assert_eq!(upload_decision(&RemoteProbe::Missing, false), Decision::Upload);
    }

    #[test]
    fn decision_skips_when_present_without_etag() {
        let probe = RemoteProbe::Exists { etag: None };
        assert_eq!(upload_decision(&probe, true), Decision::Skip);
    }

    #[test]
    fn decision_skips_when_validation_disabled() {
        let probe = RemoteProbe::Exists {
            etag: Some("abc".into()),
        };
        assert_eq!(upload_decision(&probe, false), Decision::Skip);
    }

    #[test]
    fn decision_compares_digest_when_validating() {
        let probe = RemoteProbe::Exists {
            etag: Some("abc".into()),
        };
        assert_eq!(
            upload_decision(&probe, true),
            Decision::CompareDigest {
                remote_etag: "abc".into()
            }
        );
    }

    #[test]
    fn md5_hex_matches_known_digest() {
        // `md5 -s "hello"`
        assert_eq!(md5_hex(b"hello"), "5d41402abc4b2a76b9719d911017c592");
    }
}
