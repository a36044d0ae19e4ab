//! Single-document publishing: the full extract → resolve → upload →
//! substitute pipeline for one markdown file.
//!
//! Per-document processing is atomic at the output level: the output file
//! is written only after every image has a URL, so a failure part-way
//! leaves no fresh output (already-uploaded images are not rolled back).

use crate::config::PublishConfig;
use crate::error::PublishError;
use crate::output::DocumentResult;
use crate::pipeline::{extract, resolve, substitute};
use crate::uploader::BackendHandle;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Publish a single markdown document.
///
/// Constructs the backend clients, runs the pipeline, writes the rewritten
/// document to the configured output location, and returns the
/// target→URL mapping.
///
/// # Errors
/// * [`PublishError::InvalidConfig`] — before any I/O, when the backend is
///   misconfigured.
/// * [`PublishError::MissingImages`] — before any network call, listing
///   every referenced image absent from disk.
/// * Transport and I/O errors from the individual stages.
pub async fn publish(
    input: impl AsRef<Path>,
    config: &PublishConfig,
) -> Result<DocumentResult, PublishError> {
    let backend = BackendHandle::new(config)?;
    publish_with_backend(input.as_ref(), config, &backend).await
}

/// Pipeline body, reusing an already-constructed backend (the batch
/// orchestrator builds one handle for all documents).
pub(crate) async fn publish_with_backend(
    input: &Path,
    config: &PublishConfig,
    backend: &BackendHandle,
) -> Result<DocumentResult, PublishError> {
    info!("publishing {}", input.display());

    // ── Step 1: Read the document ────────────────────────────────────────
    if !input.is_file() {
        return Err(PublishError::DocumentNotFound {
            path: input.to_path_buf(),
        });
    }
    let text = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| PublishError::DocumentRead {
            path: input.to_path_buf(),
            source: e,
        })?;

    // Computed up front so a missing output directory fails before any
    // upload happens.
    let output = config.output_path_for(input)?;

    // ── Step 2: Extract relative targets ─────────────────────────────────
    let targets = extract::extract_relative_targets(&text);
    debug!("{} distinct relative image(s)", targets.len());

    // ── Step 3: Resolve against the document directory ───────────────────
    let base_dir = input.parent().unwrap_or_else(|| Path::new("."));
    let refs = resolve::resolve_targets(base_dir, &targets)?;

    // ── Step 4: Upload ───────────────────────────────────────────────────
    let uploader = backend.uploader_for(input);
    let mut mapping: Vec<(String, String)> = Vec::with_capacity(refs.len());
    let mut images = BTreeMap::new();
    for image_ref in &refs {
        let url = uploader
            .upload(&image_ref.path, config.override_remote)
            .await?;
        mapping.push((image_ref.raw.clone(), url.clone()));
        images.insert(image_ref.raw.clone(), url);
    }

    // ── Step 5: Substitute and write ─────────────────────────────────────
    let rewritten = substitute::substitute(&text, &mapping);
    substitute::write_output(&output, &rewritten).await?;

    info!(
        "published {} -> {} ({} image(s))",
        input.display(),
        output.display(),
        images.len()
    );

    Ok(DocumentResult {
        input: input.to_path_buf(),
        output,
        images,
    })
}
