//! Subcommand bodies.
//!
//! Each command loads the record files it needs, calls the injected
//! [`ImageBuilder`], and writes the image record back when it changed.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use images::{BuildFlavor, ForwardedHeaders, Image, ImageBuilder, ImageStatus, UpdateRecord};
use tracing::info;

use crate::records;

/// Submits a commit build for the image stored at `image_path`.
pub async fn compose_commit(
    builder: &dyn ImageBuilder,
    image_path: &Path,
    headers: &ForwardedHeaders,
) -> Result<Image> {
    let mut image: Image = records::load(image_path)?;
    builder
        .compose_commit(&mut image, headers)
        .await
        .with_context(|| format!("failed to submit commit build for '{}'", image.name))?;
    records::save(image_path, &image)?;
    Ok(image)
}

/// Submits an installer build for the image stored at `image_path`.
pub async fn compose_installer(
    builder: &dyn ImageBuilder,
    image_path: &Path,
    update_record_path: &Path,
    headers: &ForwardedHeaders,
) -> Result<Image> {
    let update_record: UpdateRecord = records::load(update_record_path)?;
    let mut image: Image = records::load(image_path)?;
    builder
        .compose_installer(&update_record, &mut image, headers)
        .await
        .with_context(|| format!("failed to submit installer build for '{}'", image.name))?;
    records::save(image_path, &image)?;
    Ok(image)
}

/// Polls the `flavor` build once, or every `watch` until it is terminal.
pub async fn poll_status(
    builder: &dyn ImageBuilder,
    flavor: BuildFlavor,
    image_path: &Path,
    headers: &ForwardedHeaders,
    watch: Option<Duration>,
) -> Result<Image> {
    let mut image: Image = records::load(image_path)?;
    loop {
        let before = image.clone();
        let status = poll_once(builder, flavor, &mut image, headers)
            .await
            .with_context(|| format!("failed to poll {flavor} build of '{}'", image.name))?;
        if image != before {
            records::save(image_path, &image)?;
        }
        info!(flavor = %flavor, status = %status, "Polled build");

        match watch {
            Some(interval) if !status.is_terminal() => tokio::time::sleep(interval).await,
            _ => return Ok(image),
        }
    }
}

async fn poll_once(
    builder: &dyn ImageBuilder,
    flavor: BuildFlavor,
    image: &mut Image,
    headers: &ForwardedHeaders,
) -> Result<ImageStatus, images::ImageBuilderError> {
    match flavor {
        BuildFlavor::Commit => builder.get_commit_status(image, headers).await,
        BuildFlavor::Installer => builder.get_installer_status(image, headers).await,
    }
}
