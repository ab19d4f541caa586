//! Folds a remote compose status into an image record.

use images::{BuildFlavor, Image, ImageBuilderError, ImageStatus};

use crate::wire::{ComposeStatus, ComposeStatusValue};

/// Applies `status` to the `flavor` half of `image` and returns that flavor's
/// status afterwards.
///
/// | Remote status | Effect |
/// |---------------|--------|
/// | `success` | flavor and aggregate become `SUCCESS`, artifact URL stored |
/// | `failure` | flavor and aggregate become `ERROR` |
/// | anything else, including unrecognised values | no change |
///
/// A `success` without an upload URL is rejected with
/// [`ImageBuilderError::MalformedSuccess`] and the record is left untouched.
pub fn apply_compose_status(
    image: &mut Image,
    flavor: BuildFlavor,
    status: &ComposeStatus,
) -> Result<ImageStatus, ImageBuilderError> {
    let image_status = &status.image_status;
    match image_status.status {
        ComposeStatusValue::Success => {
            let url = image_status
                .upload_url()
                .ok_or_else(|| ImageBuilderError::MalformedSuccess {
                    reason: format!("{flavor} build reported success without an upload URL"),
                })?;
            image.mark_succeeded(flavor, url.to_string());
        }
        ComposeStatusValue::Failure => image.mark_failed(flavor),
        ComposeStatusValue::Pending
        | ComposeStatusValue::Building
        | ComposeStatusValue::Uploading
        | ComposeStatusValue::Registering
        | ComposeStatusValue::Unknown => {}
    }
    Ok(image.flavor_status(flavor))
}
