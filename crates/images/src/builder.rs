//! The [`ImageBuilder`] port.
//!
//! Callers (API handlers, background pollers, the CLI) depend on this trait
//! only. The concrete client is constructed once at startup and passed in;
//! tests substitute their own implementation.

use async_trait::async_trait;

use crate::{ForwardedHeaders, Image, ImageBuilderError, ImageStatus, UpdateRecord};

/// Submits image builds and folds their progress back into build records.
///
/// Every method performs exactly one request to the compose service. None of
/// them retry or wait; to follow a build, call the matching `get_*_status`
/// method again on the caller's own schedule.
///
/// Each method returns the status of the flavor it touched after the call.
/// On error the record is left unmodified.
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Submits a commit build for `image` and stores the returned job id.
    ///
    /// On success the commit status and the aggregate status become
    /// [`ImageStatus::Building`].
    async fn compose_commit(
        &self,
        image: &mut Image,
        headers: &ForwardedHeaders,
    ) -> Result<ImageStatus, ImageBuilderError>;

    /// Submits an installer build embedding the commit of `image`.
    ///
    /// `update_record` locates the OS-tree repository the installer pulls
    /// the commit from.
    async fn compose_installer(
        &self,
        update_record: &UpdateRecord,
        image: &mut Image,
        headers: &ForwardedHeaders,
    ) -> Result<ImageStatus, ImageBuilderError>;

    /// Polls the commit build once and applies a terminal result to `image`.
    async fn get_commit_status(
        &self,
        image: &mut Image,
        headers: &ForwardedHeaders,
    ) -> Result<ImageStatus, ImageBuilderError>;

    /// Polls the installer build once and applies a terminal result to `image`.
    async fn get_installer_status(
        &self,
        image: &mut Image,
        headers: &ForwardedHeaders,
    ) -> Result<ImageStatus, ImageBuilderError>;
}
