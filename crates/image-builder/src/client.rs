//! [`ImageBuilderClient`]: the [`ImageBuilder`] implementation.

use async_trait::async_trait;
use images::{
    BuildFlavor, ComposeJobId, ForwardedHeaders, Image, ImageBuilder, ImageBuilderError,
    ImageStatus, UpdateRecord,
};
use tracing::info;

use crate::config::ImageBuilderConfig;
use crate::request::{commit_request, installer_request};
use crate::status::apply_compose_status;
use crate::transport::{ComposeTransport, HttpComposeTransport};
use crate::wire::ComposeRequest;

/// Drives builds through a [`ComposeTransport`] and records the outcome on
/// the caller's [`Image`].
#[derive(Debug, Clone)]
pub struct ImageBuilderClient<T = HttpComposeTransport> {
    transport: T,
    ostree_proxy_url: String,
}

impl ImageBuilderClient<HttpComposeTransport> {
    /// Client talking HTTP to the service described by `config`.
    pub fn from_config(config: &ImageBuilderConfig) -> Result<Self, ImageBuilderError> {
        Ok(Self::new(
            HttpComposeTransport::new(config)?,
            config.ostree_proxy_url(),
        ))
    }
}

impl<T: ComposeTransport> ImageBuilderClient<T> {
    /// Client over any transport; installer builds pull commits via `ostree_proxy_url`.
    pub fn new(transport: T, ostree_proxy_url: impl Into<String>) -> Self {
        Self {
            transport,
            ostree_proxy_url: ostree_proxy_url.into(),
        }
    }

    #[tracing::instrument(skip(self, request, image, headers), fields(image = %image.name))]
    async fn compose(
        &self,
        flavor: BuildFlavor,
        request: ComposeRequest,
        image: &mut Image,
        headers: &ForwardedHeaders,
    ) -> Result<ImageStatus, ImageBuilderError> {
        let result = self.transport.submit(&request, headers).await?;
        let job_id =
            ComposeJobId::new(result.id).ok_or_else(|| ImageBuilderError::MalformedSuccess {
                reason: "compose response carried an empty job id".to_string(),
            })?;

        info!(job_id = %job_id, "Compose job accepted");
        image.mark_submitted(flavor, job_id);
        Ok(image.flavor_status(flavor))
    }

    #[tracing::instrument(skip(self, image, headers), fields(image = %image.name))]
    async fn poll(
        &self,
        flavor: BuildFlavor,
        image: &mut Image,
        headers: &ForwardedHeaders,
    ) -> Result<ImageStatus, ImageBuilderError> {
        let job_id = image
            .compose_job_id(flavor)
            .ok_or(ImageBuilderError::MissingJobId { flavor })?;

        let status = self.transport.get_status(job_id, headers).await?;
        info!(
            job_id = %job_id,
            remote_status = %status.image_status.status,
            "Got compose status"
        );

        apply_compose_status(image, flavor, &status)
    }
}

#[async_trait]
impl<T: ComposeTransport> ImageBuilder for ImageBuilderClient<T> {
    async fn compose_commit(
        &self,
        image: &mut Image,
        headers: &ForwardedHeaders,
    ) -> Result<ImageStatus, ImageBuilderError> {
        let request = commit_request(image);
        self.compose(BuildFlavor::Commit, request, image, headers).await
    }

    async fn compose_installer(
        &self,
        update_record: &UpdateRecord,
        image: &mut Image,
        headers: &ForwardedHeaders,
    ) -> Result<ImageStatus, ImageBuilderError> {
        let request = installer_request(image, update_record, &self.ostree_proxy_url);
        self.compose(BuildFlavor::Installer, request, image, headers).await
    }

    async fn get_commit_status(
        &self,
        image: &mut Image,
        headers: &ForwardedHeaders,
    ) -> Result<ImageStatus, ImageBuilderError> {
        self.poll(BuildFlavor::Commit, image, headers).await
    }

    async fn get_installer_status(
        &self,
        image: &mut Image,
        headers: &ForwardedHeaders,
    ) -> Result<ImageStatus, ImageBuilderError> {
        self.poll(BuildFlavor::Installer, image, headers).await
    }
}
