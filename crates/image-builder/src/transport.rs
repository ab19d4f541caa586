//! The two calls the compose service offers, behind a trait.
//!
//! [`ComposeTransport`] is the seam tests use to swap the network for a fake.
//! [`HttpComposeTransport`] is the production implementation.

use async_trait::async_trait;
use images::{ComposeJobId, ForwardedHeaders, ImageBuilderError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::ImageBuilderConfig;
use crate::wire::{ComposeRequest, ComposeResult, ComposeStatus};

/// Submission and status retrieval against a compose service.
///
/// Each call is exactly one request. Implementations do not retry.
#[async_trait]
pub trait ComposeTransport: Send + Sync {
    /// Submits `request` and returns the job the service created for it.
    async fn submit(
        &self,
        request: &ComposeRequest,
        headers: &ForwardedHeaders,
    ) -> Result<ComposeResult, ImageBuilderError>;

    /// Fetches the current status of `job_id`.
    async fn get_status(
        &self,
        job_id: &ComposeJobId,
        headers: &ForwardedHeaders,
    ) -> Result<ComposeStatus, ImageBuilderError>;
}

/// [`ComposeTransport`] over HTTP.
///
/// Every request is bounded by the configured timeout. Dropping the returned
/// future cancels the request.
#[derive(Debug, Clone)]
pub struct HttpComposeTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpComposeTransport {
    /// Builds the HTTP client once for the lifetime of the transport.
    pub fn new(config: &ImageBuilderConfig) -> Result<Self, ImageBuilderError> {
        let base_url = Url::parse(config.url()).map_err(|e| ImageBuilderError::Configuration {
            message: format!("invalid image builder URL '{}': {e}", config.url()),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ImageBuilderError::Configuration {
                message: format!("image builder URL '{}' cannot take a path", config.url()),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ImageBuilderError::Configuration {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, base_url })
    }

    /// Appends `segments` to the base URL, percent-encoding each one so a
    /// `/`, `?` or `#` inside a segment stays part of it.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl ComposeTransport for HttpComposeTransport {
    async fn submit(
        &self,
        request: &ComposeRequest,
        headers: &ForwardedHeaders,
    ) -> Result<ComposeResult, ImageBuilderError> {
        let url = self.endpoint(&["v1", "compose"]);
        let header_map = header_map(headers)?;
        info!(url = %url, "Requesting image builder");

        let response = self
            .client
            .post(url.clone())
            .headers(header_map)
            .json(request)
            .send()
            .await
            .map_err(|e| request_error(url.as_str(), e))?;

        decode_body(url.as_str(), response, StatusCode::CREATED).await
    }

    async fn get_status(
        &self,
        job_id: &ComposeJobId,
        headers: &ForwardedHeaders,
    ) -> Result<ComposeStatus, ImageBuilderError> {
        let url = self.endpoint(&["v1", "composes", job_id.as_str()]);
        let header_map = header_map(headers)?;
        info!(url = %url, "Requesting image builder");

        let response = self
            .client
            .get(url.clone())
            .headers(header_map)
            .send()
            .await
            .map_err(|e| request_error(url.as_str(), e))?;

        decode_body(url.as_str(), response, StatusCode::OK).await
    }
}

/// Forwarded headers plus `Content-Type: application/json`.
fn header_map(headers: &ForwardedHeaders) -> Result<HeaderMap, ImageBuilderError> {
    let mut map = HeaderMap::with_capacity(headers.len() + 1);
    for (name, value) in headers.iter() {
        let invalid = || ImageBuilderError::InvalidHeader {
            name: name.to_string(),
        };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.append(header_name, header_value);
    }
    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(map)
}

/// Checks the status code, then decodes the JSON body.
async fn decode_body<T: DeserializeOwned>(
    url: &str,
    response: Response,
    expected: StatusCode,
) -> Result<T, ImageBuilderError> {
    let status = response.status();
    if status != expected {
        let body = response.text().await.unwrap_or_default();
        warn!(url = %url, status = status.as_u16(), "Unexpected image builder response");
        return Err(ImageBuilderError::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let body = response.bytes().await.map_err(|e| request_error(url, e))?;
    serde_json::from_slice(&body).map_err(|e| ImageBuilderError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn request_error(url: &str, error: reqwest::Error) -> ImageBuilderError {
    if error.is_timeout() {
        ImageBuilderError::Timeout {
            url: url.to_string(),
        }
    } else {
        ImageBuilderError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
