//! Settings for reaching the compose service.

use std::time::Duration;

use images::ImageBuilderError;

/// Base of the repository URL an installer pulls its commit from.
///
/// The full URL is `{ostree_proxy_url}/{account}/{update_record_id}/repo`.
pub const DEFAULT_OSTREE_PROXY_URL: &str =
    "http://s3httpproxy-env.eba-zswvuamp.us-east-2.elasticbeanstalk.com";

/// Deadline for a whole request, from connect to the last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Deadline for establishing the TCP/TLS connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolved once at startup and handed to [`crate::HttpComposeTransport`] and
/// [`crate::ImageBuilderClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuilderConfig {
    url: String,
    ostree_proxy_url: String,
    timeout: Duration,
    connect_timeout: Duration,
}

impl ImageBuilderConfig {
    /// Creates a config for the service at `url` with default timeouts.
    ///
    /// `url` must be an absolute `http` or `https` URL. A trailing `/` is
    /// dropped so paths can be appended directly.
    pub fn new(url: impl Into<String>) -> Result<Self, ImageBuilderError> {
        Ok(Self {
            url: validate_base_url(url.into(), "image builder URL")?,
            ostree_proxy_url: DEFAULT_OSTREE_PROXY_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    /// Overrides the installer repository proxy base.
    pub fn with_ostree_proxy_url(
        mut self,
        url: impl Into<String>,
    ) -> Result<Self, ImageBuilderError> {
        self.ostree_proxy_url = validate_base_url(url.into(), "OS-tree proxy URL")?;
        Ok(self)
    }

    /// Overrides the whole-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the connection establishment timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Base URL of the compose service, without a trailing `/`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Base URL installers use to fetch commits, without a trailing `/`.
    pub fn ostree_proxy_url(&self) -> &str {
        &self.ostree_proxy_url
    }

    /// Upper bound on a single request, including reading the body.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Upper bound on establishing a connection.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

fn validate_base_url(raw: String, what: &str) -> Result<String, ImageBuilderError> {
    let parsed = reqwest::Url::parse(&raw).map_err(|e| ImageBuilderError::Configuration {
        message: format!("invalid {what} '{raw}': {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ImageBuilderError::Configuration {
            message: format!("{what} '{raw}' must use http or https"),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImageBuilderConfig::new("http://image-builder:8080").unwrap();
        assert_eq!(config.url(), "http://image-builder:8080");
        assert_eq!(config.ostree_proxy_url(), DEFAULT_OSTREE_PROXY_URL);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.connect_timeout(), DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ImageBuilderConfig::new("https://ib.example.com/api/image-builder/")
            .unwrap()
            .with_ostree_proxy_url("http://proxy/")
            .unwrap();
        assert_eq!(config.url(), "https://ib.example.com/api/image-builder");
        assert_eq!(config.ostree_proxy_url(), "http://proxy");
    }

    #[test]
    fn test_rejects_relative_url() {
        let err = ImageBuilderConfig::new("image-builder/api").unwrap_err();
        assert!(matches!(err, ImageBuilderError::Configuration { .. }));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = ImageBuilderConfig::new("ftp://image-builder").unwrap_err();
        assert!(matches!(err, ImageBuilderError::Configuration { .. }));
    }

    #[test]
    fn test_timeout_overrides() {
        let config = ImageBuilderConfig::new("http://ib")
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(1));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.connect_timeout(), Duration::from_secs(1));
    }
}
