//! JSON shapes exchanged with the compose service.
//!
//! `POST /v1/compose` takes a [`ComposeRequest`] and answers with a
//! [`ComposeResult`]; `GET /v1/composes/{id}` answers with a [`ComposeStatus`].

use serde::{Deserialize, Serialize};

/// Storage backend every build is uploaded to.
pub const UPLOAD_TYPE_AWS_S3: &str = "aws.s3";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of a compose submission.
///
/// Requests built by this crate always carry exactly one image request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customizations: Option<Customizations>,
    /// Distribution to build, e.g. `"rhel-8"`.
    pub distribution: String,
    pub image_requests: Vec<ImageRequest>,
}

/// Changes applied on top of the base image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customizations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
}

/// One image to build and where to upload it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub architecture: String,
    pub image_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ostree: Option<OsTree>,
    pub upload_request: UploadRequest,
}

/// Where an OS-tree based build gets its ref and, optionally, its source repo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsTree {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "ref", default)]
    pub ostree_ref: String,
}

/// Upload target for a finished build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "type")]
    pub upload_type: String,
}

impl UploadRequest {
    /// Upload to the default S3 bucket with no extra options.
    pub fn aws_s3() -> Self {
        Self {
            options: serde_json::Map::new(),
            upload_type: UPLOAD_TYPE_AWS_S3.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Body of a `201 Created` submission response.
///
/// The id is kept raw here; the client rejects an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeResult {
    pub id: String,
}

/// Body of a `200 OK` status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeStatus {
    pub image_status: ComposeImageStatus,
}

/// Build state plus, once uploaded, where the artifact lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeImageStatus {
    pub status: ComposeStatusValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_status: Option<UploadStatus>,
}

impl ComposeImageStatus {
    /// Non-empty upload URL, if the service reported one.
    pub fn upload_url(&self) -> Option<&str> {
        self.upload_status
            .as_ref()
            .and_then(|u| u.options.url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Remote build state as reported by the compose service.
///
/// Values this client does not know decode as [`ComposeStatusValue::Unknown`]
/// and are treated like any other non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposeStatusValue {
    Pending,
    Building,
    Uploading,
    Registering,
    Success,
    Failure,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ComposeStatusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Building => "building",
            Self::Uploading => "uploading",
            Self::Registering => "registering",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Upload progress reported alongside the build state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadStatus {
    #[serde(default)]
    pub options: UploadStatusOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub upload_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadStatusOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
