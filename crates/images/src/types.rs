//! Build record types.
//!
//! An [`Image`] is owned by the caller (usually loaded from and saved to the
//! image store). The image builder never creates or destroys records; it only
//! updates the job id, status, and artifact URL fields of the flavor it was
//! asked to build or poll.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AccountId, ComposeJobId, UpdateRecordId};

// ---------------------------------------------------------------------------
// Status and flavor
// ---------------------------------------------------------------------------

/// Internal build status, tracked per flavor and in aggregate on the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageStatus {
    /// Record exists but nothing has been submitted yet.
    #[default]
    Created,
    /// A compose job has been accepted and has not finished.
    Building,
    /// The compose job finished and its artifact is available.
    Success,
    /// The compose job failed.
    Error,
}

impl ImageStatus {
    /// Returns `true` once no further polling can change this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

impl std::fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "CREATED",
            Self::Building => "BUILDING",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------

/// The two kinds of build the compose service is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildFlavor {
    /// A raw OS-tree commit tarball.
    Commit,
    /// A bootable installer ISO that embeds a previously built commit.
    Installer,
}

impl BuildFlavor {
    /// Image type tag sent to the compose service for this flavor.
    pub fn image_type(self) -> &'static str {
        match self {
            Self::Commit => IMAGE_TYPE_COMMIT,
            Self::Installer => IMAGE_TYPE_INSTALLER,
        }
    }
}

impl std::fmt::Display for BuildFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Commit => f.write_str("commit"),
            Self::Installer => f.write_str("installer"),
        }
    }
}

/// Image type tag for OS-tree commit builds.
pub const IMAGE_TYPE_COMMIT: &str = "rhel-edge-commit";

/// Image type tag for installer builds.
pub const IMAGE_TYPE_INSTALLER: &str = "rhel-edge-installer";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A package to be layered into a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name as the distribution knows it.
    pub name: String,
}

/// Commit half of an image record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commit {
    /// Target architecture (e.g. `"x86_64"`). Passed through unvalidated.
    pub arch: String,
    /// Packages layered on top of the base OS.
    pub packages: Vec<Package>,
    /// OS-tree ref the commit is published under. Empty means none.
    pub ostree_ref: String,
    /// URL of the repository holding the parent commit. Empty means none.
    pub ostree_parent_commit: String,
    /// Compose job of the last accepted submission.
    pub compose_job_id: Option<ComposeJobId>,
    /// Status of the commit build alone.
    pub status: ImageStatus,
    /// Location of the finished commit tarball, set once the build succeeds.
    pub image_build_tar_url: Option<String>,
}

impl Commit {
    /// Names of the packages to install, in record order.
    pub fn package_names(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.name.clone()).collect()
    }
}

/// Installer half of an image record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Installer {
    /// Compose job of the last accepted submission.
    pub compose_job_id: Option<ComposeJobId>,
    /// Status of the installer build alone.
    pub status: ImageStatus,
    /// Location of the finished ISO, set once the build succeeds.
    pub image_build_iso_url: Option<String>,
}

/// The build record mutated in place by [`crate::ImageBuilder`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Human-readable image name, used in logs.
    pub name: String,
    /// Tenant that owns the image.
    pub account: AccountId,
    /// Distribution name understood by the compose service (e.g. `"rhel-8"`).
    pub distribution: String,
    /// Aggregate status across both flavors.
    #[serde(default)]
    pub status: ImageStatus,
    /// Commit build state.
    #[serde(default)]
    pub commit: Commit,
    /// Installer build state.
    #[serde(default)]
    pub installer: Installer,
}

impl Image {
    /// Job id stored for `flavor`, if that flavor was ever submitted.
    pub fn compose_job_id(&self, flavor: BuildFlavor) -> Option<&ComposeJobId> {
        match flavor {
            BuildFlavor::Commit => self.commit.compose_job_id.as_ref(),
            BuildFlavor::Installer => self.installer.compose_job_id.as_ref(),
        }
    }

    /// Status of a single flavor.
    pub fn flavor_status(&self, flavor: BuildFlavor) -> ImageStatus {
        match flavor {
            BuildFlavor::Commit => self.commit.status,
            BuildFlavor::Installer => self.installer.status,
        }
    }

    /// Artifact URL of a single flavor, once its build has succeeded.
    pub fn artifact_url(&self, flavor: BuildFlavor) -> Option<&str> {
        match flavor {
            BuildFlavor::Commit => self.commit.image_build_tar_url.as_deref(),
            BuildFlavor::Installer => self.installer.image_build_iso_url.as_deref(),
        }
    }

    /// Records an accepted submission: stores the job id and marks both the
    /// flavor and the aggregate status as building.
    pub fn mark_submitted(&mut self, flavor: BuildFlavor, job_id: ComposeJobId) {
        match flavor {
            BuildFlavor::Commit => {
                self.commit.compose_job_id = Some(job_id);
                self.commit.status = ImageStatus::Building;
            }
            BuildFlavor::Installer => {
                self.installer.compose_job_id = Some(job_id);
                self.installer.status = ImageStatus::Building;
            }
        }
        self.status = ImageStatus::Building;
    }

    /// Records a successful build and its artifact location.
    pub fn mark_succeeded(&mut self, flavor: BuildFlavor, artifact_url: String) {
        match flavor {
            BuildFlavor::Commit => {
                self.commit.status = ImageStatus::Success;
                self.commit.image_build_tar_url = Some(artifact_url);
            }
            BuildFlavor::Installer => {
                self.installer.status = ImageStatus::Success;
                self.installer.image_build_iso_url = Some(artifact_url);
            }
        }
        self.status = ImageStatus::Success;
    }

    /// Records a failed build. The artifact URL is left as it was.
    pub fn mark_failed(&mut self, flavor: BuildFlavor) {
        match flavor {
            BuildFlavor::Commit => self.commit.status = ImageStatus::Error,
            BuildFlavor::Installer => self.installer.status = ImageStatus::Error,
        }
        self.status = ImageStatus::Error;
    }
}

/// The update record an installer is built for.
///
/// Its account and id locate the OS-tree repository the installer embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    /// Record id; selects the repository the installer embeds.
    pub id: UpdateRecordId,
    /// Tenant that owns the record.
    pub account: AccountId,
}

// ---------------------------------------------------------------------------
// Forwarded headers
// ---------------------------------------------------------------------------

/// Request headers propagated verbatim to the compose service.
///
/// Used to carry the caller's tenant identity and auth context. Values are
/// never logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForwardedHeaders(BTreeMap<String, String>);

impl ForwardedHeaders {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no headers to forward.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ForwardedHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Image {
        Image {
            name: "edge-1".to_string(),
            account: AccountId::new("0000001").unwrap(),
            distribution: "rhel-8".to_string(),
            status: ImageStatus::Created,
            commit: Commit::default(),
            installer: Installer::default(),
        }
    }

    #[test]
    fn test_status_serialises_upper_case() {
        assert_eq!(
            serde_json::to_string(&ImageStatus::Building).unwrap(),
            "\"BUILDING\""
        );
        assert_eq!(ImageStatus::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ImageStatus::Created.is_terminal());
        assert!(!ImageStatus::Building.is_terminal());
        assert!(ImageStatus::Success.is_terminal());
        assert!(ImageStatus::Error.is_terminal());
    }

    #[test]
    fn test_flavor_image_types() {
        assert_eq!(BuildFlavor::Commit.image_type(), "rhel-edge-commit");
        assert_eq!(BuildFlavor::Installer.image_type(), "rhel-edge-installer");
    }

    #[test]
    fn test_mark_submitted_touches_only_its_flavor() {
        let mut img = image();
        img.mark_submitted(BuildFlavor::Installer, ComposeJobId::new("j1").unwrap());

        assert_eq!(img.status, ImageStatus::Building);
        assert_eq!(img.installer.status, ImageStatus::Building);
        assert_eq!(img.compose_job_id(BuildFlavor::Installer).unwrap().as_str(), "j1");
        assert_eq!(img.commit, Commit::default());
    }

    #[test]
    fn test_mark_failed_keeps_artifact_url_unset() {
        let mut img = image();
        img.mark_failed(BuildFlavor::Commit);

        assert_eq!(img.status, ImageStatus::Error);
        assert_eq!(img.commit.status, ImageStatus::Error);
        assert!(img.artifact_url(BuildFlavor::Commit).is_none());
    }

    #[test]
    fn test_image_deserialises_with_defaults() {
        let json = r#"{"name":"edge-1","account":"0000001","distribution":"rhel-8"}"#;
        let img: Image = serde_json::from_str(json).unwrap();
        assert_eq!(img, image());
    }

    #[test]
    fn test_forwarded_headers_from_iter() {
        let headers: ForwardedHeaders =
            [("x-rh-identity", "abc"), ("x-request-id", "r1")].into_iter().collect();
        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![("x-request-id", "r1"), ("x-rh-identity", "abc")]
        );
    }
}
