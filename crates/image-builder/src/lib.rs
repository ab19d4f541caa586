//! Image builder compose service client adapter.
//!
//! Implements the [`images::ImageBuilder`] trait against the compose service's
//! HTTP API:
//!
//! - `POST {base}/v1/compose` submits a build and answers `201` with a job id.
//! - `GET {base}/v1/composes/{id}` answers `200` with the job's status.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Request construction, wire types, HTTP transport, and
//! the mapping of remote statuses onto build records all live here. The
//! [`images`] crate sees only [`images::ImageBuilder`].
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`wire`] | Compose request / result / status JSON shapes |
//! | [`request`] | Builds a compose request for the commit or installer flavor |
//! | [`transport`] | `ComposeTransport` trait and its reqwest implementation |
//! | [`status`] | Applies a remote status to a build record |
//! | [`client`] | `ImageBuilderClient`, the `ImageBuilder` implementation |
//! | [`config`] | Base URL, installer repository proxy, timeouts |
//!
//! There is no retry or polling loop in this crate. Callers poll by calling
//! the status operations again.

pub mod client;
pub mod config;
pub mod request;
pub mod status;
pub mod transport;
pub mod wire;

pub use client::ImageBuilderClient;
pub use config::ImageBuilderConfig;
pub use request::{commit_request, installer_repo_url, installer_request};
pub use status::apply_compose_status;
pub use transport::{ComposeTransport, HttpComposeTransport};
pub use wire::{
    ComposeImageStatus, ComposeRequest, ComposeResult, ComposeStatus, ComposeStatusValue,
    Customizations, ImageRequest, OsTree, UploadRequest, UploadStatus, UploadStatusOptions,
};
