//! Domain model for edge image builds.
//!
//! This crate holds the build record an image builder updates, the internal
//! status model, the newtype identifiers, the error taxonomy, and the
//! [`ImageBuilder`] port. Infrastructure crates implement the port; they never
//! add domain rules.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ComposeJobId`, `AccountId`, `UpdateRecordId`) |
//! | [`types`] | Build records, status, flavor, forwarded headers |
//! | [`errors`] | `ImageBuilderError` |
//! | [`builder`] | The `ImageBuilder` port trait |

pub mod builder;
pub mod errors;
pub mod identifiers;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use builder::ImageBuilder;
pub use errors::ImageBuilderError;
pub use identifiers::{AccountId, ComposeJobId, UpdateRecordId};
pub use types::{
    BuildFlavor, Commit, ForwardedHeaders, Image, ImageStatus, Installer, Package, UpdateRecord,
    IMAGE_TYPE_COMMIT, IMAGE_TYPE_INSTALLER,
};
