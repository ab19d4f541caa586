//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use image_builder::config::DEFAULT_OSTREE_PROXY_URL;
use image_builder::ImageBuilderConfig;
use images::{BuildFlavor, ImageBuilderError};

/// Submit edge image builds to the compose service and track their status.
#[derive(Debug, Parser)]
#[command(name = "image-builder", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Header forwarded to the compose service, as `NAME:VALUE`. Repeatable.
    #[arg(short = 'H', long = "header", global = true, value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where and how to reach the compose service.
#[derive(Debug, Args)]
pub struct ServiceArgs {
    /// Base URL of the compose service.
    #[arg(long = "url", env = "IMAGE_BUILDER_URL", global = true)]
    pub url: Option<String>,

    /// Base URL installers pull their OS-tree repository from.
    #[arg(
        long,
        env = "IMAGE_BUILDER_OSTREE_PROXY_URL",
        default_value = DEFAULT_OSTREE_PROXY_URL,
        global = true
    )]
    pub ostree_proxy_url: String,

    /// Per-request deadline in seconds.
    #[arg(long, env = "IMAGE_BUILDER_TIMEOUT_SECS", default_value_t = 60, global = true)]
    pub timeout_secs: u64,
}

impl ServiceArgs {
    pub fn to_config(&self) -> Result<ImageBuilderConfig, ImageBuilderError> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| ImageBuilderError::Configuration {
                message: "no image builder URL; pass --url or set IMAGE_BUILDER_URL".to_string(),
            })?;
        Ok(ImageBuilderConfig::new(url)?
            .with_ostree_proxy_url(self.ostree_proxy_url.as_str())?
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a build and record its job id in the image file.
    Compose {
        #[command(subcommand)]
        target: ComposeTarget,
    },
    /// Poll a submitted build and record the outcome in the image file.
    Status(StatusArgs),
}

#[derive(Debug, Subcommand)]
pub enum ComposeTarget {
    /// Build an OS-tree commit.
    Commit {
        /// Image record (JSON), updated in place.
        #[arg(long)]
        image: PathBuf,
    },
    /// Build an installer ISO for an update record.
    Installer {
        /// Image record (JSON), updated in place.
        #[arg(long)]
        image: PathBuf,
        /// Update record (JSON) the installer is built for.
        #[arg(long)]
        update_record: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Which build to poll.
    #[arg(value_enum)]
    pub flavor: Flavor,

    /// Image record (JSON), updated in place.
    #[arg(long)]
    pub image: PathBuf,

    /// Keep polling until the build succeeds or fails.
    #[arg(long)]
    pub watch: bool,

    /// Seconds between polls with --watch.
    #[arg(long, default_value_t = 30, requires = "watch")]
    pub interval: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Flavor {
    Commit,
    Installer,
}

impl From<Flavor> for BuildFlavor {
    fn from(flavor: Flavor) -> Self {
        match flavor {
            Flavor::Commit => BuildFlavor::Commit,
            Flavor::Installer => BuildFlavor::Installer,
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("header '{raw}' must be NAME:VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header '{raw}' has an empty name"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
