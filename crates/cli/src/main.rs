//! Edge image builder CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: flags backed by `IMAGE_BUILDER_*` environment
//!    variables, resolved once into an `ImageBuilderConfig`.
//! 2. **Wire observability**: install a `tracing-subscriber` fmt layer
//!    (optionally JSON). All spans and events from every crate flow through it.
//! 3. **Construct infrastructure**: build one `ImageBuilderClient` and hand it
//!    to the subcommands as `&dyn ImageBuilder`.
//! 4. **Run the subcommand**: `compose commit|installer` or
//!    `status commit|installer [--watch]`.

mod args;
mod commands;
mod observability;
mod records;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use image_builder::ImageBuilderClient;
use images::{BuildFlavor, ForwardedHeaders, Image, ImageBuilder, ImageStatus};

use crate::args::{Cli, Command, ComposeTarget};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    observability::init(cli.log_json);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.service.to_config()?;
    let client = ImageBuilderClient::from_config(&config)?;
    let builder: &dyn ImageBuilder = &client;
    let headers: ForwardedHeaders = cli.headers.into_iter().collect();

    match cli.command {
        Command::Compose { target } => {
            let (flavor, image) = match target {
                ComposeTarget::Commit { image } => (
                    BuildFlavor::Commit,
                    commands::compose_commit(builder, &image, &headers).await?,
                ),
                ComposeTarget::Installer {
                    image,
                    update_record,
                } => (
                    BuildFlavor::Installer,
                    commands::compose_installer(builder, &image, &update_record, &headers)
                        .await?,
                ),
            };
            report(&image, flavor);
            Ok(())
        }
        Command::Status(status) => {
            let flavor = BuildFlavor::from(status.flavor);
            let watch = status.watch.then(|| Duration::from_secs(status.interval));
            let image =
                commands::poll_status(builder, flavor, &status.image, &headers, watch).await?;
            report(&image, flavor);
            anyhow::ensure!(
                image.flavor_status(flavor) != ImageStatus::Error,
                "{flavor} build of '{}' failed",
                image.name
            );
            Ok(())
        }
    }
}

fn report(image: &Image, flavor: BuildFlavor) {
    let job = image
        .compose_job_id(flavor)
        .map_or_else(|| "-".to_string(), ToString::to_string);
    println!(
        "{} {flavor} job={job} status={}",
        image.name,
        image.flavor_status(flavor)
    );
    if let Some(url) = image.artifact_url(flavor) {
        println!("{url}");
    }
}
