//! diffscribe: model-assisted review of branch diffs.
//!
//! Entry point for the `diffscribe` binary. Wires together the config
//! layers, the git worker facade, the completion gateway, and the review
//! pipeline, then writes the report to stdout or a file.

use std::fs::File;
use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use diffscribe::config::{self, Cli, Commands, ReviewArgs};
use diffscribe::git::DiffSource;
use diffscribe::pipeline;
use diffscribe_openai::OpenAiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so a report written to stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("diffscribe=info")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::ReviewChanges(args) => review_changes(args).await,
    }
}

async fn review_changes(args: ReviewArgs) -> Result<()> {
    let file_defaults = config::load_file_config();
    let settings = config::ReviewConfig::resolve(&args, &file_defaults)?;
    let endpoint = config::resolve_endpoint(&args, &file_defaults);

    let gateway = OpenAiClient::new(endpoint, &args.api_key, settings.model.clone())
        .context("could not construct the completion client")?;
    let git = DiffSource::open(&args.repo);

    let mut sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("could not create output file {path:?}"))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    let outcome =
        pipeline::run_review(&git, &gateway, &settings, &args.base, &args.target, sink.as_mut())
            .await?;
    sink.flush()?;

    tracing::info!(?outcome, "review run finished");
    Ok(())
}
