mod collaborators;
mod history;
mod pipeline;
mod preview;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shelfpost_core::AppConfig;
use shelfpost_state::StateStore;
use tracing::Instrument as _;
use tracing_subscriber::EnvFilter;

use crate::collaborators::{Catalog, Generator, NoPublish, Publisher};
use crate::pipeline::{Pipeline, RunOutcome};

#[derive(Debug, Parser)]
#[command(name = "shelfpost")]
#[command(about = "Reviews one catalog title and posts it as a Bluesky thread")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Pick an unprocessed title, review it, and publish the thread
    Run {
        /// Stop before publishing and print the planned thread
        #[arg(long)]
        dry_run: bool,
    },
    /// Split text into a thread without calling any service
    Preview {
        /// URL appended to the final message
        #[arg(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
        link: String,
        /// Read the text from this file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Text to split; read from stdin when omitted
        text: Vec<String>,
    },
    /// Show counters and the most recently published titles
    State {
        /// Number of recent entries to list
        #[arg(long, default_value_t = history::DEFAULT_RECENT)]
        recent: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = shelfpost_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Run { dry_run }) => run(&config, dry_run).await,
        None => run(&config, false).await,
        Some(Commands::Preview { link, file, text }) => {
            let input = preview::read_input(file.as_deref(), &text)?;
            let plan = preview::preview_plan(&config, &input, &link);
            print!(
                "{}",
                preview::render_plan(&plan, config.thread.max_message_length)
            );
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::State { recent }) => {
            let state = StateStore::new(&config.state_path).load();
            print!("{}", history::render_state(&state, recent));
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(config: &AppConfig, dry_run: bool) -> anyhow::Result<ExitCode> {
    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id, dry_run);

    async {
        let store = StateStore::new(&config.state_path);
        let source = Catalog::from_config(config)?;
        let generator = Generator::from_config(config)?;

        let outcome = if dry_run {
            Pipeline {
                config,
                store: &store,
                source,
                generator,
                publisher: NoPublish,
            }
            .run(true)
            .await
        } else {
            Pipeline {
                config,
                store: &store,
                source,
                generator,
                publisher: Publisher::from_config(config)?,
            }
            .run(false)
            .await
        };

        if let RunOutcome::Previewed { plan } = &outcome {
            print!(
                "{}",
                preview::render_plan(plan, config.thread.max_message_length)
            );
        }
        tracing::info!(outcome = outcome_label(&outcome), "run finished");
        Ok::<_, anyhow::Error>(ExitCode::from(outcome.exit_status()))
    }
    .instrument(span)
    .await
}

fn outcome_label(outcome: &RunOutcome) -> &'static str {
    match outcome {
        RunOutcome::Published { .. } => "published",
        RunOutcome::Previewed { .. } => "previewed",
        RunOutcome::NoCandidates => "no_candidates",
        RunOutcome::CatalogFailed => "catalog_failed",
        RunOutcome::IncompleteDetail => "incomplete_detail",
        RunOutcome::GenerationFailed => "generation_failed",
        RunOutcome::PublishFailed => "publish_failed",
    }
}

#[cfg(test)]
mod tests;
