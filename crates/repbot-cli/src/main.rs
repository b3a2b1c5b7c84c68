//! repbot - run the reputation pipeline on a schedule.
//!
//! There is no network platform client in this workspace, so the binary
//! drives the in-memory platform seeded from a JSON fixture. That makes it a
//! dry run of exactly the code a real client would be plugged into.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use repbot_core::impls::InMemoryPlatform;
use repbot_core::{BotConfig, PipelineBuilder, PollLoop};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Reputation label bot
#[derive(Parser, Debug)]
#[command(name = "repbot")]
#[command(about = "Poll for rating commands and update reputation labels")]
struct Args {
    /// TOML config file (REPBOT_* environment variables override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON fixture with submissions, comments and labels to run against
    #[arg(long)]
    fixture: PathBuf,

    /// Stop after this many cycles (default: run until Ctrl-C)
    #[arg(long)]
    cycles: Option<usize>,

    /// Print the final labels as JSON on exit
    #[arg(long, default_value_t = false)]
    dump_labels: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repbot_core=info,repbot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = BotConfig::load(args.config.as_deref()).context("loading configuration")?;
    info!(
        community = %config.community,
        interval_secs = config.interval_secs,
        fetch_limit = config.fetch_limit,
        "configuration loaded"
    );

    let fixture = std::fs::read_to_string(&args.fixture)
        .with_context(|| format!("reading fixture {:?}", args.fixture))?;
    let platform = Arc::new(
        InMemoryPlatform::from_fixture(&fixture, config.bot_username.clone())
            .context("parsing fixture")?,
    );

    let mut poll = PollLoop::new(config.interval(), config.fetch_limit);
    if let Some(n) = args.cycles {
        poll = poll.max_cycles(n);
    }
    let pipeline = PipelineBuilder::new(config)
        .platform(Arc::clone(&platform))
        .build()?;
    let handle = poll.spawn(pipeline);

    let summary = if args.cycles.is_some() {
        handle.join().await?
    } else {
        tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
        info!("shutdown requested, finishing current cycle");
        handle.shutdown_and_join().await?
    };
    info!(?summary, "stopped");

    if args.dump_labels {
        let labels: Vec<_> = platform
            .labels()
            .await
            .into_iter()
            .map(|(community, user, entry)| {
                serde_json::json!({ "community": community, "user": user, "label": entry.text })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&labels)?);
    }
    Ok(())
}
