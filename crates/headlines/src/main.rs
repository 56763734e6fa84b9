use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use shared::io::get_default_log_path;
use shared::{
    logging, ArticleStore, Config, CycleState, FeedSource, HttpFeedSource, SqliteStore,
    SyncOrchestrator,
};
use std::path::PathBuf;
use tracing::info;

mod app;
mod ui;

#[derive(Parser)]
#[command(name = "headlines")]
#[command(about = "Read the latest articles from all your RSS feeds in one list")]
struct Args {
    /// Path to the config file (default: ~/.config/headlines/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Refresh once, print the list and exit
    #[arg(long)]
    once: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    if args.once {
        logging::init_stderr(&args.log_level)?;
    } else {
        logging::init_file(&get_default_log_path()?, &args.log_level)?;
    }

    if config.rss_feeds.is_empty() {
        eprintln!("No feeds configured yet; add some to rss_feeds in your config.json");
    }

    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    let source = HttpFeedSource::new()?;
    let orchestrator = SyncOrchestrator::new(source, store, config.rss_feeds.clone())
        .with_interval(config.refresh_interval());

    let store = orchestrator.store();
    info!(
        "Opened {} with {} cached articles",
        store.path().display(),
        store.count()?
    );

    if args.once {
        return print_once(&orchestrator).await;
    }

    app::App::new(ui::RenderConfig::default())
        .run(orchestrator)
        .await
}

async fn print_once<F: FeedSource, S: ArticleStore>(
    orchestrator: &SyncOrchestrator<F, S>,
) -> Result<()> {
    let outcome = orchestrator.run_cycle().await;

    let Some(articles) = outcome.articles.as_ref() else {
        anyhow::bail!(outcome.summary());
    };

    let now = Utc::now();
    for row in shared::articles::articles_to_rows(articles, now) {
        println!(
            "{:>4}  {:<12}  {:<16}  {}",
            row.position, row.source, row.relative_time, row.title
        );
    }

    if outcome.state == CycleState::CacheOnly || !outcome.diagnostics.is_empty() {
        eprintln!("\n{}", outcome.summary());
    }

    Ok(())
}
