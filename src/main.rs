use anyhow::{Context, Result};
use clap::Parser;
use feedpager::app::App;
use feedpager::config::Config;
use feedpager::content::{ContentPipeline, FailurePolicy};
use feedpager::feed::{self, FeedCollection};
use feedpager::keybindings::KeybindingRegistry;
use feedpager::ui;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "feedpager", about = "Read RSS and Atom feeds as scrollable terminal text")]
struct Args {
    /// Feed URLs to read (overrides `feed_urls` from the config file)
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Config file to load instead of the default search paths
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Read a local feed document instead of fetching (repeatable)
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Append log output to this file
    #[arg(long, value_name = "PATH", default_value = "feedpager.log")]
    log_file: PathBuf,

    /// Show a plain-text fallback instead of exiting when an entry fails to render
    #[arg(long)]
    fallback: bool,
}

/// Route tracing output to a file so the TUI owns the terminal.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file '{}'", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn load_feeds(args: &Args, config: &Config) -> Result<FeedCollection> {
    if !args.files.is_empty() {
        return feed::load_files(args.files.as_slice()).context("Failed to load feed files");
    }

    let urls = if args.urls.is_empty() {
        &config.feed_urls
    } else {
        &args.urls
    };
    tracing::info!(feeds = urls.len(), "Fetching feeds");

    let client = feed::http_client().context("Failed to build HTTP client")?;
    feed::fetch_all(
        &client,
        urls,
        Duration::from_secs(config.fetch_timeout_secs),
    )
    .await
    .context("Failed to fetch feeds")
}

async fn run(args: Args) -> Result<()> {
    let config = Config::discover(args.config.as_deref()).context("Failed to load configuration")?;
    let style = config.style().context("Invalid color in configuration")?;

    let policy = if args.fallback {
        FailurePolicy::Fallback
    } else {
        config.on_render_error
    };
    let pipeline = ContentPipeline::with_palette(config.theme_variant().palette(), policy);
    tracing::debug!(policy = ?pipeline.policy(), "Render failure policy");

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }

    let feeds = load_feeds(&args, &config).await?;
    tracing::info!(
        feeds = feeds.len(),
        items = feeds.iter().map(|f| f.len()).sum::<usize>(),
        "Feeds loaded"
    );

    let mut app = App::new(feeds, style, pipeline, keybindings);
    ui::run(&mut app).await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_file) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    if let Err(e) = run(args).await {
        tracing::error!(error = %format!("{e:#}"), "Fatal error");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
