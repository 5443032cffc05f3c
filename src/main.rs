use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reddit_saved_archiver::archiver::{Archiver, Mode};
use reddit_saved_archiver::config::Config;
use reddit_saved_archiver::handlers::MediaFetcher;
use reddit_saved_archiver::reddit::RedditClient;
use reddit_saved_archiver::render::Templates;

/// Location used when running inside the container image.
const DOCKER_LOCATION: &str = "./archive/";

/// Archive Reddit posts and comments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Archive saved or upvoted posts
    #[arg(value_enum)]
    mode: Mode,

    /// Directory path to save archive (ignored when DOCKER=1)
    location: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let cli = Cli::parse();
    let docker = std::env::var("DOCKER").is_ok_and(|v| v == "1");
    let location = resolve_location(cli.location, docker)?;

    info!(mode = %cli.mode, location = %location.display(), "Starting reddit-saved-archiver");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    for dir in ["media", "posts"] {
        let path = location.join(dir);
        tokio::fs::create_dir_all(&path)
            .await
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }

    let templates = Templates::from_config(&config).context("Failed to load templates")?;
    let client = RedditClient::login(&config)
        .await
        .context("Failed to log in to Reddit")?;
    let media = MediaFetcher::new(&config, &location.join("media"))?;

    let archiver = Archiver::new(client, media, templates, &location);
    let summary = archiver.run(cli.mode).await?;

    info!(
        new_posts = summary.new_posts,
        new_comments = summary.new_comments,
        failed = summary.failed,
        "Archiving pass complete"
    );

    Ok(())
}

/// Pick the archive root and check that it is an existing directory.
fn resolve_location(location: Option<PathBuf>, docker: bool) -> Result<PathBuf> {
    let location = if docker {
        PathBuf::from(DOCKER_LOCATION)
    } else {
        location.context("LOCATION is required unless DOCKER=1")?
    };

    if !location.is_dir() {
        bail!("{} is not a directory", location.display());
    }

    Ok(location)
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reddit_saved_archiver=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
