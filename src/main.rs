use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songshelf::artwork::{ArtworkCache, ItunesClient, ITUNES_API_BASE};
use songshelf::catalog::{load_songs, CatalogStore};
use songshelf::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_LOOKUP_TIMEOUT_SEC, DEFAULT_MARGIN_ROWS,
    DEFAULT_VIEWPORT_ROWS,
};
use songshelf::search::SearchController;
use songshelf::terminal::{Repl, TerminalView};
use songshelf::viewport::VisibilityScheduler;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path or http(s) URL of the songs.json catalogue.
    pub catalogue: Option<String>,

    /// Path to a TOML config file. Its values override the CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the artwork lookup service.
    #[clap(long, default_value = ITUNES_API_BASE)]
    pub lookup_base_url: String,

    /// Timeout in seconds for artwork lookups.
    #[clap(long, default_value_t = DEFAULT_LOOKUP_TIMEOUT_SEC)]
    pub lookup_timeout_sec: u64,

    /// Number of result rows shown per page.
    #[clap(long, default_value_t = DEFAULT_VIEWPORT_ROWS)]
    pub viewport_rows: usize,

    /// Rows above and below the page that already trigger artwork loading.
    #[clap(long, default_value_t = DEFAULT_MARGIN_ROWS)]
    pub margin_rows: usize,

    /// Initial query, the whole catalogue is shown when omitted.
    #[clap(short, long, default_value = "")]
    pub query: String,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            catalogue: self.catalogue.clone(),
            lookup_base_url: self.lookup_base_url.clone(),
            lookup_timeout_sec: self.lookup_timeout_sec,
            viewport_rows: self.viewport_rows,
            margin_rows: self.margin_rows,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let lookup = Arc::new(
        ItunesClient::new(&config.lookup.base_url, config.lookup.timeout_sec)
            .context("Failed to create artwork lookup client")?,
    );
    info!("Artwork lookups via {}", config.lookup.base_url);

    let view = Arc::new(TerminalView::new(config.viewport.region()));
    let cache = Arc::new(ArtworkCache::new(lookup));
    let scheduler = Arc::new(VisibilityScheduler::new(cache, view.clone()));
    let store = Arc::new(CatalogStore::new());
    let controller = Arc::new(SearchController::new(
        store.clone(),
        scheduler.clone(),
        view.clone(),
    ));

    match load_songs(&config.catalogue).await {
        Ok(songs) => {
            store.load(songs);
            controller.apply_query(&cli_args.query);
        }
        // The session stays usable with an empty catalogue.
        Err(e) => controller.catalogue_error(&e),
    }

    let repl = Repl::new(controller, scheduler, view);
    tokio::task::spawn_blocking(move || repl.run())
        .await
        .context("REPL task failed")?
}
