//! Menu-Scout main entry point
//!
//! This is the command-line interface for the Menu-Scout crawler and
//! menu source monitor.

use clap::{Parser, Subcommand, ValueEnum};
use menu_scout::clock::SystemClock;
use menu_scout::config::{load_config_with_hash, Config};
use menu_scout::crawler::{HttpTransport, ReqwestTransport};
use menu_scout::extract::Page;
use menu_scout::monitor::{PdftotextExtractor, SourceMonitor};
use menu_scout::output::{print_json, print_sweep_stats, write_review};
use menu_scout::robots::{RobotsCache, RobotsGate, RobotsSettings};
use menu_scout::storage::{open_storage, FsBaselineStore, SourceStore, SourceType};
use menu_scout::{ContactInfoMiner, MenuFinder, MenuScraper, PageFetcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Menu-Scout: a polite restaurant-website crawler
///
/// Menu-Scout finds menus and contact details on restaurant websites while
/// respecting robots.txt, and watches known menu sources for changes.
#[derive(Parser, Debug)]
#[command(name = "menu-scout")]
#[command(version = "1.0.0")]
#[command(about = "A polite restaurant-website crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show robots.txt evidence for a URL
    Robots { url: String },

    /// Discover menu PDFs and HTML menu pages, then extract menu text
    Menus {
        url: String,

        /// Page budget (defaults to crawler.max-menu-pages)
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Collect contact details from a restaurant website
    Contacts {
        url: String,

        /// Page budget (defaults to crawler.max-contact-pages)
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Register a menu source for monitoring
    AddSource {
        url: String,

        #[arg(long, value_enum)]
        kind: SourceKind,
    },

    /// Check every active source and diff the ones that changed
    Sweep,

    /// Compute (if pending) and show a change review
    Diff { review_id: i64 },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SourceKind {
    Pdf,
    Html,
}

impl From<SourceKind> for SourceType {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Pdf => SourceType::Pdf,
            SourceKind::Html => SourceType::Html,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => load(path)?,
        None => Config::default(),
    };

    let result = run(cli.command, config).await;
    if let Err(e) = &result {
        tracing::error!("{}", e);
    }
    result
}

fn load(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("menu_scout=info,warn"),
            1 => EnvFilter::new("menu_scout=debug,info"),
            2 => EnvFilter::new("menu_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Shared HTTP plumbing for one process
struct Services {
    transport: Arc<dyn HttpTransport>,
    robots: Arc<RobotsGate>,
}

impl Services {
    fn new(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new(&config.user_agent)?);
        let cache = RobotsCache::new(config.robots.cache_ttl(), Arc::new(SystemClock));
        let robots = Arc::new(RobotsGate::new(
            transport.clone(),
            RobotsSettings::from_config(config),
            cache,
        ));
        Ok(Self { transport, robots })
    }

    fn page_fetcher(&self, config: &Config) -> PageFetcher {
        PageFetcher::from_config(config, self.transport.clone(), self.robots.clone())
    }
}

async fn run(command: Command, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let services = Services::new(&config)?;

    match command {
        Command::Robots { url } => {
            let evidence = services.robots.evidence(&url).await;
            print_json(&evidence)?;
        }
        Command::Menus { url, max_pages } => {
            let fetcher = services.page_fetcher(&config);
            let max_pages = max_pages.unwrap_or(config.crawler.max_menu_pages);

            let discovery = MenuFinder::new(&fetcher).find_menus(&url, max_pages).await?;
            let pages: Vec<Page> = discovery
                .html_menu_pages
                .iter()
                .cloned()
                .map(Page::from)
                .collect();
            let menu = MenuScraper::new(&fetcher).scrape(pages).await;

            print_json(&serde_json::json!({
                "discovery": discovery,
                "menu": menu,
            }))?;
        }
        Command::Contacts { url, max_pages } => {
            let fetcher = services.page_fetcher(&config);
            let max_pages = max_pages.unwrap_or(config.crawler.max_contact_pages);

            let evidence = ContactInfoMiner::new(&fetcher)
                .extract(&url, max_pages)
                .await?;
            print_json(&evidence)?;
        }
        Command::AddSource { url, kind } => {
            let mut store = open_storage(Path::new(&config.storage.database_path))?;
            let id = store.insert_source(&url, kind.into())?;
            println!("Registered source {} ({})", id, url);
        }
        Command::Sweep => {
            let mut monitor = build_monitor(&config, &services)?;
            let stats = monitor.sweep().await?;
            print_sweep_stats(&stats)?;
        }
        Command::Diff { review_id } => {
            let mut monitor = build_monitor(&config, &services)?;
            monitor.diff_review(review_id).await?;
            let review = monitor.store().get_review(review_id)?;
            write_review(&mut std::io::stdout().lock(), &review)?;
        }
    }

    Ok(())
}

fn build_monitor(
    config: &Config,
    services: &Services,
) -> Result<SourceMonitor, Box<dyn std::error::Error>> {
    let store = open_storage(Path::new(&config.storage.database_path))?;
    let baselines = FsBaselineStore::new(&config.storage.baseline_dir)?;

    Ok(SourceMonitor::new(
        config,
        services.transport.clone(),
        services.robots.clone(),
        Box::new(store),
        Box::new(baselines),
        Arc::new(PdftotextExtractor::new()),
    ))
}
