//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for signing in, harvesting the
//! catalog, and diffing two harvested snapshots.

use catalog_harvest::browser::webdriver::build_http_client;
use catalog_harvest::browser::{
    check_webdriver, load_cookies, save_cookies, Navigator, WebDriverSession,
};
use catalog_harvest::catalog::{load_tree, save_tree};
use catalog_harvest::config::{load_config_with_hash, validate_root_url, Config};
use catalog_harvest::diff::{diff_trees, write_summary, DiffArtifactWriter, DiffSummary};
use catalog_harvest::extract::Extractor;
use catalog_harvest::traversal::{authenticate, login, Orchestrator, LOGIN_POLL};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: a component catalog scraper and snapshot differ
///
/// Harvests a JavaScript-rendered component catalog through a WebDriver
/// browser session and compares harvested snapshots to surface changes.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A component catalog scraper and snapshot differ", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
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
    /// Open a visible browser, wait for a manual sign-in, and save the cookies
    Login {
        /// Catalog root page (overrides `site.root-url`)
        #[arg(long, value_name = "URL")]
        root_url: Option<String>,

        /// Where to save the cookies (overrides `output.cookies-path`)
        #[arg(long, value_name = "FILE")]
        cookies: Option<PathBuf>,
    },

    /// Harvest the whole catalog into a JSON tree
    Scrape {
        /// Catalog root page (overrides `site.root-url`)
        #[arg(long, value_name = "URL")]
        root_url: Option<String>,

        /// Saved cookies from `login` (overrides `output.cookies-path`)
        #[arg(long, value_name = "FILE")]
        cookies: Option<PathBuf>,

        /// Where to write the tree (overrides `output.tree-path`)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Compare two harvested trees and write diff artifacts
    Diff {
        /// The older snapshot
        #[arg(value_name = "OLD")]
        old: PathBuf,

        /// The newer snapshot
        #[arg(value_name = "NEW")]
        new: PathBuf,

        /// Artifact directory (overrides `output.diff-dir`)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::debug!("No configuration file given; using defaults");
            Config::default()
        }
    };

    match cli.command {
        Command::Login { root_url, cookies } => handle_login(&config, root_url, cookies).await,
        Command::Scrape {
            root_url,
            cookies,
            output,
        } => handle_scrape(&config, root_url, cookies, output).await,
        Command::Diff { old, new, out } => handle_diff(&config, &old, &new, out),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Picks the root URL from the command line or the config, and checks it
fn resolve_root_url(
    config: &Config,
    flag: Option<String>,
) -> Result<String, Box<dyn std::error::Error>> {
    let root_url = flag.unwrap_or_else(|| config.site.root_url.clone());
    if root_url.trim().is_empty() {
        return Err("no root URL: pass --root-url or set site.root-url".into());
    }
    Ok(validate_root_url(&root_url)?.to_string())
}

/// Fails early with a clear message when the WebDriver server is down
async fn ensure_webdriver(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_http_client()?;
    let status = check_webdriver(&client, &config.webdriver.url).await?;
    if !status.ready {
        tracing::warn!(
            "WebDriver at {} reports not ready: {}",
            config.webdriver.url,
            status.message
        );
    }
    Ok(())
}

/// Handles `login`: waits for a manual sign-in and saves the session
async fn handle_login(
    config: &Config,
    root_url: Option<String>,
    cookies: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let root_url = resolve_root_url(config, root_url)?;
    let cookies_path = cookies.unwrap_or_else(|| PathBuf::from(&config.output.cookies_path));

    ensure_webdriver(config).await?;
    let session = WebDriverSession::connect(&config.webdriver, false).await?;
    let mut nav = Navigator::open(session, config.timeouts.budgets());

    println!("Sign in to {} in the browser window.", root_url);
    let result = login(
        &mut nav,
        &root_url,
        &config.selectors.category_section,
        LOGIN_POLL,
    )
    .await;

    if let Err(e) = nav.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }

    let cookies = result?;
    save_cookies(&cookies, &cookies_path)?;
    println!("✓ Session saved to {}", cookies_path.display());

    Ok(())
}

/// Handles `scrape`: harvests the catalog with a saved session
async fn handle_scrape(
    config: &Config,
    root_url: Option<String>,
    cookies: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let root_url = resolve_root_url(config, root_url)?;
    let cookies_path = cookies.unwrap_or_else(|| PathBuf::from(&config.output.cookies_path));
    let output_path = output.unwrap_or_else(|| PathBuf::from(&config.output.tree_path));

    // A missing session is fatal before any browser is started
    let cookies = load_cookies(&cookies_path)?;
    let extractor = Extractor::new(&config.selectors, config.reveal.wait_policy())?;

    ensure_webdriver(config).await?;
    let session = WebDriverSession::connect(&config.webdriver, config.webdriver.headless).await?;
    let mut nav = Navigator::open(session, config.timeouts.budgets());

    if let Err(e) = authenticate(&mut nav, &root_url, &cookies).await {
        tracing::error!("Failed to restore session: {}", e);
        if let Err(close_err) = nav.close().await {
            tracing::warn!("Failed to close browser session: {}", close_err);
        }
        return Err(e.into());
    }

    let mut orchestrator = Orchestrator::new(nav, extractor);
    let result = orchestrator.harvest(&root_url).await;
    let stats = orchestrator.stats().clone();

    let mut nav = orchestrator.into_navigator();
    if let Err(e) = nav.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }

    let tree = match result {
        Ok(tree) => tree,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    save_tree(&tree, &output_path)?;
    println!("✓ Catalog saved to {} ({})", output_path.display(), stats);

    Ok(())
}

/// Handles `diff`: compares two snapshots and writes the artifacts
fn handle_diff(
    config: &Config,
    old: &Path,
    new: &Path,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = out.unwrap_or_else(|| PathBuf::from(&config.output.diff_dir));

    let old_tree = load_tree(old)?;
    let new_tree = load_tree(new)?;

    let records = diff_trees(&old_tree, &new_tree);
    let summary = DiffSummary::from_records(&records);
    tracing::info!("{} vs {}: {}", old.display(), new.display(), summary);

    let writer = DiffArtifactWriter::new(&out_dir, config.output.max_identifier_len);
    let artifacts = writer.write_all(&records)?;
    let summary_path = write_summary(&records, &artifacts, &out_dir)?;

    println!("{}", summary);
    println!("✓ Summary written to {}", summary_path.display());

    Ok(())
}
