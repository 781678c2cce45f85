//! Eco market arbitrage tool entry point.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::{Args as ClapArgs, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use eco_arb::arbitrage::{good_deals, DealMonitor};
use eco_arb::config::{parse_currency_list, Config};
use eco_arb::crafting::CraftingPipeline;
use eco_arb::discord::run_bot;
use eco_arb::market::{
    save_snapshot, EcoClient, MarketSource, RecipeFile, RecipeSource, SnapshotSource,
};
use eco_arb::metrics;
use eco_arb::report::{
    render_crafting, render_monitor_event, render_professions, render_terminal, ReportPipeline,
    ReportRequest, CRAFTING_LIMIT,
};
use eco_arb::utils::shutdown_signal;

/// Eco market arbitrage reports.
#[derive(Parser, Debug)]
#[command(name = "eco-arb")]
#[command(about = "Find cross-store trade opportunities on an Eco server")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a one-off report (default).
    Report(ReportArgs),

    /// Watch for good deals appearing and disappearing.
    Monitor {
        /// Seconds between checks.
        #[arg(long)]
        interval: Option<u64>,

        /// Minimum total profit (per-unit profit times tradeable quantity)
        /// for a good deal. Deals with unknown quantity use per-unit profit.
        #[arg(long)]
        threshold: Option<Decimal>,
    },

    /// Find profitable crafts, or rank professions.
    Crafting(CraftingArgs),

    /// Run the Discord bot with scheduled reports.
    Bot,

    /// Save the raw store payload to a file for offline reports.
    Snapshot {
        /// Output path.
        path: PathBuf,

        /// Save the recipe payload instead.
        #[arg(long)]
        recipes: bool,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[derive(ClapArgs, Debug, Default)]
struct ReportArgs {
    /// Maximum opportunities to show.
    #[arg(short, long)]
    limit: Option<usize>,

    /// Only include this currency (repeatable, or comma-separated).
    #[arg(short, long = "currency")]
    currencies: Vec<String>,

    /// Minimum per-unit profit.
    #[arg(long)]
    min_profit: Option<Decimal>,

    /// Read stores from a snapshot file instead of the server.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Add trade sizing and category breakdown.
    #[arg(short, long)]
    detailed: bool,
}

#[derive(ClapArgs, Debug)]
struct CraftingArgs {
    /// Rank professions by demand instead of listing crafts.
    #[arg(short, long)]
    professions: bool,

    /// Maximum crafts to show.
    #[arg(short, long, default_value_t = CRAFTING_LIMIT)]
    limit: usize,

    /// Only include this currency (repeatable, or comma-separated).
    #[arg(short, long = "currency")]
    currencies: Vec<String>,

    /// Read stores from a snapshot file instead of the server.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Read recipes from a file saved with `snapshot --recipes`.
    #[arg(long)]
    recipes_file: Option<PathBuf>,
}

fn currency_set(raw: &[String]) -> BTreeSet<String> {
    raw.iter().flat_map(|r| parse_currency_list(r)).collect()
}

impl ReportArgs {
    fn request(&self) -> ReportRequest {
        let currencies = currency_set(&self.currencies);

        ReportRequest {
            limit: self.limit,
            currencies: (!currencies.is_empty()).then_some(currencies),
            min_profit: self.min_profit,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration (reads .env before the log filter looks at RUST_LOG)
    let config = Config::load();

    // Initialize logging
    let json = config
        .as_ref()
        .map(|c| c.log_format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    init_logging(args.verbose, json);

    // Initialize metrics
    metrics::init_metrics();

    if let Some(Command::CheckConfig) = args.command {
        return cmd_check_config(config);
    }

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        eco_arb::AppError::from(e)
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    if let Some(port) = config.metrics_port {
        metrics::install_exporter(port)?;
    }

    // Handle subcommands
    match args.command {
        Some(Command::Report(report)) => cmd_report(&config, report).await,
        Some(Command::Monitor {
            interval,
            threshold,
        }) => cmd_monitor(&config, interval, threshold).await,
        Some(Command::Crafting(crafting)) => cmd_crafting(&config, crafting).await,
        Some(Command::Bot) => Ok(run_bot(config).await?),
        Some(Command::Snapshot { path, recipes }) => cmd_snapshot(&config, path, recipes).await,
        Some(Command::CheckConfig) => Ok(()),
        None => cmd_report(&config, ReportArgs::default()).await,
    }
}

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("eco_arb=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

/// Check configuration validity.
fn cmd_check_config(config: Result<Config, envy::Error>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ECO ARB - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match config {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Discord settings are only needed by the bot
    print!("Checking Discord settings... ");
    match config.validate_discord() {
        Ok(()) => println!("OK"),
        Err(e) => println!("NOT SET ({}; `bot` will not start)", e),
    }

    // Show configuration summary
    let currencies = config.currencies();
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Stores URL: {}", config.stores_url()?);
    println!("  Recipes URL: {}", config.recipes_url()?);
    println!("  HTTP Timeout: {}s", config.http_timeout_secs);
    println!("  Min Profit: {} per unit", config.min_profit);
    println!(
        "  Currencies: {}",
        if currencies.is_empty() {
            "all".to_string()
        } else {
            currencies.into_iter().collect::<Vec<_>>().join(", ")
        }
    );
    println!("  Report Limit: {}", config.report_limit);
    println!("  Liquidity Margin: {}", config.liquidity_margin);
    println!("  Report Interval: {} min", config.report_interval_minutes);
    println!(
        "  Monitor: >= {} total profit every {}s",
        config.monitor_threshold, config.monitor_interval_secs
    );
    println!("  Excluded Buyers: {}", config.excluded_buyer_stores);
    println!(
        "  Metrics Port: {}",
        config
            .metrics_port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "disabled".to_string())
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print a one-off report.
async fn cmd_report(config: &Config, args: ReportArgs) -> anyhow::Result<()> {
    let request = args.request();
    match &args.file {
        Some(path) => {
            info!("Reading stores from {}", path.display());
            let source = SnapshotSource::new(path.clone());
            print_report(config, source, &request, args.detailed).await
        }
        None => {
            let source = EcoClient::new(config)?;
            info!("Fetching stores from {}", source.stores_url());
            print_report(config, source, &request, args.detailed).await
        }
    }
}

async fn print_report<S: MarketSource>(
    config: &Config,
    source: S,
    request: &ReportRequest,
    detailed: bool,
) -> anyhow::Result<()> {
    let pipeline = ReportPipeline::new(source, config.engine_config(), config.report_limit);

    let report = pipeline.run(request).await.map_err(|e| {
        error!("Market data unavailable: {}", e);
        eco_arb::AppError::from(e)
    })?;

    print!("{}", render_terminal(&report, detailed));
    Ok(())
}

/// Watch for good deals.
async fn cmd_monitor(
    config: &Config,
    interval: Option<u64>,
    threshold: Option<Decimal>,
) -> anyhow::Result<()> {
    let interval = Duration::from_secs(interval.unwrap_or(config.monitor_interval_secs).max(1));
    let threshold = threshold.unwrap_or(config.monitor_threshold);

    let pipeline = ReportPipeline::new(
        EcoClient::new(config)?,
        config.monitor_engine_config(),
        usize::MAX,
    );
    let request = ReportRequest::default();

    info!("========================================");
    info!("ECO DEAL MONITOR STARTED");
    info!("========================================");
    info!("Threshold: {} total profit per deal", threshold);
    info!("Interval: {}s", interval.as_secs());
    info!("========================================");

    let mut monitor = DealMonitor::new();
    let mut ticker = tokio::time::interval(interval);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("Monitor stopped");
                break;
            }
        }

        println!("[{}] Checking for deals...", Local::now().format("%H:%M:%S"));

        match pipeline.run(&request).await {
            Ok(report) => {
                let deals = good_deals(&report.scan.opportunities, threshold);
                let event = monitor.observe(&deals);
                println!("{}", render_monitor_event(&event, threshold));
            }
            Err(e) => {
                // Keep the previous book; a failed fetch is not "all deals gone".
                warn!("Market data unavailable, will retry: {}", e);
            }
        }
    }

    Ok(())
}

/// Analyze crafting profit.
async fn cmd_crafting(config: &Config, args: CraftingArgs) -> anyhow::Result<()> {
    let client = EcoClient::new(config)?;
    match (&args.file, &args.recipes_file) {
        (Some(stores), Some(recipes)) => {
            let stores = SnapshotSource::new(stores.clone());
            print_crafting(config, &args, stores, RecipeFile::new(recipes.clone())).await
        }
        (Some(stores), None) => {
            let stores = SnapshotSource::new(stores.clone());
            print_crafting(config, &args, stores, client).await
        }
        (None, Some(recipes)) => {
            print_crafting(config, &args, client, RecipeFile::new(recipes.clone())).await
        }
        (None, None) => {
            info!("Fetching recipes from {}", client.recipes_url());
            print_crafting(config, &args, client.clone(), client).await
        }
    }
}

async fn print_crafting<S: MarketSource, R: RecipeSource>(
    config: &Config,
    args: &CraftingArgs,
    stores: S,
    recipes: R,
) -> anyhow::Result<()> {
    let mut crafting = config.crafting_config();
    let currencies = currency_set(&args.currencies);
    if !currencies.is_empty() {
        crafting.currencies = currencies;
    }
    let excluded = crafting.excluded_buyers.clone();

    let pipeline = CraftingPipeline::new(stores, recipes, crafting);
    let scan = pipeline.run().await.map_err(|e| {
        error!("Market data unavailable: {}", e);
        eco_arb::AppError::from(e)
    })?;

    if args.professions {
        print!("{}", render_professions(&scan, &excluded));
    } else {
        print!("{}", render_crafting(&scan, args.limit));
    }
    Ok(())
}

/// Save the raw store or recipe payload.
async fn cmd_snapshot(config: &Config, path: PathBuf, recipes: bool) -> anyhow::Result<()> {
    let client = EcoClient::new(config)?;

    let payload = if recipes {
        info!("Fetching recipes from {}", client.recipes_url());
        client.fetch_recipes_raw().await
    } else {
        info!("Fetching stores from {}", client.stores_url());
        client.fetch_raw().await
    }
    .map_err(eco_arb::AppError::from)?;

    save_snapshot(&path, &payload)
        .await
        .map_err(eco_arb::AppError::from)?;

    let what = if recipes { "recipe" } else { "store" };
    println!("Saved {} snapshot to {}", what, path.display());
    Ok(())
}
