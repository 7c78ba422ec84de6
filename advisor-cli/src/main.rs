//! Advisor CLI: watchlist checks, retroactive validation and research.
//!
//! Commands:
//! - `check`: evaluate the watchlist, print buy/sell lists, save buys
//! - `validate`: check saved recommendations against later prices
//! - `correlation`: correlation of two assets' closes
//! - `beta`: correlation and beta of several assets against a benchmark

use std::path::{Path, PathBuf};

use advisor_core::data::{fetch_series, AssetType, DataProvider};
use advisor_core::{EvaluationState, PriceSeries, Recommendation};
use advisor_runner::{
    beta_table, correlation, run_batch, validate_saved, AdvisorConfig, AssetOutcome, BatchReport,
    RecommendationStore, ValidationOutcome, WatchlistEntry,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "advisor", about = "Risk-adjusted buy/sell advisor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every watchlist asset and report buy and sell candidates.
    Check {
        /// Path to the advisor TOML config.
        #[arg(long)]
        config: PathBuf,

        /// Evaluate as of this date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Do not write the buy list to the recommendations directory.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Check recommendations saved on DATE against prices since then.
    Validate {
        #[arg(long)]
        config: PathBuf,

        /// Date the recommendations were saved for (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,

        /// Last date of prices to compare. Defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Correlation of two assets' closing prices.
    Correlation {
        #[arg(long)]
        config: PathBuf,

        #[arg(long)]
        a: String,

        #[arg(long)]
        b: String,

        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Correlation and beta of daily changes against a benchmark.
    Beta {
        #[arg(long)]
        config: PathBuf,

        #[arg(long)]
        benchmark: String,

        /// Symbols to compare. Defaults to the whole watchlist.
        symbols: Vec<String>,

        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check {
            config,
            as_of,
            no_save,
        } => run_check(&config, as_of.unwrap_or_else(today), !no_save),
        Commands::Validate {
            config,
            date,
            today: until,
        } => run_validate(&config, date, until.unwrap_or_else(today)),
        Commands::Correlation { config, a, b, as_of } => {
            run_correlation(&config, &a, &b, as_of.unwrap_or_else(today))
        }
        Commands::Beta {
            config,
            benchmark,
            symbols,
            as_of,
        } => run_beta(&config, &benchmark, symbols, as_of.unwrap_or_else(today)),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn load_config(path: &Path) -> Result<AdvisorConfig> {
    AdvisorConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
}

fn provider_for(config: &AdvisorConfig) -> Result<Box<dyn DataProvider>> {
    config
        .data
        .provider()
        .context("cannot set up the data provider")
}

fn run_check(config_path: &Path, as_of: NaiveDate, save: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = provider_for(&config)?;
    let report = run_batch(&config, provider.as_ref(), as_of)?;

    print_report(&report);

    if save {
        let store = RecommendationStore::new(&config.recommendations_dir);
        let buys: Vec<Recommendation> = report.buys().into_iter().cloned().collect();
        match store.save(&report.label, report.source, report.as_of, &buys)? {
            Some(path) => println!("\nSaved {} buy recommendation(s) to {}", buys.len(), path.display()),
            None => println!("\nNo buy recommendations to save"),
        }
    }
    Ok(())
}

fn print_report(report: &BatchReport) {
    println!("{} ({}) as of {}", report.label, report.source, report.as_of);
    for outcome in &report.outcomes {
        match outcome {
            AssetOutcome::Skipped { symbol, reason } => println!("  {symbol:<14} skipped: {reason}"),
            AssetOutcome::Evaluated(eval) => {
                let detail = match (&eval.exclusion, eval.risk) {
                    (Some(reason), _) => reason.to_string(),
                    (None, Some(risk)) => format!(
                        "bust {:.2} goal {:.2} rr {}",
                        risk.bust_probability,
                        risk.goal_probability,
                        eval.reward_risk
                            .map(|rr| format!("{:.1}", rr.ratio))
                            .unwrap_or_else(|| "-".into()),
                    ),
                    (None, None) => String::new(),
                };
                let trend = eval.trend().map(|t| t.to_string()).unwrap_or_default();
                let flag = if eval.has_anomaly() { " [anomaly]" } else { "" };
                println!("  {:<14} {:<14} {:<9} {detail}{flag}", eval.symbol, eval.state, trend);
            }
        }
    }

    let buys = report.ranked_buys();
    println!("\nTo buy ({}):", buys.len());
    for rec in buys {
        println!(
            "  {:<14} entry {:>10.2} stop {:>10.2} ({:.1}%) exit {:>10.2} rr {:.1}{}",
            rec.symbol,
            rec.entry_price,
            rec.stop_loss,
            rec.stop_loss_pct() * 100.0,
            rec.exit_price,
            rec.reward_risk_ratio.unwrap_or(0.0),
            rec.fair_price
                .map(|f| format!(" fair {f:.2}"))
                .unwrap_or_default(),
        );
    }

    let sells = report.sells();
    println!("\nTo sell ({}):", sells.len());
    for rec in sells {
        println!(
            "  {:<14} bought {:>10.2} now {:>10.2} gain {:.1}%",
            rec.symbol,
            rec.entry_price,
            rec.exit_price,
            rec.gain_pct.unwrap_or(0.0),
        );
    }

    let held = report
        .outcomes
        .iter()
        .filter_map(AssetOutcome::evaluation)
        .filter(|e| e.state == EvaluationState::Hold)
        .count();
    info!(held, "report printed");
}

fn run_validate(config_path: &Path, date: NaiveDate, until: NaiveDate) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = provider_for(&config)?;
    let store = RecommendationStore::new(&config.recommendations_dir);
    let outcomes = validate_saved(&store, provider.as_ref(), &config, date, until)?;

    if outcomes.is_empty() {
        println!(
            "No saved recommendations at {}",
            store.path(&config.label, provider.source(), date).display()
        );
        return Ok(());
    }
    for outcome in &outcomes {
        match outcome {
            ValidationOutcome::Checked(r) => println!(
                "  {:<14} succeeded {:>3} (first {})  busted {:>3} (first {})",
                r.symbol,
                r.succeeded_count,
                r.first_success_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                r.busted_count,
                r.first_bust_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            ),
            ValidationOutcome::Skipped { symbol, reason } => {
                println!("  {symbol:<14} skipped: {reason}")
            }
        }
    }
    Ok(())
}

fn fetch(config: &AdvisorConfig, provider: &dyn DataProvider, symbol: &str, as_of: NaiveDate) -> Result<PriceSeries> {
    let entry = config
        .entry(symbol)
        .cloned()
        .unwrap_or_else(|| WatchlistEntry::new(symbol, AssetType::Stock));
    let request = entry
        .request(as_of, config.data.history_days)
        .with_context(|| format!("history window for {symbol} is out of range"))?;
    fetch_series(provider, &request).with_context(|| format!("fetching {symbol}"))
}

fn run_correlation(config_path: &Path, a: &str, b: &str, as_of: NaiveDate) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = provider_for(&config)?;
    let sa = fetch(&config, provider.as_ref(), a, as_of)?;
    let sb = fetch(&config, provider.as_ref(), b, as_of)?;
    match correlation(&sa, &sb) {
        Some(r) => println!("corr({a}, {b}) = {r:.4}"),
        None => println!("corr({a}, {b}) is undefined (too few shared dates or no variance)"),
    }
    Ok(())
}

fn run_beta(config_path: &Path, benchmark: &str, symbols: Vec<String>, as_of: NaiveDate) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = provider_for(&config)?;
    let symbols = if symbols.is_empty() {
        config.watchlist.iter().map(|e| e.symbol.clone()).collect()
    } else {
        symbols
    };

    let bench = fetch(&config, provider.as_ref(), benchmark, as_of)?;
    let mut assets = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        match fetch(&config, provider.as_ref(), symbol, as_of) {
            Ok(series) => assets.push(series),
            Err(e) => eprintln!("  {symbol:<14} skipped: {e:#}"),
        }
    }

    println!("{:<14} {:>12} {:>8} {:>6}", "symbol", "correlation", "beta", "obs");
    let fmt = |v: Option<f64>| v.map(|x| format!("{x:.3}")).unwrap_or_else(|| "-".into());
    for row in beta_table(&bench, &assets) {
        println!(
            "{:<14} {:>12} {:>8} {:>6}",
            row.symbol,
            fmt(row.correlation),
            fmt(row.beta),
            row.observations
        );
    }
    Ok(())
}
