use crate::server::{AppState, build_router};
use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use seoscope_core::classify::{Bucket, Risk};
use seoscope_core::{AppConfig, Database, MetricsReport, Resolver, SqliteStore};
use seoscope_probe::Prober;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "seoscope=info,seoscope_core=info,seoscope_probe=info,tower_http=info";

/// Build the process configuration from parsed arguments (env fallbacks are
/// resolved by clap).
pub fn config_from_matches(args: &ArgMatches) -> AppConfig {
    let defaults = AppConfig::default();
    let timeout = args
        .get_one::<u64>("timeout")
        .copied()
        .unwrap_or(defaults.probe_timeout_secs);

    AppConfig {
        bind: arg_string(args, "bind").unwrap_or(defaults.bind),
        db_path: arg_string(args, "db").unwrap_or(defaults.db_path),
        opr_api_key: arg_string(args, "api-key").filter(|k| !k.trim().is_empty()),
        use_synthetic_score: flag(args, "synthetic"),
        allowed_origin: arg_string(args, "allowed-origin"),
        probe_timeout_secs: timeout,
        scorer_timeout_secs: timeout,
        freshness_days: args
            .get_one::<i64>("freshness-days")
            .copied()
            .unwrap_or(defaults.freshness_days),
        json_logs: flag(args, "json-logs"),
    }
}

// Subcommand matches only know the arguments declared on (or propagated to) them
fn arg_string(args: &ArgMatches, id: &str) -> Option<String> {
    args.try_get_one::<String>(id).ok().flatten().cloned()
}

fn flag(args: &ArgMatches, id: &str) -> bool {
    args.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false)
}

pub fn init_tracing(json_logs: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

/// Wire store, scorer and prober into a resolver according to `config`.
pub fn build_resolver(config: &AppConfig) -> Result<Resolver> {
    config.validate()?;

    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    let scorer = config.build_scorer()?;
    let prober = Prober::with_timeout(config.probe_timeout_secs)
        .context("Failed to create HTTP client")?;

    if scorer.is_synthetic() {
        info!("Synthetic scoring enabled; authority scores are not real");
    }

    Ok(Resolver::new(Arc::new(store), scorer, Arc::new(prober)).with_freshness(config.freshness()))
}

pub async fn handle_serve(config: AppConfig) -> Result<()> {
    let resolver = build_resolver(&config)?;
    let state = AppState {
        resolver: Arc::new(resolver),
    };
    let app = build_router(state, config.allowed_origin.as_deref());

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    info!("seoscope v{} listening on {}", env!("CARGO_PKG_VERSION"), config.bind);
    info!("Database: {}", config.database_path().display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, starting graceful shutdown");
}

pub async fn handle_lookup(config: AppConfig, domain: &str, as_json: bool, quiet: bool) -> Result<()> {
    let resolver = build_resolver(&config)?;

    let spinner = if quiet || as_json {
        None
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Resolving {}...", domain));
        Some(spinner)
    };

    let result = resolver.resolve(domain).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = result?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }
    Ok(())
}

pub fn handle_init(config: &AppConfig, force: bool) -> Result<()> {
    let db_path = config.database_path();

    if Database::exists(&db_path) {
        if !force {
            anyhow::bail!(
                "Database already exists at {} (use --force to recreate it)",
                db_path.display()
            );
        }
        Database::drop(&db_path)
            .with_context(|| format!("Failed to remove {}", db_path.display()))?;
        println!("{} removed existing database", "✓".green());
    }

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Database::new(&db_path)
        .with_context(|| format!("Failed to create database at {}", db_path.display()))?;

    println!("{} database ready at {}", "✓".green(), db_path.display());
    Ok(())
}

pub async fn handle_stats(config: &AppConfig) -> Result<()> {
    let db_path = config.database_path();
    if !Database::exists(&db_path) {
        anyhow::bail!("No database at {} (run `seoscope init` first)", db_path.display());
    }

    let store = SqliteStore::open(&db_path)?;
    let total = store.count_domains().await?;
    let cutoff = chrono::Utc::now() - config.freshness();
    let stale = store.list_stale(cutoff).await?;

    println!("{}", "═".repeat(60).bright_blue().bold());
    println!("  {} {}", "Cached domains:".bold(), total);
    println!(
        "  {} {} (older than {} days)",
        "Stale records:".bold(),
        stale.len(),
        config.freshness_days
    );
    println!("{}", "═".repeat(60).bright_blue().bold());

    for (domain, fetched) in stale {
        println!("  {:<40} {}", domain, fetched.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

/// Human-readable, colored rendering of a report.
pub fn format_report(report: &MetricsReport) -> String {
    let mut out = String::new();
    let divider = "═".repeat(60);

    out.push_str(&format!("{}\n", divider.bright_blue().bold()));
    out.push_str(&format!("  {}\n", report.domain.bright_white().bold()));
    out.push_str(&format!("{}\n", divider.bright_blue().bold()));
    out.push_str(&format!("  Authority score : {}\n", report.authority_score));
    out.push_str(&format!("  Traffic         : {}\n", paint_bucket(report.traffic_bucket)));
    out.push_str(&format!("  Keywords        : {}\n", report.keywords_bucket));
    out.push_str(&format!("  Value           : {}\n", paint_bucket(report.value_bucket)));
    out.push_str(&format!(
        "  Domain age      : {}\n",
        report.domain_age.as_deref().unwrap_or("unknown")
    ));
    out.push_str(&format!(
        "  Indexable       : {}\n",
        if report.indexable { "yes".green() } else { "no".red() }
    ));
    out.push_str(&format!("  Risk            : {}\n", paint_risk(report.risk)));
    if report.synthetic {
        out.push_str(&format!(
            "  {}\n",
            "Synthetic score: not from Open PageRank".yellow()
        ));
    }
    out
}

fn paint_bucket(bucket: Bucket) -> colored::ColoredString {
    match bucket {
        Bucket::VeryLow | Bucket::Low => bucket.as_str().red(),
        Bucket::Medium => bucket.as_str().yellow(),
        Bucket::High | Bucket::VeryHigh => bucket.as_str().green(),
    }
}

fn paint_risk(risk: Risk) -> colored::ColoredString {
    match risk {
        Risk::Low => risk.as_str().green(),
        Risk::Medium => risk.as_str().yellow(),
        Risk::High => risk.as_str().red().bold(),
    }
}
