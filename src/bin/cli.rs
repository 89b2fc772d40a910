//! jtt CLI
//!
//! Local execution entry point. For AWS Lambda, use `jtt-lambda`.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use jtt::{
    error::{AppError, Result},
    models::Config,
    pipeline::{self, CrawlContext},
    storage::{LocalStorage, SnapshotStore},
};

/// jtt - JailTracker roster crawler
#[derive(Parser, Debug)]
#[command(name = "jtt", version, about = "Captcha-gated jail roster crawler")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "JTT_CONFIG_PATH", default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl one jail, or every usable jail
    Crawl {
        /// Jail slug (all usable jails if omitted)
        #[arg(long)]
        jail: Option<String>,

        /// Crawl even if today's snapshot exists
        #[arg(long)]
        force: bool,
    },

    /// List configured jails
    List,

    /// Summarize a cached snapshot
    Show {
        #[arg(long)]
        jail: String,

        /// Snapshot date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Reading a snapshot only needs the cache directory, so a missing or
    // broken config falls back to defaults there.
    let config = match cli.command {
        Command::Show { .. } => Config::load_or_default(&cli.config),
        _ => {
            let config = Config::load(&cli.config)?;
            config.validate()?;
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
    };

    let storage = LocalStorage::new(&config.storage.cache_dir);

    match cli.command {
        Command::Crawl { jail, force } => {
            let api_key = CrawlContext::api_key_from_env(&config)?;
            let ctx = CrawlContext::from_config(&config, api_key)?;

            match jail {
                Some(slug) => {
                    let jail = config
                        .find_jail(&slug)
                        .ok_or_else(|| AppError::config(format!("unknown jail {slug:?}")))?;
                    let run = pipeline::run_jail(&ctx, jail, &storage, force).await?;
                    let snapshot = run.snapshot();
                    log::info!(
                        "{}: {} inmates ({} enriched, {} skipped){}",
                        snapshot.title,
                        snapshot.inmates.len(),
                        snapshot.enriched,
                        snapshot.skipped.len(),
                        if run.is_cached() { " [cached]" } else { "" }
                    );
                }
                None => {
                    let summary = pipeline::run_all(&ctx, &config.jails, &storage, force).await;
                    if !summary.is_success() {
                        return Err(AppError::validation(format!(
                            "{} jail(s) failed",
                            summary.failed
                        )));
                    }
                }
            }
        }

        Command::List => {
            for jail in &config.jails {
                log::info!(
                    "{:<32} {:<40} {}{}",
                    jail.slug,
                    jail.display_name(),
                    if jail.usable { "usable" } else { "unusable" },
                    jail.index_url
                        .as_deref()
                        .map(|u| format!("  {u}"))
                        .unwrap_or_default()
                );
            }
            log::info!(
                "{} jails configured, {} usable",
                config.jails.len(),
                config.usable_jails().count()
            );
        }

        Command::Show { jail, date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let Some(snapshot) = storage.load_snapshot(&jail, date).await? else {
                log::warn!("No snapshot for {jail} on {date}");
                return Ok(());
            };

            let charges: usize = snapshot.inmates.iter().map(|i| i.charges.len()).sum();
            log::info!("{} ({}) on {}", snapshot.title, snapshot.facility, snapshot.date);
            log::info!("  State: {:?}", snapshot.state);
            log::info!(
                "  Crawled: {} -> {}",
                snapshot.started_at.to_rfc3339(),
                snapshot.finished_at.to_rfc3339()
            );
            log::info!(
                "  Inmates: {} ({} enriched), charges: {charges}",
                snapshot.inmates.len(),
                snapshot.enriched
            );
            for skipped in &snapshot.skipped {
                log::info!("  Skipped {}: {}", skipped.arrest_no, skipped.reason);
            }
        }

        Command::Validate => {
            log::info!(
                "✓ Config OK ({} jails, solver model {})",
                config.jails.len(),
                config.solver.model
            );
        }
    }

    Ok(())
}
