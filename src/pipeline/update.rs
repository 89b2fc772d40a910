// src/pipeline/update.rs

//! Cache-or-crawl driver over configured jails.

use chrono::Utc;

use crate::error::Result;
use crate::models::JailConfig;
use crate::pipeline::{CrawlContext, CrawlOrchestrator};
use crate::services::{HttpRosterApi, RosterApi};
use crate::storage::{JailSnapshot, SnapshotStore};
use crate::utils::log as run_log;

/// How a jail's snapshot for today was obtained.
#[derive(Debug, Clone)]
pub enum JailRun {
    Cached(JailSnapshot),
    Crawled {
        snapshot: JailSnapshot,
        location: String,
    },
}

impl JailRun {
    pub fn snapshot(&self) -> &JailSnapshot {
        match self {
            JailRun::Cached(snapshot) | JailRun::Crawled { snapshot, .. } => snapshot,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, JailRun::Cached(_))
    }
}

/// Totals for a bulk run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cached: usize,
    pub crawled: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, run: &JailRun) {
        if run.is_cached() {
            self.cached += 1;
        } else {
            self.crawled += 1;
        }
    }
}

/// Return today's snapshot for `jail`, crawling over HTTP only on a cache
/// miss or when forced.
pub async fn run_jail(
    ctx: &CrawlContext,
    jail: &JailConfig,
    store: &dyn SnapshotStore,
    force: bool,
) -> Result<JailRun> {
    if let Some(cached) = cached_snapshot(jail, store, force).await? {
        return Ok(cached);
    }
    let api = HttpRosterApi::new(ctx.client.clone(), &jail.base_url, &jail.slug)?;
    crawl_and_save(&api, ctx, jail, store).await
}

/// Same as `run_jail`, crawling through `api` instead of the HTTP transport.
pub async fn run_jail_with(
    api: &dyn RosterApi,
    ctx: &CrawlContext,
    jail: &JailConfig,
    store: &dyn SnapshotStore,
    force: bool,
) -> Result<JailRun> {
    if let Some(cached) = cached_snapshot(jail, store, force).await? {
        return Ok(cached);
    }
    crawl_and_save(api, ctx, jail, store).await
}

async fn cached_snapshot(
    jail: &JailConfig,
    store: &dyn SnapshotStore,
    force: bool,
) -> Result<Option<JailRun>> {
    if force {
        log::info!("[{}] Forced crawl", jail.slug);
        return Ok(None);
    }

    let today = Utc::now().date_naive();
    match store.load_snapshot(&jail.slug, today).await? {
        Some(snapshot) => {
            log::info!(
                "[{}] Using cached snapshot for {today} ({} inmates)",
                jail.slug,
                snapshot.inmates.len()
            );
            Ok(Some(JailRun::Cached(snapshot)))
        }
        None => {
            log::info!("[{}] No snapshot for {today}; crawling", jail.slug);
            Ok(None)
        }
    }
}

async fn crawl_and_save(
    api: &dyn RosterApi,
    ctx: &CrawlContext,
    jail: &JailConfig,
    store: &dyn SnapshotStore,
) -> Result<JailRun> {
    let outcome = CrawlOrchestrator::new(api, ctx).run(&jail.base_url).await?;
    let snapshot = JailSnapshot::from_outcome(jail, outcome);
    let location = store.save_snapshot(&snapshot).await?;
    Ok(JailRun::Crawled { snapshot, location })
}

/// Run every usable jail in order. A failed jail is logged and counted; the rest still run.
pub async fn run_all(
    ctx: &CrawlContext,
    jails: &[JailConfig],
    store: &dyn SnapshotStore,
    force: bool,
) -> RunSummary {
    let usable: Vec<&JailConfig> = jails.iter().filter(|j| j.usable).collect();
    run_log::header(&format!("Updating {} jails", usable.len()));

    let mut summary = RunSummary::default();
    for (n, jail) in usable.iter().enumerate() {
        run_log::step(n + 1, usable.len(), jail.display_name());
        match run_jail(ctx, jail, store, force).await {
            Ok(run) => summary.record(&run),
            Err(e) => {
                log::error!("[{}] Update failed: {}", jail.slug, e.chain());
                summary.failed += 1;
            }
        }
    }

    let skipped = jails.len() - usable.len();
    run_log::summary(
        "Update",
        &[
            ("Crawled", summary.crawled.to_string()),
            ("Cached", summary.cached.to_string()),
            ("Failed", summary.failed.to_string()),
            ("Not usable", skipped.to_string()),
        ],
    );
    summary
}
