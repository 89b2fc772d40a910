// src/lambda/mod.rs

//! AWS Lambda handler for the crawler.
//!
//! Each invocation:
//! 1. Loads `config.toml` from S3
//! 2. Builds a crawl context from the environment API key
//! 3. Serves today's snapshot per jail from S3, crawling on a miss

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::LambdaConfigLoader;
use crate::error::{AppError, Result};
use crate::pipeline::{CrawlContext, RunSummary, run_all, run_jail};
use crate::storage::S3Storage;

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct CrawlRequest {
    /// Crawl a single jail by slug (all usable jails if absent)
    #[serde(default)]
    pub jail: Option<String>,

    /// Ignore today's cached snapshot
    #[serde(default)]
    pub force: bool,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct CrawlResponse {
    pub success: bool,
    pub crawled: usize,
    pub cached: usize,
    pub failed: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub execution_time_ms: u64,
}

impl From<RunSummary> for CrawlResponse {
    fn from(summary: RunSummary) -> Self {
        Self {
            success: summary.is_success(),
            crawled: summary.crawled,
            cached: summary.cached,
            failed: summary.failed,
            ..Default::default()
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<CrawlRequest>,
) -> std::result::Result<CrawlResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!("Starting crawl: jail={:?}, force={}", request.jail, request.force);

    let mut response = match run_crawl(&request).await {
        Ok(response) => response,
        Err(e) => {
            error!("Crawl failed: {}", e.chain());
            CrawlResponse {
                success: false,
                failed: 1,
                error: Some(e.chain()),
                ..Default::default()
            }
        }
    };
    response.execution_time_ms = start.elapsed().as_millis() as u64;

    info!(
        "Crawl finished: {} crawled, {} cached, {} failed in {}ms",
        response.crawled, response.cached, response.failed, response.execution_time_ms
    );
    Ok(response)
}

async fn run_crawl(request: &CrawlRequest) -> Result<CrawlResponse> {
    let storage = S3Storage::from_env().await?;
    let config = LambdaConfigLoader::new(storage.clone()).load_config().await?;

    let api_key = CrawlContext::api_key_from_env(&config)?;
    let ctx = CrawlContext::from_config(&config, api_key)?;

    match request.jail.as_deref() {
        Some(slug) => {
            let jail = config
                .find_jail(slug)
                .ok_or_else(|| AppError::config(format!("unknown jail {slug:?}")))?;
            let run = run_jail(&ctx, jail, &storage, request.force).await?;
            let mut summary = RunSummary::default();
            if run.is_cached() {
                summary.cached = 1;
            } else {
                summary.crawled = 1;
            }
            Ok(summary.into())
        }
        None => {
            let summary = run_all(&ctx, &config.jails, &storage, request.force).await;
            let mut response = CrawlResponse::from(summary);
            if !response.success {
                response.error = Some(format!("{} jail(s) failed", response.failed));
            }
            Ok(response)
        }
    }
}
