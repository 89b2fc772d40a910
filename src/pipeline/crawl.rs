// src/pipeline/crawl.rs

//! Single-facility crawl: captcha → roster → paced enrichment.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Config, JailSession, SessionState};
use crate::services::{
    CaptchaGate, CaptchaSolver, InmateEnricher, OpenAiVision, RosterApi, RosterFetcher,
};
use crate::utils::Pacing;
use crate::utils::http::{create_api_client, create_client};
use crate::utils::log as run_log;

/// Everything a crawl needs, built once from configuration.
///
/// Holds no process-wide state, so separate contexts can drive separate
/// facilities side by side.
#[derive(Clone)]
pub struct CrawlContext {
    pub client: Client,
    pub solver: CaptchaSolver,
    pub pacing: Pacing,
    pub captcha_attempts: u32,
}

impl CrawlContext {
    /// Build the roster client and the OpenAI-backed solver.
    ///
    /// The solver gets its own plain client; the roster client's browser
    /// headers are for the vendor only.
    pub fn from_config(config: &Config, api_key: impl Into<String>) -> Result<Self> {
        let client = create_client(&config.crawler)?;
        let solver_client = create_api_client(Duration::from_secs(config.crawler.timeout_secs))?;
        let vision = OpenAiVision::new(solver_client, api_key, &config.solver);
        Ok(Self {
            solver: CaptchaSolver::new(Arc::new(vision)),
            pacing: Pacing::from_millis(config.crawler.min_delay_ms, config.crawler.max_delay_ms),
            captcha_attempts: config.crawler.captcha_attempts,
            client,
        })
    }

    /// Read the solver API key from the variable named in the config.
    pub fn api_key_from_env(config: &Config) -> Result<String> {
        let name = &config.solver.api_key_env;
        match std::env::var(name) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AppError::config(format!("{name} must be set"))),
        }
    }
}

/// An inmate the crawl gave up on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedInmate {
    pub arrest_no: String,
    pub reason: String,
}

/// Result of one completed crawl.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub session: JailSession,
    pub skipped: Vec<SkippedInmate>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives one `JailSession` from empty to complete.
pub struct CrawlOrchestrator<'a> {
    api: &'a dyn RosterApi,
    solver: &'a CaptchaSolver,
    pacing: Pacing,
    captcha_attempts: u32,
}

impl<'a> CrawlOrchestrator<'a> {
    pub fn new(api: &'a dyn RosterApi, ctx: &'a CrawlContext) -> Self {
        Self {
            api,
            solver: &ctx.solver,
            pacing: ctx.pacing,
            captcha_attempts: ctx.captcha_attempts,
        }
    }

    /// Crawl the facility behind `api`.
    ///
    /// Captcha exhaustion and roster rejection abort the crawl; a failed
    /// inmate is logged, recorded in `skipped`, and the crawl moves on.
    pub async fn run(&self, base_url: &str) -> Result<CrawlOutcome> {
        let started_at = Utc::now();
        let facility = self.api.facility().to_string();
        let mut session = JailSession::new(base_url, facility.as_str());
        let gate = CaptchaGate::with_attempts(self.api, self.solver, self.captcha_attempts);

        run_log::step(1, 3, &format!("[{facility}] Solving captcha"));
        match gate.acquire().await {
            Ok(key) => {
                session.set_session_key(key);
                session.advance(SessionState::CaptchaPending)?;
            }
            Err(e) => {
                session.advance(SessionState::CaptchaFailed)?;
                log::error!("[{facility}] Session failed: {}", e.chain());
                return Err(e);
            }
        }

        run_log::step(2, 3, &format!("[{facility}] Fetching roster"));
        if let Err(e) = RosterFetcher::new(self.api, &gate).fetch(&mut session).await {
            session.advance(SessionState::RosterFailed)?;
            log::error!("[{facility}] Session failed: {}", e.chain());
            return Err(e);
        }
        session.advance(SessionState::RosterFetched)?;

        run_log::step(3, 3, &format!("[{facility}] Enriching inmates"));
        session.advance(SessionState::Enriching)?;
        let enricher = InmateEnricher::new(self.api, &gate);
        let mut skipped = Vec::new();

        for index in 0..session.inmates.len() {
            // Independent delay per inmate; keeps traffic strictly serial and gentle.
            self.pacing.wait().await;

            match enricher.enrich(&mut session, index).await {
                Ok(()) => {}
                Err(e) if !e.is_terminal() => {
                    let arrest_no = session.inmates[index].arrest_no().to_string();
                    log::warn!(
                        "[{facility}] Failed to update inmate {arrest_no:?}: {}",
                        e.chain()
                    );
                    skipped.push(SkippedInmate {
                        arrest_no,
                        reason: e.chain(),
                    });
                }
                Err(e) => {
                    log::error!("[{facility}] Session aborted during enrichment: {}", e.chain());
                    return Err(e);
                }
            }
        }

        session.advance(SessionState::Complete)?;
        let finished_at = Utc::now();

        run_log::summary(
            &format!("Crawl of {facility}"),
            &[
                ("Inmates", session.inmates.len().to_string()),
                ("Enriched", session.enriched_count().to_string()),
                ("Skipped", skipped.len().to_string()),
                (
                    "Duration",
                    format!("{}s", (finished_at - started_at).num_seconds()),
                ),
            ],
        );

        Ok(CrawlOutcome {
            session,
            skipped,
            started_at,
            finished_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_carries_budget_and_pacing() {
        let mut config = Config::default();
        config.crawler.captcha_attempts = 3;
        config.crawler.min_delay_ms = 100;
        config.crawler.max_delay_ms = 200;

        let ctx = CrawlContext::from_config(&config, "sk-test").unwrap();

        assert_eq!(ctx.captcha_attempts, 3);
        assert_eq!(ctx.pacing, Pacing::from_millis(100, 200));
    }
}
