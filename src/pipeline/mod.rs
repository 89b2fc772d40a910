//! Pipeline entry points for crawler operations.
//!
//! - `CrawlOrchestrator`: one facility, captcha through enrichment
//! - `run_jail` / `run_all`: serve today's snapshot from cache or crawl
//! - `run_jail_with`: `run_jail` over a caller-supplied `RosterApi`

pub mod crawl;
pub mod update;

pub use crawl::{CrawlContext, CrawlOrchestrator, CrawlOutcome, SkippedInmate};
pub use update::{JailRun, RunSummary, run_all, run_jail, run_jail_with};
