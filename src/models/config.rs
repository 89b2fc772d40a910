//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP, pacing and captcha settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Vision completion service used to read captchas
    #[serde(default)]
    pub solver: SolverConfig,

    /// Snapshot cache settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Jail definitions
    #[serde(default)]
    pub jails: Vec<JailConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.min_delay_ms > self.crawler.max_delay_ms {
            return Err(AppError::validation(
                "crawler.min_delay_ms must not exceed crawler.max_delay_ms",
            ));
        }
        if self.crawler.captcha_attempts == 0 {
            return Err(AppError::validation("crawler.captcha_attempts must be > 0"));
        }
        if self.solver.api_key_env.trim().is_empty() {
            return Err(AppError::validation("solver.api_key_env is empty"));
        }
        url::Url::parse(&self.solver.endpoint)
            .map_err(|e| AppError::validation(format!("solver.endpoint: {e}")))?;

        let mut seen = HashSet::new();
        for jail in &self.jails {
            if jail.slug.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "jail {:?} has an empty slug",
                    jail.title
                )));
            }
            if !seen.insert(jail.slug.as_str()) {
                return Err(AppError::validation(format!(
                    "duplicate jail slug {}",
                    jail.slug
                )));
            }
            url::Url::parse(&jail.base_url).map_err(|e| {
                AppError::validation(format!("jail {} base_url: {e}", jail.slug))
            })?;
        }
        Ok(())
    }

    /// Jails that bulk runs should visit.
    pub fn usable_jails(&self) -> impl Iterator<Item = &JailConfig> {
        self.jails.iter().filter(|j| j.usable)
    }

    /// Look up a jail by its slug.
    pub fn find_jail(&self, slug: &str) -> Option<&JailConfig> {
        self.jails.iter().find(|j| j.slug == slug)
    }
}

/// HTTP client, pacing and captcha settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Lower bound of the randomized pause before each inmate request
    #[serde(default = "defaults::min_delay")]
    pub min_delay_ms: u64,

    /// Upper bound (exclusive) of the randomized pause
    #[serde(default = "defaults::max_delay")]
    pub max_delay_ms: u64,

    /// Captcha challenges tried before giving up on a session.
    /// Defaults to `MAX_CAPTCHA_ATTEMPTS`.
    #[serde(default = "defaults::captcha_attempts")]
    pub captcha_attempts: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            min_delay_ms: defaults::min_delay(),
            max_delay_ms: defaults::max_delay(),
            captcha_attempts: defaults::captcha_attempts(),
        }
    }
}

/// Vision completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Chat completions endpoint
    #[serde(default = "defaults::solver_endpoint")]
    pub endpoint: String,

    /// Vision-capable model name
    #[serde(default = "defaults::solver_model")]
    pub model: String,

    #[serde(default = "defaults::solver_max_tokens")]
    pub max_tokens: u32,

    /// Environment variable holding the API key
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::solver_endpoint(),
            model: defaults::solver_model(),
            max_tokens: defaults::solver_max_tokens(),
            api_key_env: defaults::api_key_env(),
        }
    }
}

/// Snapshot cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `{slug}-{date}.json` snapshots
    #[serde(default = "defaults::cache_dir")]
    pub cache_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_dir: defaults::cache_dir(),
        }
    }
}

/// A single jail roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JailConfig {
    /// Human-readable jail name
    #[serde(default)]
    pub title: String,

    /// Facility identifier as it appears in API URLs
    pub slug: String,

    /// Host serving the roster API; most jails share the default
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Public roster page, only used in listings
    #[serde(default)]
    pub index_url: Option<String>,

    /// Whether data can currently be pulled from this jail
    #[serde(default = "defaults::usable")]
    pub usable: bool,
}

impl JailConfig {
    /// Title, falling back to the slug.
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            &self.slug
        } else {
            &self.title
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:75.0) Gecko/20100101 Firefox/75.0".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn min_delay() -> u64 {
        500
    }
    pub fn max_delay() -> u64 {
        1500
    }
    pub fn captcha_attempts() -> u32 {
        crate::services::MAX_CAPTCHA_ATTEMPTS
    }

    pub fn solver_endpoint() -> String {
        "https://api.openai.com/v1/chat/completions".into()
    }
    pub fn solver_model() -> String {
        "gpt-4o".into()
    }
    pub fn solver_max_tokens() -> u32 {
        300
    }
    pub fn api_key_env() -> String {
        "JTT_OPENAI_API_KEY".into()
    }

    pub fn cache_dir() -> String {
        "cache".into()
    }

    pub fn base_url() -> String {
        "https://omsweb.public-safety-cloud.com".into()
    }
    pub fn usable() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[crawler]
min_delay_ms = 250

[storage]
cache_dir = "/var/cache/jtt"

[[jails]]
title = "Hancock County, MS"
slug = "HANCOCK_COUNTY_MS"

[[jails]]
title = "Search-only jail"
slug = "SEARCH_ONLY"
base_url = "https://other.example.com"
usable = false
"#;

    #[test]
    fn parse_applies_defaults() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.crawler.min_delay_ms, 250);
        assert_eq!(config.crawler.max_delay_ms, 1500);
        assert_eq!(config.crawler.captcha_attempts, 5);
        assert_eq!(config.solver.model, "gpt-4o");
        assert_eq!(config.storage.cache_dir, "/var/cache/jtt");
        assert_eq!(
            config.jails[0].base_url,
            "https://omsweb.public-safety-cloud.com"
        );
        assert!(config.jails[0].usable);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn usable_jails_skips_disabled() {
        let config = Config::parse(SAMPLE).unwrap();
        let slugs: Vec<_> = config.usable_jails().map(|j| j.slug.as_str()).collect();
        assert_eq!(slugs, vec!["HANCOCK_COUNTY_MS"]);
        assert!(config.find_jail("SEARCH_ONLY").is_some());
        assert!(config.find_jail("NOPE").is_none());
    }

    #[test]
    fn validate_rejects_inverted_delay() {
        let mut config = Config::default();
        config.crawler.min_delay_ms = 2000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn captcha_budget_defaults_to_five() {
        let config = Config::parse("[crawler]\nmin_delay_ms = 100\n").unwrap();
        assert_eq!(config.crawler.captcha_attempts, 5);
        assert_eq!(Config::default().crawler.captcha_attempts, 5);
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.crawler.captcha_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_slugs() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.jails[1].slug = "HANCOCK_COUNTY_MS".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml"));
        assert_eq!(config.storage.cache_dir, "cache");
        assert!(config.jails.is_empty());
    }

    #[test]
    fn display_name_falls_back_to_slug() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.jails[0].title.clear();
        assert_eq!(config.jails[0].display_name(), "HANCOCK_COUNTY_MS");
    }
}
