//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Language, SiteSelectors};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Where the content store lives
    #[serde(default)]
    pub paths: PathsConfig,

    /// Site layout selectors
    #[serde(default)]
    pub selectors: SiteSelectors,

    /// Translation job settings
    #[serde(default)]
    pub translation: TranslationConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
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
        if self.crawler.max_pages == Some(0) {
            return Err(AppError::validation("crawler.max_pages must be > 0 when set"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        let origin = url::Url::parse(&self.crawler.origin)?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(AppError::validation("crawler.origin must be http(s)"));
        }
        for (name, selector) in self.selectors.entries() {
            scraper::Selector::parse(selector)
                .map_err(|e| AppError::selector(format!("{name} = {selector}"), format!("{e:?}")))?;
        }
        if self.translation.max_retries == 0 {
            return Err(AppError::validation("translation.max_retries must be > 0"));
        }
        if self.translation.concurrency == 0 {
            return Err(AppError::validation("translation.concurrency must be > 0"));
        }
        if self.translation.languages.contains(&Language::CANONICAL) {
            return Err(AppError::validation(
                "translation.languages must not include the canonical language",
            ));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum article fetches in flight
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Site origin; listings live under `{origin}/news/page/{n}/`
    #[serde(default = "defaults::origin")]
    pub origin: String,

    /// Stop listing walks after this many pages (unlimited when unset)
    #[serde(default)]
    pub max_pages: Option<u32>,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            origin: defaults::origin(),
            max_pages: None,
        }
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the JSON content store, relative to the storage directory
    #[serde(default = "defaults::contents_dir")]
    pub contents_dir: PathBuf,
}

impl PathsConfig {
    /// Resolve the content directory against a base directory.
    pub fn contents_root(&self, base: &Path) -> PathBuf {
        if self.contents_dir.is_absolute() {
            self.contents_dir.clone()
        } else {
            base.join(&self.contents_dir)
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            contents_dir: defaults::contents_dir(),
        }
    }
}

/// Settings for the translation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Chat model name
    #[serde(default = "defaults::model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    /// Attempts per item before it is skipped for the run
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base backoff in milliseconds; attempt `n` waits `n * retry_delay_ms`
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,

    /// Translation requests in flight
    #[serde(default = "defaults::translation_concurrency")]
    pub concurrency: usize,

    /// Target languages
    #[serde(default = "defaults::languages")]
    pub languages: Vec<Language>,
}

impl TranslationConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            model: defaults::model(),
            api_key_env: defaults::api_key_env(),
            max_retries: defaults::max_retries(),
            retry_delay_ms: defaults::retry_delay(),
            concurrency: defaults::translation_concurrency(),
            languages: defaults::languages(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use crate::models::Language;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; newsroom/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        2000
    }
    pub fn max_concurrent() -> usize {
        1
    }
    pub fn origin() -> String {
        "https://www.whitehouse.gov".into()
    }

    // Path defaults
    pub fn contents_dir() -> PathBuf {
        PathBuf::from("contents")
    }

    // Translation defaults
    pub fn api_base() -> String {
        "https://api.deepseek.com".into()
    }
    pub fn model() -> String {
        "deepseek-chat".into()
    }
    pub fn api_key_env() -> String {
        "DEEPSEEK_API_KEY".into()
    }
    pub fn max_retries() -> u32 {
        4
    }
    pub fn retry_delay() -> u64 {
        2000
    }
    pub fn translation_concurrency() -> usize {
        1
    }
    pub fn languages() -> Vec<Language> {
        vec![Language::Cn, Language::Jp, Language::Kp]
    }
}
