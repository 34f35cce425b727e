//! Run configuration and the fixed site layout the extractors rely on.
//!
//! Required values come from the environment (a `.env` file is loaded first
//! when present). Everything else has a default that can be overridden either
//! through the environment or through [`CatalogScraperBuilder`](crate::CatalogScraperBuilder).

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Once;
use std::time::Duration;

use url::Url;

use crate::error::{CatalogError, Result};

pub const ENV_STORE_API: &str = "MONGO_API";
pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_WORKERS: &str = "SCRAPER_WORKERS";
pub const ENV_TIMEOUT: &str = "SCRAPER_TIMEOUT_SECS";
pub const ENV_FETCH_ATTEMPTS: &str = "SCRAPER_FETCH_ATTEMPTS";
pub const ENV_FETCH_DELAY: &str = "SCRAPER_FETCH_DELAY_MS";
pub const ENV_OUTPUT: &str = "SCRAPER_OUTPUT";

pub const DEFAULT_WORKERS: usize = 6;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 5;
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_OUTPUT: &str = "collections_data.json";

/// Query appended to the base URL to reach the collection listing.
pub const LISTING_PATH: &str = "?view=cards/edicoes";

/// Element ids the page fetcher waits for before handing back HTML.
pub const LISTING_READY_ID: &str = "tab-edc";
pub const CARDS_READY_ID: &str = "card-estoque";

/// Store resources, relative to the store base URL.
pub const COLLECTIONS_RESOURCE: &str = "collections";
pub const CARDS_RESOURCE: &str = "cards";

/// Sentinel written in place of unavailable prices and images.
pub const NOT_AVAILABLE: &str = "N/A";

/// CSS selectors for the listing and collection pages.
pub mod selectors {
    pub const LISTING_TABLE: &str = "table#tab-edc";
    pub const LISTING_ROWS: &str = "tbody tr";
    pub const CELL: &str = "td";
    pub const ANCHOR: &str = "a";
    pub const CARD_GRID: &str = "div.grid-cardsinput";
    pub const CARD_ITEM: &str = "div.card-item";
    pub const CARD_LABEL: &str = "span.invisible-label";
    pub const CARD_LABEL_BOLD: &str = "b";
    pub const CARD_PRICES: &str = "div.card-prices";
    pub const PRICE_LOW: &str = "div.avgp-minprc";
    pub const PRICE_HIGH: &str = "div.avgp-maxprc";
    pub const CARD_LINK: &str = "a[href]";
    pub const CARD_IMAGE: &str = "img.main-card";
}

static DOTENV: Once = Once::new();

/// Load `.env` from the working directory exactly once.
pub fn load_dotenv() {
    DOTENV.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Everything a scrape pass needs, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote store (`MONGO_API`).
    pub store_api: Url,
    /// Base URL of the target site (`BASE_URL`).
    pub base_url: Url,
    /// Size of the worker pool used by both fan-out phases.
    pub workers: usize,
    /// Timeout applied to every page fetch and store request.
    pub request_timeout: Duration,
    /// How many times the page fetcher polls for the ready element.
    pub fetch_attempts: u32,
    /// Pause between page fetch attempts.
    pub fetch_delay: Duration,
    /// Where the aggregate is written after a pass, if anywhere.
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    /// Build a config from explicit base URLs and defaults for everything else.
    pub fn new(store_api: &str, base_url: &str) -> Result<Self> {
        Ok(Self {
            store_api: parse_base(ENV_STORE_API, store_api)?,
            base_url: parse_base(ENV_BASE_URL, base_url)?,
            workers: DEFAULT_WORKERS,
            request_timeout: DEFAULT_TIMEOUT,
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            fetch_delay: DEFAULT_FETCH_DELAY,
            snapshot_path: Some(PathBuf::from(DEFAULT_OUTPUT)),
        })
    }

    /// Read the configuration from the process environment.
    ///
    /// `MONGO_API` and `BASE_URL` are required; a missing or empty value is a
    /// [`CatalogError::MissingConfig`]. Unparseable optional values fall back
    /// to their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_env_or(None, None)
    }

    /// Like [`Config::from_env`], but explicit base URLs take precedence over
    /// the environment.
    pub fn from_env_or(store_api: Option<&str>, base_url: Option<&str>) -> Result<Self> {
        load_dotenv();
        let store_api = store_api
            .map(str::to_string)
            .or_else(|| env_opt(ENV_STORE_API))
            .ok_or(CatalogError::MissingConfig(ENV_STORE_API))?;
        let base_url = base_url
            .map(str::to_string)
            .or_else(|| env_opt(ENV_BASE_URL))
            .ok_or(CatalogError::MissingConfig(ENV_BASE_URL))?;

        let mut config = Self::new(&store_api, &base_url)?;
        config.workers = env_parse(ENV_WORKERS, DEFAULT_WORKERS);
        config.request_timeout = Duration::from_secs(env_parse(ENV_TIMEOUT, DEFAULT_TIMEOUT.as_secs()));
        config.fetch_attempts = env_parse(ENV_FETCH_ATTEMPTS, DEFAULT_FETCH_ATTEMPTS);
        config.fetch_delay = Duration::from_millis(env_parse(
            ENV_FETCH_DELAY,
            DEFAULT_FETCH_DELAY.as_millis() as u64,
        ));
        if let Some(output) = env_opt(ENV_OUTPUT) {
            config.snapshot_path = Some(PathBuf::from(output));
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(CatalogError::InvalidConfig("worker count must be at least 1".into()));
        }
        if self.fetch_attempts == 0 {
            return Err(CatalogError::InvalidConfig("fetch attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// URL of the collection listing page.
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.base_url, LISTING_PATH)
    }
}

/// Parse a base URL, making sure it ends with `/` so relative joins keep its path.
fn parse_base(name: &str, raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&normalized).map_err(|e| CatalogError::InvalidConfig(format!("{name}: {e}")))
}

/// Optional env var; `None` if unset or blank.
fn env_opt(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Parsed env var with a default fallback.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env_opt(key)
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default)
}
