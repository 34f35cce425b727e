//! Trading-card catalog scraper and store synchronizer.
//!
//! Reads the collection listing of a card catalog site, upserts each
//! collection into a remote HTTP store keyed by acronym, then scrapes every
//! synced collection's page and upserts its cards keyed by collection number.
//! Work fans out over a bounded worker pool; single-item failures are logged
//! and never abort the pass.
//!
//! # Quick start
//!
//! ```no_run
//! use card_catalog_sync::CatalogScraper;
//!
//! // Reads MONGO_API and BASE_URL from the environment (or `.env`).
//! let scraper = CatalogScraper::builder().build().unwrap();
//! let run = scraper.run().unwrap();
//! println!("{} collections in {:?}", run.collections.len(), run.elapsed);
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod snapshot;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncCatalogScraper;
pub use config::Config;
pub use error::{CatalogError, Result};
pub use fetch::{HttpPageFetcher, PageFetcher};
pub use pipeline::{Pipeline, RunStats};
pub use store::{StoreTransport, SyncClient};

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::info;

use crate::models::CollectionCards;

// ---------------------------------------------------------------------------
// CatalogScraperBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CatalogScraper`].
///
/// Anything not set explicitly comes from the environment; see
/// [`Config::from_env`].
#[derive(Default)]
pub struct CatalogScraperBuilder {
    store_api: Option<String>,
    base_url: Option<String>,
    workers: Option<usize>,
    timeout: Option<Duration>,
    fetch_attempts: Option<u32>,
    fetch_delay: Option<Duration>,
    snapshot_path: Option<Option<PathBuf>>,
    fetcher: Option<Box<dyn PageFetcher>>,
    transport: Option<Box<dyn StoreTransport>>,
}

impl CatalogScraperBuilder {
    /// Set the store base URL instead of reading `MONGO_API`.
    pub fn store_api(mut self, url: &str) -> Self {
        self.store_api = Some(url.to_string());
        self
    }

    /// Set the site base URL instead of reading `BASE_URL`.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    /// Set the worker pool size. Defaults to 6.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set the timeout for page fetches and store requests.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set how often the page fetcher polls for a page's ready element, and
    /// how long it waits between attempts.
    pub fn fetch_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.fetch_attempts = Some(attempts);
        self.fetch_delay = Some(delay);
        self
    }

    /// Write the aggregate to `path` after each pass.
    ///
    /// A `.gz` extension writes gzip-compressed JSON.
    pub fn snapshot_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.snapshot_path = Some(Some(path.as_ref().to_path_buf()));
        self
    }

    /// Do not write a snapshot after each pass.
    pub fn no_snapshot(mut self) -> Self {
        self.snapshot_path = Some(None);
        self
    }

    /// Use a custom page fetcher instead of [`HttpPageFetcher`].
    pub fn fetcher(mut self, fetcher: Box<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use a custom store transport instead of HTTP.
    pub fn transport(mut self, transport: Box<dyn StoreTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Resolve the configuration without building any clients.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::from_env_or(self.store_api.as_deref(), self.base_url.as_deref())?;
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout = timeout;
        }
        if let Some(attempts) = self.fetch_attempts {
            config.fetch_attempts = attempts;
        }
        if let Some(delay) = self.fetch_delay {
            config.fetch_delay = delay;
        }
        if let Some(path) = &self.snapshot_path {
            config.snapshot_path = path.clone();
        }
        config.validate()?;
        Ok(config)
    }

    /// Build the scraper, constructing HTTP clients and the worker pool.
    ///
    /// Fails with [`CatalogError::MissingConfig`] when a required base URL is
    /// neither set nor present in the environment.
    pub fn build(self) -> Result<CatalogScraper> {
        let config = self.config()?;
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Box::new(HttpPageFetcher::new(&config)?),
        };
        let store = match self.transport {
            Some(transport) => SyncClient::with_transport(config.store_api.clone(), transport),
            None => SyncClient::new(&config)?,
        };
        let pipeline = Pipeline::new(&config, fetcher, store)?;
        Ok(CatalogScraper { pipeline })
    }
}

// ---------------------------------------------------------------------------
// ScrapeRun
// ---------------------------------------------------------------------------

/// Result of one scrape-and-sync pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeRun {
    /// Collections in `(release_date, acronym)` order with their synced cards.
    pub collections: Vec<CollectionCards>,
    pub stats: RunStats,
    pub elapsed: Duration,
}

impl ScrapeRun {
    /// Total number of cards in the aggregate.
    pub fn card_count(&self) -> usize {
        self.collections.iter().map(|c| c.cards.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// CatalogScraper
// ---------------------------------------------------------------------------

/// Entry point: runs full passes and persists their snapshot.
///
/// Created via [`CatalogScraper::builder()`].
pub struct CatalogScraper {
    pipeline: Pipeline,
}

impl CatalogScraper {
    pub fn builder() -> CatalogScraperBuilder {
        CatalogScraperBuilder::default()
    }

    pub fn config(&self) -> &Config {
        self.pipeline.config()
    }

    /// Return a reference to the underlying [`Pipeline`] for phase-level access.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run one full pass, timing it and writing the snapshot if configured.
    ///
    /// Item-level failures never fail the pass; only a snapshot write error
    /// is returned.
    pub fn run(&self) -> Result<ScrapeRun> {
        let started = Instant::now();
        info!(site = %self.config().base_url, store = %self.config().store_api, "scrape started");

        let output = self.pipeline.run();
        let run = ScrapeRun {
            collections: output.collections,
            stats: output.stats,
            elapsed: started.elapsed(),
        };

        if let Some(path) = &self.config().snapshot_path {
            snapshot::write(path, &run.collections)?;
        }

        info!(
            collections = run.collections.len(),
            cards = run.card_count(),
            collections_failed = run.stats.collections_failed,
            cards_failed = run.stats.cards_failed,
            pages_failed = run.stats.pages_failed,
            elapsed_secs = run.elapsed.as_secs_f64(),
            "scrape finished"
        );
        Ok(run)
    }
}

impl fmt::Display for CatalogScraper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config();
        write!(
            f,
            "CatalogScraper(site={}, store={}, workers={})",
            config.base_url, config.store_api, config.workers
        )
    }
}
