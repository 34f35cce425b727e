//! Async wrapper around [`CatalogScraper`] for use in async runtimes (Tokio, etc.).
//!
//! Page fetches and store requests are blocking, so every operation is moved
//! onto Tokio's blocking thread pool via [`tokio::task::spawn_blocking`],
//! keeping the async event loop free.
//!
//! # Example
//!
//! ```no_run
//! use card_catalog_sync::{AsyncCatalogScraper, CatalogScraper};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let scraper = AsyncCatalogScraper::build(CatalogScraper::builder()).await.unwrap();
//!     let run = scraper.run().await.unwrap();
//!     println!("{} cards synced", run.card_count());
//! }
//! ```

use std::sync::Arc;

use crate::error::{CatalogError, Result};
use crate::models::Collection;
use crate::{CatalogScraper, CatalogScraperBuilder, ScrapeRun};

/// Async wrapper around [`CatalogScraper`].
///
/// Cheap to clone; clones share the same pipeline and worker pool.
#[derive(Clone)]
pub struct AsyncCatalogScraper {
    inner: Arc<CatalogScraper>,
}

impl AsyncCatalogScraper {
    /// Build the scraper on the blocking thread pool.
    pub async fn build(builder: CatalogScraperBuilder) -> Result<Self> {
        tokio::task::spawn_blocking(move || {
            let scraper = builder.build()?;
            Ok(Self {
                inner: Arc::new(scraper),
            })
        })
        .await
        .map_err(|e| CatalogError::Task(format!("Task join error: {e}")))?
    }

    /// Wrap an already constructed scraper.
    pub fn from_scraper(scraper: CatalogScraper) -> Self {
        Self {
            inner: Arc::new(scraper),
        }
    }

    /// Run a sync scraper operation on the blocking thread pool.
    pub async fn spawn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CatalogScraper) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let scraper = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&scraper))
            .await
            .map_err(|e| CatalogError::Task(format!("Task join error: {e}")))?
    }

    /// Run one full pass asynchronously.
    pub async fn run(&self) -> Result<ScrapeRun> {
        self.spawn(|s| s.run()).await
    }

    /// Fetch and parse the collection listing asynchronously.
    pub async fn collections(&self) -> Result<Vec<Collection>> {
        self.spawn(|s| s.pipeline().fetch_listing()).await
    }
}
