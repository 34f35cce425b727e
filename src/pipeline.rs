//! Two-phase scrape-and-sync orchestration over a bounded worker pool.
//!
//! A pass runs `listing -> collection sync -> card fetch and sync -> aggregate`.
//! Both fan-out phases share one fixed-size rayon pool, and the collection
//! phase is fully joined before any card page is fetched, because cards need
//! their collection's store id. Every task yields its own `Result`; failures
//! are logged with the business key and dropped from the aggregate without
//! touching sibling tasks.

use std::ops::AddAssign;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::{Config, CARDS_READY_ID, LISTING_READY_ID};
use crate::error::{CatalogError, Result};
use crate::extract::{extract_cards, extract_collections};
use crate::fetch::PageFetcher;
use crate::models::{Card, Collection, CollectionCards};
use crate::store::{SyncAction, SyncClient};

// ---------------------------------------------------------------------------
// RunStats
// ---------------------------------------------------------------------------

/// Per-pass counters, summed across all tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub collections_created: usize,
    pub collections_updated: usize,
    pub collections_failed: usize,
    /// Collection pages that could not be fetched or had no card grid.
    pub pages_failed: usize,
    pub cards_created: usize,
    pub cards_updated: usize,
    pub cards_failed: usize,
}

impl RunStats {
    fn record_collection(&mut self, outcome: &Result<SyncAction>) {
        match outcome {
            Ok(SyncAction::Created) => self.collections_created += 1,
            Ok(SyncAction::Updated) => self.collections_updated += 1,
            Err(_) => self.collections_failed += 1,
        }
    }

    fn record_card(&mut self, outcome: &Result<SyncAction>) {
        match outcome {
            Ok(SyncAction::Created) => self.cards_created += 1,
            Ok(SyncAction::Updated) => self.cards_updated += 1,
            Err(_) => self.cards_failed += 1,
        }
    }

    pub fn cards_synced(&self) -> usize {
        self.cards_created + self.cards_updated
    }
}

impl AddAssign for RunStats {
    fn add_assign(&mut self, rhs: Self) {
        self.collections_created += rhs.collections_created;
        self.collections_updated += rhs.collections_updated;
        self.collections_failed += rhs.collections_failed;
        self.pages_failed += rhs.pages_failed;
        self.cards_created += rhs.cards_created;
        self.cards_updated += rhs.cards_updated;
        self.cards_failed += rhs.cards_failed;
    }
}

/// Aggregate produced by [`Pipeline::run`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    /// Collections in `(release_date, acronym)` order with their synced cards.
    pub collections: Vec<CollectionCards>,
    pub stats: RunStats,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Runs scrape passes against one site and one store.
pub struct Pipeline {
    config: Config,
    fetcher: Box<dyn PageFetcher>,
    store: SyncClient,
    pool: ThreadPool,
}

impl Pipeline {
    /// Build a pipeline with a worker pool sized from `config.workers`.
    pub fn new(config: &Config, fetcher: Box<dyn PageFetcher>, store: SyncClient) -> Result<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|idx| format!("catalog-worker-{idx}"))
            .build()
            .map_err(|e| CatalogError::Task(format!("failed to build worker pool: {e}")))?;
        Ok(Self {
            config: config.clone(),
            fetcher,
            store,
            pool,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one full pass.
    ///
    /// A listing that cannot be fetched or parsed yields an empty output.
    pub fn run(&self) -> PipelineOutput {
        let collections = match self.fetch_listing() {
            Ok(collections) => collections,
            Err(e) => {
                error!(url = %self.config.listing_url(), error = %e, "listing unavailable, nothing to sync");
                return PipelineOutput::default();
            }
        };
        info!(count = collections.len(), "collections found");

        let mut stats = RunStats::default();
        let synced = self.sync_collections(collections, &mut stats);
        let collections = self.sync_all_cards(synced, &mut stats);

        PipelineOutput { collections, stats }
    }

    /// Fetch and parse the collection listing.
    pub fn fetch_listing(&self) -> Result<Vec<Collection>> {
        let url = self.config.listing_url();
        let html = self.fetcher.fetch(&url, LISTING_READY_ID)?;
        extract_collections(&html, &self.config.base_url)
    }

    /// Phase one: upsert every collection in parallel.
    ///
    /// Order is preserved. Collections whose sync failed are kept without a
    /// `collection_id`.
    pub fn sync_collections(&self, collections: Vec<Collection>, stats: &mut RunStats) -> Vec<Collection> {
        let results: Vec<(Collection, Result<SyncAction>)> = self.pool.install(|| {
            collections
                .into_par_iter()
                .map(|mut collection| {
                    let outcome = self.store.sync(&mut collection);
                    (collection, outcome)
                })
                .collect()
        });

        results
            .into_iter()
            .map(|(collection, outcome)| {
                stats.record_collection(&outcome);
                collection
            })
            .collect()
    }

    /// Phase two: fetch each synced collection's page and upsert its cards.
    ///
    /// Collections without a store id are passed through with no cards.
    pub fn sync_all_cards(&self, collections: Vec<Collection>, stats: &mut RunStats) -> Vec<CollectionCards> {
        let results: Vec<(CollectionCards, RunStats)> = self.pool.install(|| {
            collections
                .into_par_iter()
                .map(|collection| {
                    if !collection.is_synced() {
                        warn!(acronym = %collection.acronym, "collection not synced, skipping its cards");
                        return (
                            CollectionCards {
                                collection,
                                cards: Vec::new(),
                            },
                            RunStats::default(),
                        );
                    }
                    let (cards, task_stats) = self.sync_collection_cards(&collection);
                    (CollectionCards { collection, cards }, task_stats)
                })
                .collect()
        });

        results
            .into_iter()
            .map(|(entry, task_stats)| {
                *stats += task_stats;
                entry
            })
            .collect()
    }

    /// Fetch one collection page and upsert its cards in parallel.
    ///
    /// Returns only the cards that synced.
    pub fn sync_collection_cards(&self, collection: &Collection) -> (Vec<Card>, RunStats) {
        let mut stats = RunStats::default();
        let cards = match self.extract_collection_cards(collection) {
            Ok(Some(cards)) => cards,
            Ok(None) => {
                warn!(acronym = %collection.acronym, name = %collection.name, "card grid not found");
                stats.pages_failed += 1;
                return (Vec::new(), stats);
            }
            Err(e) => {
                error!(acronym = %collection.acronym, url = %collection.link, error = %e, "collection page failed");
                stats.pages_failed += 1;
                return (Vec::new(), stats);
            }
        };

        let results: Vec<(Card, Result<SyncAction>)> = self.pool.install(|| {
            cards
                .into_par_iter()
                .map(|mut card| {
                    let outcome = self.store.sync(&mut card);
                    (card, outcome)
                })
                .collect()
        });

        let synced = results
            .into_iter()
            .filter_map(|(card, outcome)| {
                stats.record_card(&outcome);
                outcome.ok().map(|_| card)
            })
            .collect::<Vec<_>>();

        info!(
            acronym = %collection.acronym,
            synced = synced.len(),
            failed = stats.cards_failed,
            "collection cards processed"
        );
        (synced, stats)
    }

    fn extract_collection_cards(&self, collection: &Collection) -> Result<Option<Vec<Card>>> {
        info!(acronym = %collection.acronym, url = %collection.link, "scraping collection");
        let html = self.fetcher.fetch(&collection.link, CARDS_READY_ID)?;
        extract_cards(collection, &html, &self.config.base_url)
    }
}
