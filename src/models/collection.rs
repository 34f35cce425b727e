use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::card::Card;
use crate::config::COLLECTIONS_RESOURCE;
use crate::store::RemoteEntity;

// ---------------------------------------------------------------------------
// Collection: one row of the listing table
// ---------------------------------------------------------------------------

/// A release/set grouping of cards, keyed in the store by its acronym.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub link: String,
    pub acronym: String,
    pub release_date: NaiveDate,
    /// Store-assigned identifier, present once the collection has been synced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
}

impl Collection {
    /// Ordering used for the listing: release date, then acronym.
    pub fn sort_key(&self) -> (NaiveDate, &str) {
        (self.release_date, self.acronym.as_str())
    }

    pub fn is_synced(&self) -> bool {
        self.collection_id.is_some()
    }
}

impl RemoteEntity for Collection {
    const RESOURCE: &'static str = COLLECTIONS_RESOURCE;

    fn business_key(&self) -> &str {
        &self.acronym
    }

    fn attach_id(&mut self, id: String) {
        self.collection_id = Some(id);
    }
}

// ---------------------------------------------------------------------------
// CollectionCards: aggregate entry produced by a scrape pass
// ---------------------------------------------------------------------------

/// A collection together with the cards synced for it during a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionCards {
    #[serde(flatten)]
    pub collection: Collection,
    #[serde(default)]
    pub cards: Vec<Card>,
}
