use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::price::Price;
use crate::config::CARDS_RESOURCE;
use crate::store::RemoteEntity;

// ---------------------------------------------------------------------------
// Card: one card element of a collection page
// ---------------------------------------------------------------------------

/// An individual tradeable card, keyed in the store by `collection_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Identifier of the owning collection in the store.
    pub collection_id: Option<String>,
    pub number: String,
    pub collection_number: String,
    pub name: String,
    pub lowest_price: Price,
    pub highest_price: Price,
    pub link_marketplace: String,
    /// Image URL, `"N/A"` when the image element has no source, `None` when
    /// the card has no image element at all.
    pub image: Option<String>,
    pub last_updated: DateTime<Utc>,
    /// Store-assigned identifier, present once the card has been synced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
}

impl Card {
    pub fn is_synced(&self) -> bool {
        self.card_id.is_some()
    }
}

impl RemoteEntity for Card {
    const RESOURCE: &'static str = CARDS_RESOURCE;

    fn business_key(&self) -> &str {
        &self.collection_number
    }

    fn attach_id(&mut self, id: String) {
        self.card_id = Some(id);
    }
}
