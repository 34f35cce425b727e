//! Card extraction from a collection page.

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::{element_text, selector};
use crate::config::{selectors, NOT_AVAILABLE};
use crate::error::Result;
use crate::models::{Card, Collection, Price};
use crate::normalize::{card_number, collection_number, parse_price, resolve_link};

struct CardSelectors {
    item: Selector,
    label: Selector,
    label_bold: Selector,
    prices: Selector,
    low: Selector,
    high: Selector,
    link: Selector,
    image: Selector,
}

impl CardSelectors {
    fn compile() -> Result<Self> {
        Ok(Self {
            item: selector(selectors::CARD_ITEM)?,
            label: selector(selectors::CARD_LABEL)?,
            label_bold: selector(selectors::CARD_LABEL_BOLD)?,
            prices: selector(selectors::CARD_PRICES)?,
            low: selector(selectors::PRICE_LOW)?,
            high: selector(selectors::PRICE_HIGH)?,
            link: selector(selectors::CARD_LINK)?,
            image: selector(selectors::CARD_IMAGE)?,
        })
    }
}

/// Parse the cards listed on a collection page.
///
/// Returns `Ok(None)` when the page has no card grid; callers treat that as a
/// recoverable "container not found" condition. Card elements without a name
/// are skipped. Each card inherits the collection's `collection_id`.
pub fn extract_cards(collection: &Collection, html: &str, base_url: &Url) -> Result<Option<Vec<Card>>> {
    let document = Html::parse_document(html);
    let grid_sel = selector(selectors::CARD_GRID)?;
    let sels = CardSelectors::compile()?;

    let Some(grid) = document.select(&grid_sel).next() else {
        return Ok(None);
    };

    let mut cards = Vec::new();
    for (index, item) in grid.select(&sels.item).enumerate() {
        match card_from_element(item, &sels, collection, base_url) {
            Some(card) => cards.push(card),
            None => warn!(acronym = %collection.acronym, item = index, "card element has no name, skipping"),
        }
    }

    debug!(acronym = %collection.acronym, count = cards.len(), "extracted cards");
    Ok(Some(cards))
}

fn card_from_element(
    item: ElementRef<'_>,
    sels: &CardSelectors,
    collection: &Collection,
    base_url: &Url,
) -> Option<Card> {
    let label = item.select(&sels.label).next()?;
    let name = label
        .select(&sels.label_bold)
        .next()
        .map(element_text)
        .unwrap_or_else(|| element_text(label));
    if name.is_empty() {
        return None;
    }

    let (lowest_price, highest_price) = match item.select(&sels.prices).next() {
        Some(prices) => (
            price_in(prices, &sels.low),
            price_in(prices, &sels.high),
        ),
        None => (Price::Unavailable, Price::Unavailable),
    };

    let link_marketplace = item
        .select(&sels.link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_link(base_url, href))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let image = item.select(&sels.image).next().map(|img| {
        let attrs = img.value();
        attrs
            .attr("src")
            .filter(|src| !src.trim().is_empty())
            .or_else(|| attrs.attr("data-src"))
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    });

    let number = card_number(&name);
    Some(Card {
        collection_id: collection.collection_id.clone(),
        collection_number: collection_number(&collection.acronym, &number),
        number,
        name,
        lowest_price,
        highest_price,
        link_marketplace,
        image,
        last_updated: Utc::now(),
        card_id: None,
    })
}

fn price_in(prices: ElementRef<'_>, sel: &Selector) -> Price {
    prices
        .select(sel)
        .next()
        .map(|el| parse_price(&element_text(el)))
        .unwrap_or(Price::Unavailable)
}
