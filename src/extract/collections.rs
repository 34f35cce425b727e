//! Collection listing extraction.

use chrono::NaiveDate;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use super::{element_text, selector};
use crate::config::selectors;
use crate::error::{CatalogError, Result};
use crate::models::Collection;
use crate::normalize::resolve_link;

/// Date format used by the listing's release-date column.
pub const RELEASE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse the collection listing page.
///
/// Reads name and link from the first cell, acronym from the second and the
/// release date from the third. Rows that lack any of these are skipped with a
/// warning. The result is sorted by `(release_date, acronym)` ascending.
///
/// Fails with [`CatalogError::ListingNotFound`] when the page has no listing
/// table.
pub fn extract_collections(html: &str, base_url: &Url) -> Result<Vec<Collection>> {
    let document = Html::parse_document(html);
    let table_sel = selector(selectors::LISTING_TABLE)?;
    let row_sel = selector(selectors::LISTING_ROWS)?;
    let cell_sel = selector(selectors::CELL)?;
    let anchor_sel = selector(selectors::ANCHOR)?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| CatalogError::ListingNotFound(base_url.to_string()))?;

    let mut collections = Vec::new();
    for (index, row) in table.select(&row_sel).enumerate() {
        let cells: Vec<_> = row.select(&cell_sel).collect();
        if cells.len() < 3 {
            warn!(row = index, cells = cells.len(), "listing row has too few cells, skipping");
            continue;
        }

        let Some(anchor) = cells[0].select(&anchor_sel).next() else {
            warn!(row = index, "listing row has no collection link, skipping");
            continue;
        };
        let name = element_text(anchor);
        let Some(link) = anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_link(base_url, href))
        else {
            warn!(row = index, name = %name, "collection link is missing or invalid, skipping");
            continue;
        };

        let acronym = element_text(cells[1]);
        let raw_date = element_text(cells[2]);
        let release_date = match NaiveDate::parse_from_str(&raw_date, RELEASE_DATE_FORMAT) {
            Ok(date) => date,
            Err(e) => {
                warn!(row = index, acronym = %acronym, date = %raw_date, error = %e, "unparseable release date, skipping");
                continue;
            }
        };

        collections.push(Collection {
            name,
            link,
            acronym,
            release_date,
            collection_id: None,
        });
    }

    collections.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    debug!(count = collections.len(), "extracted collections from listing");
    Ok(collections)
}
