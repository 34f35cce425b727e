//! Record extraction from rendered pages.
//!
//! Each extractor takes page HTML and the site base URL and returns structured
//! records. Missing optional structure is reported through `Option`, not errors.

pub mod cards;
pub mod collections;

pub use cards::extract_cards;
pub use collections::extract_collections;

use scraper::{ElementRef, Selector};

use crate::error::{CatalogError, Result};
use crate::normalize::clean_text;

/// Compile a CSS selector.
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CatalogError::InvalidSelector(format!("{css}: {e}")))
}

/// Whitespace-normalized text content of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}
