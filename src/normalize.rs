//! Normalization of raw scraped strings into canonical values.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::models::Price;

/// A parenthesized group that contains no nested parentheses.
fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(([^()]*)\)").expect("static regex"))
}

/// Convert scraped price text into a [`Price`].
///
/// Every non-digit is stripped and the last two remaining digits are read as
/// cents, so `"R$ 1.234,56"` becomes `1234.56`. Inputs with fewer than three
/// digits are left-padded (`"5"` is `0.05`). Text without any digit yields
/// [`Price::Unavailable`].
pub fn parse_price(raw: &str) -> Price {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Price::Unavailable;
    }
    let padded = format!("{digits:0>3}");
    let (units, cents) = padded.split_at(padded.len() - 2);
    match format!("{units}.{cents}").parse::<f64>() {
        Ok(value) => Price::Amount(value),
        Err(_) => Price::Unavailable,
    }
}

/// Extract the card number from a display name.
///
/// Returns the content of the rightmost `(...)` group, verbatim, or the whole
/// name when the name carries no such group.
pub fn card_number(name: &str) -> String {
    number_pattern()
        .captures_iter(name)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Business key of a card within the store.
pub fn collection_number(acronym: &str, number: &str) -> String {
    format!("{acronym}: {number}")
}

/// Resolve `href` against `base`, percent-encoding any spaces.
///
/// Returns `None` when the reference cannot be joined into a valid URL.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim())
        .ok()
        .map(|url| url.as_str().replace(' ', "%20"))
}

/// Collapse runs of whitespace and trim the ends.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
