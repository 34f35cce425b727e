//! Listing and collection page extraction tests against HTML fixtures.

mod common;

use card_catalog_sync::error::CatalogError;
use card_catalog_sync::extract::{extract_cards, extract_collections};
use card_catalog_sync::models::{Collection, Price};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn synced_collection(acronym: &str) -> Collection {
    Collection {
        name: "Alpha".to_string(),
        link: common::collection_link(acronym),
        acronym: acronym.to_string(),
        release_date: date(1993, 8, 5),
        collection_id: Some("collections-7".to_string()),
    }
}

// ---------------------------------------------------------------------------
// extract_collections
// ---------------------------------------------------------------------------

#[test]
fn collections_are_sorted_by_release_date_then_acronym() {
    let html = common::listing_page(&[
        ("Zendikar", "ZEN", "02/10/2009"),
        ("Magic 2010", "M10", "17/07/2009"),
        ("Planechase", "HOP", "04/09/2009"),
        ("Alara Reborn", "ARB", "30/04/2009"),
        ("Duel Decks: Garruk vs. Liliana", "DDD", "04/09/2009"),
    ]);

    let collections = extract_collections(&html, &common::site_url()).unwrap();
    let acronyms: Vec<&str> = collections.iter().map(|c| c.acronym.as_str()).collect();
    assert_eq!(acronyms, vec!["ARB", "M10", "DDD", "HOP", "ZEN"]);

    for pair in collections.windows(2) {
        assert!(pair[0].sort_key() <= pair[1].sort_key());
    }
}

#[test]
fn collection_fields_are_read_from_cells() {
    let html = common::listing_page(&[("Magic 2010", "M10", "17/07/2009")]);

    let collections = extract_collections(&html, &common::site_url()).unwrap();
    assert_eq!(collections.len(), 1);
    let m10 = &collections[0];
    assert_eq!(m10.name, "Magic 2010");
    assert_eq!(m10.acronym, "M10");
    assert_eq!(m10.release_date, date(2009, 7, 17));
    assert_eq!(m10.link, common::collection_link("M10"));
    assert!(m10.collection_id.is_none());
}

#[test]
fn collection_link_spaces_are_percent_encoded() {
    let html = common::listing_page(&[("Core Set", "M 10", "17/07/2009")]);

    let collections = extract_collections(&html, &common::site_url()).unwrap();
    assert_eq!(
        collections[0].link,
        "https://cards.example.com/?view=cards/search&card=ed=M%2010"
    );
}

#[test]
fn malformed_rows_are_skipped() {
    let html = r#"
        <table id="tab-edc"><tbody>
          <tr><td><a href="?ed=LEA">Alpha</a></td><td>LEA</td><td>05/08/1993</td></tr>
          <tr><td>No link here</td><td>XXX</td><td>01/01/2000</td></tr>
          <tr><td><a href="?ed=BAD">Bad Date</a></td><td>BAD</td><td>1993-08-05</td></tr>
          <tr><td><a href="?ed=TWO">Two Cells</a></td><td>TWO</td></tr>
          <tr><td><a href="?ed=LEB">Beta</a></td><td>LEB</td><td>04/10/1993</td></tr>
        </tbody></table>"#;

    let collections = extract_collections(html, &common::site_url()).unwrap();
    let acronyms: Vec<&str> = collections.iter().map(|c| c.acronym.as_str()).collect();
    assert_eq!(acronyms, vec!["LEA", "LEB"]);
}

#[test]
fn empty_table_yields_no_collections() {
    let html = common::listing_page(&[]);
    let collections = extract_collections(&html, &common::site_url()).unwrap();
    assert!(collections.is_empty());
}

#[test]
fn missing_listing_table_is_an_error() {
    let html = "<html><body><div id=\"tab-edc\">maintenance</div></body></html>";
    let err = extract_collections(html, &common::site_url()).unwrap_err();
    assert!(matches!(err, CatalogError::ListingNotFound(_)));
}

// ---------------------------------------------------------------------------
// extract_cards
// ---------------------------------------------------------------------------

const COLLECTION_PAGE: &str = r#"
<html><body>
<div id="card-estoque"></div>
<div class="grid-cardsinput">
  <div class="card-item">
    <a href="?view=cards/card&card=Black Lotus&ed=LEA"><img class="main-card" src="https://img.example.com/lotus.jpg" data-src="https://img.example.com/lazy-lotus.jpg"></a>
    <span class="invisible-label"><b>Black Lotus (A123)</b></span>
    <div class="card-prices">
      <div class="avgp-minprc">R$ 1.234,56</div>
      <div class="avgp-maxprc">R$ 2.000,00</div>
    </div>
  </div>
  <div class="card-item">
    <a href="/cards/Mox Pearl"><img class="main-card" data-src="https://img.example.com/pearl.jpg"></a>
    <span class="invisible-label"><b>Mox Pearl (263)</b></span>
  </div>
  <div class="card-item">
    <a href="?view=cards/card&card=Time Walk"></a>
    <span class="invisible-label"><b>Time Walk</b></span>
    <div class="card-prices">
      <div class="avgp-minprc">R$ 900,00</div>
      <div class="avgp-maxprc">R$ 1.100,50</div>
    </div>
  </div>
  <div class="card-item">
    <a href="?view=cards/card&card=Ancestral Recall"><img class="main-card"></a>
    <span class="invisible-label"><b>Ancestral Recall (48)</b></span>
  </div>
  <div class="card-item">
    <a href="?view=cards/card&card=nameless"></a>
  </div>
</div>
</body></html>"#;

fn parsed_cards() -> Vec<card_catalog_sync::models::Card> {
    extract_cards(&synced_collection("LEA"), COLLECTION_PAGE, &common::site_url())
        .unwrap()
        .expect("card grid present")
}

#[test]
fn cards_are_extracted_in_page_order() {
    let names: Vec<String> = parsed_cards().into_iter().map(|c| c.name).collect();
    assert_eq!(
        names,
        vec!["Black Lotus (A123)", "Mox Pearl (263)", "Time Walk", "Ancestral Recall (48)"]
    );
}

#[test]
fn card_prices_are_normalized() {
    let cards = parsed_cards();
    assert_eq!(cards[0].lowest_price, Price::Amount(1234.56));
    assert_eq!(cards[0].highest_price, Price::Amount(2000.0));
    assert_eq!(cards[2].lowest_price, Price::Amount(900.0));
    assert_eq!(cards[2].highest_price, Price::Amount(1100.5));
}

#[test]
fn missing_price_block_yields_sentinel() {
    let cards = parsed_cards();
    assert_eq!(cards[1].lowest_price, Price::Unavailable);
    assert_eq!(cards[1].highest_price, Price::Unavailable);
    assert_eq!(cards[1].lowest_price.to_string(), "N/A");
    assert!(!cards[1].highest_price.is_available());
    assert_eq!(cards[1].highest_price.amount(), None);
    assert!(cards[0].lowest_price.is_available());
}

#[test]
fn card_number_and_business_key() {
    let cards = parsed_cards();
    assert_eq!(cards[0].number, "A123");
    assert_eq!(cards[0].collection_number, "LEA: A123");
    assert_eq!(cards[2].number, "Time Walk");
    assert_eq!(cards[2].collection_number, "LEA: Time Walk");
}

#[test]
fn card_image_fallbacks() {
    let cards = parsed_cards();
    assert_eq!(cards[0].image.as_deref(), Some("https://img.example.com/lotus.jpg"));
    assert_eq!(cards[1].image.as_deref(), Some("https://img.example.com/pearl.jpg"));
    assert_eq!(cards[2].image, None);
    assert_eq!(cards[3].image.as_deref(), Some("N/A"));
}

#[test]
fn card_links_are_resolved_against_base() {
    let cards = parsed_cards();
    assert_eq!(
        cards[0].link_marketplace,
        "https://cards.example.com/?view=cards/card&card=Black%20Lotus&ed=LEA"
    );
    assert_eq!(cards[1].link_marketplace, "https://cards.example.com/cards/Mox%20Pearl");
}

#[test]
fn cards_inherit_collection_id() {
    for card in parsed_cards() {
        assert_eq!(card.collection_id.as_deref(), Some("collections-7"));
        assert!(card.card_id.is_none());
    }
}

#[test]
fn missing_card_grid_returns_none() {
    let html = common::collection_page_without_grid();
    let cards = extract_cards(&synced_collection("LEA"), &html, &common::site_url()).unwrap();
    assert!(cards.is_none());
}

#[test]
fn empty_card_grid_returns_empty_list() {
    let html = common::collection_page(&[]);
    let cards = extract_cards(&synced_collection("LEA"), &html, &common::site_url()).unwrap();
    assert_eq!(cards, Some(Vec::new()));
}
