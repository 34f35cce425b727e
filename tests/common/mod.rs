//! Shared test fixtures for the catalog sync integration tests.
//!
//! Provides HTML page builders for the listing and collection pages, a
//! map-backed [`PageFetcher`], and [`MemoryStore`], an in-memory store
//! transport that speaks the same GET/PUT/POST protocol as the real store and
//! can be told to reject writes for chosen business keys.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use card_catalog_sync::error::{CatalogError, Result};
use card_catalog_sync::fetch::{has_element_id, PageFetcher};
use card_catalog_sync::store::{StoreResponse, StoreTransport, SyncClient};
use card_catalog_sync::Config;
use reqwest::Method;
use serde_json::{json, Value};
use url::Url;

pub const SITE: &str = "https://cards.example.com/";
pub const STORE: &str = "http://store.test/api/";
pub const LISTING_URL: &str = "https://cards.example.com/?view=cards/edicoes";

pub fn site_url() -> Url {
    Url::parse(SITE).unwrap()
}

pub fn test_config() -> Config {
    let mut config = Config::new(STORE, SITE).unwrap();
    config.snapshot_path = None;
    config
}

// ---------------------------------------------------------------------------
// HTML builders
// ---------------------------------------------------------------------------

/// Link a listing row points at for `acronym`, as seen in the listing HTML.
pub fn collection_href(acronym: &str) -> String {
    format!("?view=cards/search&card=ed={acronym}")
}

/// Absolute collection link after resolution against [`SITE`].
pub fn collection_link(acronym: &str) -> String {
    format!("{SITE}{}", collection_href(acronym))
}

/// Listing page with one row per `(name, acronym, release date)`.
pub fn listing_page(rows: &[(&str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(name, acronym, date)| {
            format!(
                "<tr><td><a href=\"{}\">{name}</a></td><td>{acronym}</td><td>{date}</td></tr>\n",
                collection_href(acronym)
            )
        })
        .collect();
    format!(
        "<html><body>\
         <table id=\"tab-edc\">\
         <thead><tr><th>Edição</th><th>Sigla</th><th>Lançamento</th></tr></thead>\
         <tbody>{body}</tbody></table></body></html>"
    )
}

/// One priced card element.
pub fn card_item(name: &str, low: &str, high: &str) -> String {
    format!(
        "<div class=\"card-item\">\
         <a href=\"?view=cards/card&card={name}\"><img class=\"main-card\" src=\"https://img.example.com/{n}.jpg\"></a>\
         <span class=\"invisible-label\"><b>{name}</b></span>\
         <div class=\"card-prices\"><div class=\"avgp-minprc\">{low}</div><div class=\"avgp-maxprc\">{high}</div></div>\
         </div>",
        n = name.len()
    )
}

/// Collection page wrapping the given card elements in the card grid.
pub fn collection_page(items: &[String]) -> String {
    format!(
        "<html><body><div id=\"card-estoque\"></div>\
         <div class=\"grid-cardsinput\">{}</div></body></html>",
        items.concat()
    )
}

/// Collection page that renders but carries no card grid.
pub fn collection_page_without_grid() -> String {
    "<html><body><div id=\"card-estoque\"><p>Nenhum card encontrado</p></div></body></html>".to_string()
}

// ---------------------------------------------------------------------------
// FixtureFetcher
// ---------------------------------------------------------------------------

/// [`PageFetcher`] serving fixed HTML by URL.
///
/// Unknown URLs and pages without the ready element fail the same way a real
/// fetcher times out.
#[derive(Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    /// Handle onto the list of URLs fetched so far.
    pub fn fetched(&self) -> Arc<Mutex<Vec<String>>> {
        self.fetched.clone()
    }
}

impl PageFetcher for FixtureFetcher {
    fn fetch(&self, url: &str, ready_element_id: &str) -> Result<String> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(html) if has_element_id(html, ready_element_id) => Ok(html.clone()),
            _ => Err(CatalogError::ElementNotReady {
                url: url.to_string(),
                element_id: ready_element_id.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Percent-encode `key` the way a store URL path segment carries it.
pub fn encode_segment(key: &str) -> String {
    let mut url = Url::parse("http://segment.test/").unwrap();
    url.path_segments_mut().unwrap().pop_if_empty().push(key);
    url.path_segments().unwrap().last().unwrap().to_string()
}

#[derive(Default)]
struct StoreState {
    records: HashMap<(String, String), Value>,
    failing: HashSet<String>,
    next_id: usize,
    posts: usize,
    puts: usize,
    requests: Vec<(Method, String)>,
}

/// In-memory store behind the [`StoreTransport`] seam.
///
/// Clones share state, so a test can keep one handle and give another to the
/// [`SyncClient`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer PUT and POST for `key` with HTTP 500.
    pub fn fail_on(&self, key: &str) {
        self.state.lock().unwrap().failing.insert(encode_segment(key));
    }

    /// Pre-populate a record as if an earlier run had created it.
    pub fn seed(&self, resource: &str, key: &str, id: &str, body: Value) {
        let mut record = body;
        record["_id"] = json!(id);
        self.state
            .lock()
            .unwrap()
            .records
            .insert((resource.to_string(), encode_segment(key)), record);
    }

    pub fn record(&self, resource: &str, key: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(&(resource.to_string(), encode_segment(key)))
            .cloned()
    }

    pub fn count(&self, resource: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .records
            .keys()
            .filter(|(r, _)| r == resource)
            .count()
    }

    pub fn posts(&self) -> usize {
        self.state.lock().unwrap().posts
    }

    pub fn puts(&self) -> usize {
        self.state.lock().unwrap().puts
    }

    pub fn requests(&self) -> Vec<(Method, String)> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn client(&self) -> SyncClient {
        SyncClient::with_transport(Url::parse(STORE).unwrap(), Box::new(self.clone()))
    }
}

fn business_key(resource: &str, body: &Value) -> Option<String> {
    let field = match resource {
        "collections" => "acronym",
        "cards" => "collection_number",
        _ => return None,
    };
    body.get(field).and_then(Value::as_str).map(encode_segment)
}

fn respond(status: u16, body: Value) -> Result<StoreResponse> {
    Ok(StoreResponse { status, body })
}

impl StoreTransport for MemoryStore {
    fn send(&self, method: Method, url: &Url, body: Option<&Value>) -> Result<StoreResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push((method.clone(), url.to_string()));

        let segments: Vec<String> = url
            .path_segments()
            .map(|s| s.map(str::to_string).collect())
            .unwrap_or_default();
        let (resource, key) = match segments.as_slice() {
            [_, resource] => (resource.clone(), None),
            [_, resource, key] => (resource.clone(), Some(key.clone())),
            _ => return respond(404, Value::Null),
        };

        match (method, key) {
            (Method::GET, Some(key)) => match state.records.get(&(resource, key)) {
                Some(record) => respond(200, record.clone()),
                None => respond(404, json!({ "error": "not found" })),
            },
            (Method::PUT, Some(key)) => {
                if state.failing.contains(&key) {
                    return respond(500, json!({ "error": "write rejected" }));
                }
                let map_key = (resource, key);
                let Some(existing) = state.records.get(&map_key).cloned() else {
                    return respond(404, json!({ "error": "not found" }));
                };
                let mut record = body.cloned().unwrap_or(Value::Null);
                record["_id"] = existing["_id"].clone();
                state.puts += 1;
                state.records.insert(map_key, record.clone());
                respond(200, record)
            }
            (Method::POST, None) => {
                let payload = body.cloned().unwrap_or(Value::Null);
                let Some(key) = business_key(&resource, &payload) else {
                    return respond(400, json!({ "error": "missing key" }));
                };
                if state.failing.contains(&key) {
                    return respond(500, json!({ "error": "write rejected" }));
                }
                state.next_id += 1;
                state.posts += 1;
                let id = format!("{resource}-{}", state.next_id);
                let mut record = payload;
                record["_id"] = json!(id);
                state.records.insert((resource, key), record.clone());
                respond(201, record)
            }
            _ => respond(405, Value::Null),
        }
    }
}
