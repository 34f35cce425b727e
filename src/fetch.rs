//! Page fetch boundary.
//!
//! The pipeline only ever asks for "the HTML of this URL once the element with
//! this id exists". [`HttpPageFetcher`] answers that with plain HTTP requests,
//! polling until the ready element shows up in the served document. Adapters
//! backed by a real browser can implement [`PageFetcher`] instead.

use std::thread;

use reqwest::blocking::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{CatalogError, Result};

/// Returns fully rendered HTML for a URL.
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its HTML once an element with id
    /// `ready_element_id` is present.
    ///
    /// Fails with [`CatalogError::ElementNotReady`] if the element never
    /// appears within the fetcher's bounded wait.
    fn fetch(&self, url: &str, ready_element_id: &str) -> Result<String>;
}

/// Check whether `html` contains an element with the given id.
pub fn has_element_id(html: &str, element_id: &str) -> bool {
    // Ids may contain characters that are not valid in a bare `#id` selector.
    let Ok(selector) = Selector::parse(&format!("[id=\"{element_id}\"]")) else {
        return false;
    };
    Html::parse_document(html).select(&selector).next().is_some()
}

/// [`PageFetcher`] over a blocking `reqwest` client.
pub struct HttpPageFetcher {
    client: Client,
    attempts: u32,
    delay: std::time::Duration,
}

impl HttpPageFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            attempts: config.fetch_attempts,
            delay: config.fetch_delay,
        })
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch(&self, url: &str, ready_element_id: &str) -> Result<String> {
        for attempt in 1..=self.attempts {
            debug!(url, attempt, "fetching page");
            match self
                .client
                .get(url)
                .send()
                .and_then(|resp| resp.error_for_status())
                .and_then(|resp| resp.text())
            {
                Ok(html) if has_element_id(&html, ready_element_id) => return Ok(html),
                Ok(_) => debug!(url, attempt, element_id = ready_element_id, "ready element not present yet"),
                Err(e) => warn!(url, attempt, error = %e, "page request failed"),
            }
            if attempt < self.attempts {
                thread::sleep(self.delay);
            }
        }
        Err(CatalogError::ElementNotReady {
            url: url.to_string(),
            element_id: ready_element_id.to_string(),
        })
    }
}
