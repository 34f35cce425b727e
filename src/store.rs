//! Create-or-update synchronization against the remote store.
//!
//! The store exposes each resource as `{base}/{resource}/{key}` for GET/PUT and
//! `{base}/{resource}` for POST. A record is looked up by its business key; an
//! existing record is replaced, a missing one is created. Either way the
//! store-assigned `_id` is handed back to the caller.

use std::fmt;

use reqwest::blocking::Client;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{CatalogError, Result};

/// Status the store answers GET and PUT with on success.
pub const STATUS_OK: u16 = 200;
/// Status the store answers POST with on success.
pub const STATUS_CREATED: u16 = 201;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Status and parsed body of a store response.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreResponse {
    pub status: u16,
    /// Parsed JSON body, or `Value::Null` if the body was empty or not JSON.
    pub body: Value,
}

/// Sends one request to the store.
pub trait StoreTransport: Send + Sync {
    fn send(&self, method: Method, url: &Url, body: Option<&Value>) -> Result<StoreResponse>;
}

/// [`StoreTransport`] over a blocking `reqwest` client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client })
    }
}

impl StoreTransport for HttpTransport {
    fn send(&self, method: Method, url: &Url, body: Option<&Value>) -> Result<StoreResponse> {
        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request.send()?;
        let status = resp.status().as_u16();
        let text = resp.text()?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(StoreResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A record that can be upserted by business key.
pub trait RemoteEntity: Serialize {
    /// Resource name under the store base URL.
    const RESOURCE: &'static str;

    /// Externally meaningful unique key used for the lookup.
    fn business_key(&self) -> &str;

    /// Record the store-assigned identifier.
    fn attach_id(&mut self, id: String);
}

/// Which path a sync took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Created,
    Updated,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Created => f.write_str("created"),
            SyncAction::Updated => f.write_str("updated"),
        }
    }
}

/// Outcome of a successful [`SyncClient::sync_entity`].
#[derive(Debug, Clone, PartialEq)]
pub struct Synced {
    pub id: String,
    pub action: SyncAction,
}

/// Read the store identifier out of a response body.
///
/// Accepts `"_id": "..."` as well as the extended-JSON `"_id": {"$oid": "..."}`.
pub fn extract_id(body: &Value) -> Option<String> {
    match body.get("_id")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// SyncClient
// ---------------------------------------------------------------------------

/// Upserts collections and cards into the store.
pub struct SyncClient {
    base: Url,
    transport: Box<dyn StoreTransport>,
}

impl SyncClient {
    /// Create a client over HTTP using the configured store base URL.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_transport(
            config.store_api.clone(),
            Box::new(HttpTransport::new(config)?),
        ))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(base: Url, transport: Box<dyn StoreTransport>) -> Self {
        Self { base, transport }
    }

    /// URL of a resource collection, e.g. `{base}/cards`.
    pub fn resource_url(&self, resource: &str) -> Result<Url> {
        self.url_with(resource, None)
    }

    /// URL of a single record, with the key percent-encoded as one segment.
    pub fn record_url(&self, resource: &str, key: &str) -> Result<Url> {
        self.url_with(resource, Some(key))
    }

    fn url_with(&self, resource: &str, key: Option<&str>) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| CatalogError::InvalidConfig(format!("store URL cannot be a base: {}", self.base)))?;
            segments.pop_if_empty().push(resource);
            if let Some(key) = key {
                segments.push(key);
            }
        }
        Ok(url)
    }

    /// Create or update one record identified by `key`.
    ///
    /// Looks the record up with GET; on 200 the payload is PUT to the same
    /// path, otherwise it is POSTed to the resource. Non-success statuses
    /// surface as [`CatalogError::UpdateFailed`] or [`CatalogError::CreateFailed`].
    pub fn sync_entity(&self, resource: &str, key: &str, payload: &Value) -> Result<Synced> {
        let record_url = self.record_url(resource, key)?;
        let existing = self.transport.send(Method::GET, &record_url, None)?;
        debug!(resource, key, status = existing.status, "store lookup");

        if existing.status == STATUS_OK {
            let resp = self.transport.send(Method::PUT, &record_url, Some(payload))?;
            if resp.status != STATUS_OK {
                return Err(CatalogError::UpdateFailed {
                    key: key.to_string(),
                    status: resp.status,
                });
            }
            let id = extract_id(&resp.body)
                .or_else(|| extract_id(&existing.body))
                .ok_or_else(|| CatalogError::MissingId(key.to_string()))?;
            return Ok(Synced {
                id,
                action: SyncAction::Updated,
            });
        }

        let resp = self
            .transport
            .send(Method::POST, &self.resource_url(resource)?, Some(payload))?;
        if resp.status != STATUS_CREATED {
            return Err(CatalogError::CreateFailed {
                key: key.to_string(),
                status: resp.status,
            });
        }
        let id = extract_id(&resp.body).ok_or_else(|| CatalogError::MissingId(key.to_string()))?;
        Ok(Synced {
            id,
            action: SyncAction::Created,
        })
    }

    /// Upsert a typed entity and attach the assigned id to it.
    pub fn sync<E: RemoteEntity>(&self, entity: &mut E) -> Result<SyncAction> {
        let payload = serde_json::to_value(&*entity)?;
        let key = entity.business_key().to_string();
        match self.sync_entity(E::RESOURCE, &key, &payload) {
            Ok(synced) => {
                info!(resource = E::RESOURCE, key = %key, id = %synced.id, "{}", synced.action);
                entity.attach_id(synced.id);
                Ok(synced.action)
            }
            Err(e) => {
                warn!(resource = E::RESOURCE, key = %key, error = %e, "sync failed");
                Err(e)
            }
        }
    }
}
