#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Element #{element_id} never appeared on {url}")]
    ElementNotReady { url: String, element_id: String },

    #[error("Listing table not found on {0}")]
    ListingNotFound(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Update failed for {key}: HTTP {status}")]
    UpdateFailed { key: String, status: u16 },

    #[error("Create failed for {key}: HTTP {status}")]
    CreateFailed { key: String, status: u16 },

    #[error("Store response for {0} carried no _id")]
    MissingId(String),

    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Task error: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
