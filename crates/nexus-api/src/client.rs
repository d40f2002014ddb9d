//! # API Client
//!
//! The shared HTTP client and endpoint configuration.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ApiClient                                       │
//! │                                                                         │
//! │  ApiConfig::new(base_url) ← base URL + request timeout                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiClient::new(config)   ← validates URL, builds reqwest::Client      │
//! │       │                                                                 │
//! │       ├── .bills()       → BillRepository      (BillStore)             │
//! │       ├── .products()    → ProductRepository   (ProductCatalog)        │
//! │       ├── .categories()  → CategoryRepository  (CategoryRegistry)      │
//! │       └── .brands()      → BrandRepository     (BrandRegistry)         │
//! │                                                                         │
//! │  Every repository shares one connection pool (reqwest::Client is an    │
//! │  Arc inside; cloning is cheap).                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One request per call: no retry, no deduplication, no cancellation.

use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiClientError, ApiResult};
use crate::repository::{BillRepository, BrandRepository, CategoryRepository, ProductRepository};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Configuration
// =============================================================================

/// REST endpoint configuration.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use nexus_api::ApiConfig;
///
/// let config = ApiConfig::new("https://api.autonexus.lk/api")
///     .timeout(Duration::from_secs(10));
/// assert_eq!(config.timeout, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API root, e.g. `http://localhost:5000/api`.
    pub base_url: String,

    /// Per-request timeout (connect + response).
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiConfig {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parses and checks the base URL.
    ///
    /// ## Rules
    /// - Must parse as an absolute URL
    /// - Scheme must be `http` or `https`
    /// - No query string or fragment
    pub fn parsed_base_url(&self) -> ApiResult<Url> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|e| ApiClientError::InvalidUrl(format!("{}: {e}", self.base_url)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiClientError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                self.base_url
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ApiClientError::InvalidUrl(format!(
                "{}: must not contain a query or fragment",
                self.base_url
            )));
        }
        if url.cannot_be_a_base() {
            return Err(ApiClientError::InvalidUrl(format!(
                "{}: cannot be used as a base",
                self.base_url
            )));
        }

        Ok(url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig::new(DEFAULT_BASE_URL)
    }
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for the AutoNexus REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Creates a client from the given configuration.
    ///
    /// ## Errors
    /// - [`ApiClientError::InvalidUrl`] if the base URL is unusable
    /// - [`ApiClientError::Http`] if the TLS backend cannot be initialised
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let base = config.parsed_base_url()?;
        let http = Client::builder().timeout(config.timeout).build()?;

        debug!(base_url = %base, timeout_secs = config.timeout.as_secs(), "API client ready");
        Ok(ApiClient { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Bill store operations.
    pub fn bills(&self) -> BillRepository {
        BillRepository::new(self.clone())
    }

    /// Product catalog operations.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.clone())
    }

    /// Category registry operations.
    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.clone())
    }

    /// Brand registry operations.
    pub fn brands(&self) -> BrandRepository {
        BrandRepository::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Request helpers (used by the repositories)
    // -------------------------------------------------------------------------

    /// Builds `{base}/{segment}/{segment}…`, percent-encoding each segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Same as [`ApiClient::endpoint`] with query parameters appended.
    pub(crate) fn endpoint_with_query<K, V>(
        &self,
        segments: &[&str],
        query: &[(K, V)],
    ) -> ApiResult<Url>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_ref(), v.as_ref())));
        }
        Ok(url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        url: Url,
    ) -> ApiResult<T> {
        let response = self.execute(Method::GET, resource, url, None::<&()>).await?;
        decode(resource, response).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        resource: &str,
        url: Url,
        body: &B,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.execute(method, resource, url, Some(body)).await?;
        decode(resource, response).await
    }

    /// Sends a request and ignores any success body.
    pub(crate) async fn send_empty(&self, method: Method, resource: &str, url: Url) -> ApiResult<()> {
        self.execute(method, resource, url, None::<&()>).await?;
        Ok(())
    }

    pub(crate) async fn get_bytes(&self, resource: &str, url: Url) -> ApiResult<Vec<u8>> {
        let response = self.execute(Method::GET, resource, url, None::<&()>).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn execute<B>(
        &self,
        method: Method,
        resource: &str,
        url: Url,
        body: Option<&B>,
    ) -> ApiResult<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        debug!(method = %method, url = %url, "API request");

        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            warn!(method = %method, url = %url, error = %err, "API request failed");
            ApiClientError::from(err)
        })?;

        check(resource, response).await
    }
}

/// Passes success responses through; maps everything else to an error.
async fn check(resource: &str, response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(resource, status = status.as_u16(), "API returned an error status");
    Err(ApiClientError::from_status(status.as_u16(), resource, &body))
}

async fn decode<T: DeserializeOwned>(resource: &str, response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiClientError::decode(resource, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BillStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(base)).unwrap()
    }

    #[test]
    fn test_base_url_validation() {
        assert!(ApiConfig::default().parsed_base_url().is_ok());
        assert!(ApiConfig::new("https://api.example.lk/v2/").parsed_base_url().is_ok());
        assert!(ApiConfig::new("ftp://example.lk").parsed_base_url().is_err());
        assert!(ApiConfig::new("localhost:5000/api").parsed_base_url().is_err());
        assert!(ApiConfig::new("http://x/api?key=1").parsed_base_url().is_err());
        assert!(ApiConfig::new("").parsed_base_url().is_err());
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("http://localhost:5000/api");
        assert_eq!(
            api.endpoint(&["bills", "b1", "download-pdf"]).unwrap().as_str(),
            "http://localhost:5000/api/bills/b1/download-pdf"
        );

        let api = client("http://localhost:5000/api/");
        assert_eq!(
            api.endpoint(&["products"]).unwrap().as_str(),
            "http://localhost:5000/api/products"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments_and_query() {
        let api = client("http://localhost:5000/api");
        let url = api
            .endpoint_with_query(&["products"], &[("category", "Engine Parts"), ("limit", "12")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/products?category=Engine+Parts&limit=12"
        );

        let url = api.endpoint(&["brands", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/brands/a%20b");
    }

    #[tokio::test]
    async fn test_refused_connection_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = client(&format!("http://{addr}/api"));
        let err = api.bills().list_bills(100).await.unwrap_err();
        assert!(matches!(err, ApiClientError::Http(_)));
        assert!(err.is_transport());
    }
}
