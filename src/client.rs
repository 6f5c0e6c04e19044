//! Request client and executor

use crate::cache::MemoryCache;
use crate::error::{HookError, RequestError, Result};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Hook inspecting each round trip after the transport succeeds and before
/// the body is consumed. Returning an error fails the whole call; the
/// default accepts everything, so a non-2xx status alone is not a failure.
pub type ErrorHandler =
    Arc<dyn Fn(&Response, &str) -> std::result::Result<(), HookError> + Send + Sync>;

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Base URL every path is resolved against
    pub base_url: String,
    /// Per-client request timeout
    pub timeout: Duration,
    /// Headers applied to every outgoing request
    pub headers: HashMap<String, String>,
    pub(crate) cache: Option<MemoryCache>,
}

impl RequestConfig {
    /// Create a new configuration with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            headers: HashMap::new(),
            cache: None,
        }
    }

    /// Configuration preset for `application/json` APIs
    pub fn json(base_url: impl Into<String>) -> Self {
        let mut config = Self::new(base_url);
        config
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        config
            .headers
            .insert("Accept".to_string(), "application/json".to_string());
        config
    }

    /// Set the timeout for requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a header applied to every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Wire in an existing store. Clients configured with clones of the same
    /// store memoize together; a client without one gets a private store.
    pub fn with_cache(mut self, cache: MemoryCache) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// Typed HTTP client over a single base endpoint.
///
/// Cloning is cheap; clones share the HTTP connection pool and the cache
/// store.
#[derive(Clone)]
pub struct RequestClient {
    base_url: Url,
    headers: HashMap<String, String>,
    http_client: Client,
    error_handler: ErrorHandler,
    cache: MemoryCache,
}

impl RequestClient {
    /// Create a new client, validating the base URL up front.
    pub fn new(config: RequestConfig) -> Result<Self> {
        let base_url =
            Url::parse(&config.base_url).map_err(|source| RequestError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            })?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| RequestError::ClientBuild { source })?;

        Ok(Self {
            base_url,
            headers: config.headers,
            http_client,
            error_handler: Arc::new(|_response, _url| Ok(())),
            cache: config.cache.unwrap_or_default(),
        })
    }

    /// Replace the response hook.
    pub fn with_error_handler(
        mut self,
        handler: impl Fn(&Response, &str) -> std::result::Result<(), HookError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    /// Set a header on this client instance.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Remove a header from this client instance.
    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the cache store backing the memoized call variants
    pub fn cache(&self) -> &MemoryCache {
        &self.cache
    }

    /// Send a GET request and decode the JSON response into `T`.
    ///
    /// Repeated query keys are allowed; pairs are encoded in the given
    /// order. An empty response body yields `Ok(None)`.
    ///
    /// # Example
    /// ```no_run
    /// # use memoreq::{RequestClient, RequestConfig};
    /// # use serde::Deserialize;
    /// # #[derive(Deserialize)]
    /// # struct Block { id: u64 }
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = RequestClient::new(RequestConfig::json("http://localhost:8080"))?;
    /// let block: Option<Block> = client.get("blocks/latest", &[("page", "1")]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let target = self.target_url(path, query);
        let url = target.strip_suffix('?').unwrap_or(&target).to_string();
        self.execute(Method::GET, &url, None, None).await
    }

    /// `get` with a per-call deadline overriding the client timeout.
    pub async fn get_with_timeout<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let target = self.target_url(path, query);
        let url = target.strip_suffix('?').unwrap_or(&target).to_string();
        self.execute(Method::GET, &url, None, Some(timeout)).await
    }

    /// Send a POST request with a JSON body and decode the response into `T`.
    ///
    /// # Example
    /// ```no_run
    /// # use memoreq::{RequestClient, RequestConfig};
    /// # use serde::{Deserialize, Serialize};
    /// # #[derive(Serialize)]
    /// # struct Query { id: u64 }
    /// # #[derive(Deserialize)]
    /// # struct Block { id: u64 }
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = RequestClient::new(RequestConfig::json("http://localhost:8080"))?;
    /// let block: Option<Block> = client.post("blocks/find", &Query { id: 3 }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.base_with_path(path);
        let payload = self.encode_body(&url, body)?;
        self.execute(Method::POST, &url, Some(payload), None).await
    }

    /// `post` with a per-call deadline overriding the client timeout.
    pub async fn post_with_timeout<T, B>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.base_with_path(path);
        let payload = self.encode_body(&url, body)?;
        self.execute(Method::POST, &url, Some(payload), Some(timeout))
            .await
    }

    /// Issue one HTTP call: attach headers, send, run the response hook,
    /// read the body and decode it. An empty body is a valid no-op result.
    pub(crate) async fn execute<T>(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        timeout: Option<Duration>,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let method_name = method.to_string();

        let parsed: Url = url.parse().map_err(|source| RequestError::InvalidUrl {
            method: method_name.clone(),
            url: url.to_string(),
            source,
        })?;

        let mut request = self.http_client.request(method, parsed);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(payload) = body {
            request = request.body(payload);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|source| RequestError::Transport {
                method: method_name.clone(),
                url: url.to_string(),
                source,
            })?;

        (self.error_handler)(&response, url).map_err(|source| RequestError::Rejected {
            method: method_name.clone(),
            url: url.to_string(),
            source,
        })?;

        let bytes = response.bytes().await.map_err(|source| RequestError::Read {
            method: method_name.clone(),
            url: url.to_string(),
            source,
        })?;

        if bytes.is_empty() {
            return Ok(None);
        }

        let value = serde_json::from_slice(&bytes).map_err(|source| RequestError::Decode {
            method: method_name,
            url: url.to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    pub(crate) fn encode_body<B>(&self, url: &str, body: &B) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        serde_json::to_vec(body).map_err(|source| RequestError::InvalidBody {
            method: Method::POST.to_string(),
            url: url.to_string(),
            source,
        })
    }

    /// Base URL joined with a relative path, without a query component.
    pub(crate) fn base_with_path(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path.trim_start_matches('/'))
        }
    }

    /// Full target including the query component. The `?` separator is
    /// always present, so the string doubles as the cache-key input.
    pub(crate) fn target_url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut encoded = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in query {
            encoded.append_pair(name, value);
        }
        format!("{}?{}", self.base_with_path(path), encoded.finish())
    }
}
