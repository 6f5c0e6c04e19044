//! Memoized call variants
//!
//! Cache-aside wrappers over the plain `get`/`post` entry points: look the
//! key up first, fall back to the real request on a miss or an undecodable
//! entry, and store the successful result for the caller-chosen TTL. Cache
//! trouble is never surfaced; the worst case is an uncached request. There
//! is no single-flight deduplication: concurrent misses on one key all hit
//! the network, and the last write wins.

use crate::cache_key;
use crate::client::RequestClient;
use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

impl RequestClient {
    /// `get`, memoized for `ttl`.
    ///
    /// A hit decodes the stored payload directly and issues no network
    /// call. A miss performs the plain request and, on success, stores the
    /// serialized result under the derived key.
    ///
    /// # Example
    /// ```no_run
    /// # use memoreq::{RequestClient, RequestConfig};
    /// # use serde::{Deserialize, Serialize};
    /// # use std::time::Duration;
    /// # #[derive(Serialize, Deserialize)]
    /// # struct Block { id: u64 }
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = RequestClient::new(RequestConfig::json("http://localhost:8080"))?;
    /// let block: Option<Block> = client
    ///     .get_cached("blocks/latest", &[("page", "1")], Duration::from_secs(60))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_cached<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        ttl: Duration,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let key = cache_key::derive(&self.target_url(path, query), None);

        if let Some(stored) = self.cache().get(&key) {
            match serde_json::from_slice(&stored) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    debug!("discarding undecodable cache entry key={}: {}", key, err);
                }
            }
        }

        let value: Option<T> = self.get(path, query).await?;
        self.store(&key, &value, ttl);
        Ok(value)
    }

    /// `post`, memoized for `ttl`. Distinct bodies map to distinct keys.
    pub async fn post_cached<T, B>(&self, path: &str, body: &B, ttl: Duration) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let target = self.target_url(path, &[]);
        let body_bytes = self.encode_body(&target, body)?;
        let key = cache_key::derive(&target, Some(&body_bytes));

        if let Some(stored) = self.cache().get(&key) {
            match serde_json::from_slice(&stored) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    debug!("discarding undecodable cache entry key={}: {}", key, err);
                }
            }
        }

        let value: Option<T> = self.post(path, body).await?;
        self.store(&key, &value, ttl);
        Ok(value)
    }

    /// Drop the cached entry for a GET descriptor, if any.
    pub fn invalidate_get(&self, path: &str, query: &[(&str, &str)]) {
        let key = cache_key::derive(&self.target_url(path, query), None);
        self.cache().remove(&key);
    }

    /// Drop the cached entry for a POST descriptor, if any.
    pub fn invalidate_post<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let target = self.target_url(path, &[]);
        let body_bytes = self.encode_body(&target, body)?;
        let key = cache_key::derive(&target, Some(&body_bytes));
        self.cache().remove(&key);
        Ok(())
    }

    /// Store a successful result. An unencodable result forgoes caching but
    /// never fails the call that produced it.
    fn store<T>(&self, key: &str, value: &Option<T>, ttl: Duration)
    where
        T: Serialize,
    {
        match serde_json::to_vec(value) {
            Ok(payload) => self.cache().set(key.to_string(), payload, ttl),
            Err(err) => warn!("cannot serialize result for cache key={}: {}", key, err),
        }
    }
}
