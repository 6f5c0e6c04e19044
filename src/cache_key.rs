//! Cache-key derivation for memoized requests
//!
//! A key is the SHA-1 digest of the full target URL (including the `?`-joined
//! query component, present even when the query is empty) concatenated with
//! the JSON-encoded request body, rendered as URL-safe base64. Two calls with
//! the same path, query encoding and body bytes always map to the same key.

use base64::{Engine as _, engine::general_purpose};
use sha1::{Digest, Sha1};

/// Derive the cache key for a request identity.
///
/// `url` is the fully qualified target including its query component;
/// `body` is the serialized request payload, if any.
pub fn derive(url: &str, body: Option<&[u8]>) -> String {
    let mut hasher = Sha1::new();
    hasher.update(url.as_bytes());
    if let Some(bytes) = body {
        hasher.update(bytes);
    }
    general_purpose::URL_SAFE.encode(hasher.finalize())
}
