//! Error types for memoreq

use thiserror::Error;

/// Result type alias for memoreq operations
pub type Result<T> = std::result::Result<T, RequestError>;

/// Boxed error produced by a response hook
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Failure stages of one outbound request.
///
/// Every variant carries the method and target URL of the call that failed.
/// Cache-path conditions (miss, undecodable entry, unencodable entry) never
/// surface here; they degrade to an uncached request.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The configured base URL could not be parsed
    #[error("invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be constructed
    #[error("failed to build HTTP client: {source}")]
    ClientBuild { source: reqwest::Error },

    /// The request target could not be built from base, path and query
    #[error("invalid URL for {method} {url}: {source}")]
    InvalidUrl {
        method: String,
        url: String,
        source: url::ParseError,
    },

    /// The request body could not be serialized to JSON
    #[error("failed to encode request body for {method} {url}: {source}")]
    InvalidBody {
        method: String,
        url: String,
        source: serde_json::Error,
    },

    /// Network-level failure (DNS, connect, timeout)
    #[error("transport failure for {method} {url}: {source}")]
    Transport {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    /// The response hook classified the round trip as failed
    #[error("request rejected for {method} {url}: {source}")]
    Rejected {
        method: String,
        url: String,
        source: HookError,
    },

    /// The response body could not be read
    #[error("failed to read response body for {method} {url}: {source}")]
    Read {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    /// The response body was not valid JSON for the requested type
    #[error("malformed response body for {method} {url}: {source}")]
    Decode {
        method: String,
        url: String,
        source: serde_json::Error,
    },
}
