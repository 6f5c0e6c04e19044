//! # memoreq
//!
//! Memoizing HTTP client: typed JSON requests with TTL-bounded response
//! caching.
//!
//! ## Features
//!
//! - 🌐 **Typed requests**: GET/POST with JSON responses decoded straight
//!   into your structs
//! - 💾 **Memoization**: `*_cached` call variants backed by an in-memory
//!   TTL store keyed by the request's identity (path, query, body)
//! - 🔌 **Pluggable error classification**: a per-client hook decides which
//!   responses count as failures
//! - 🔄 **Async/Await**: built on Tokio and reqwest
//! - 🛡️ **Structured errors**: every failure carries its stage, method and
//!   URL
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memoreq::{RequestClient, RequestConfig};
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Block {
//!     id: u64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RequestClient::new(RequestConfig::json("http://localhost:8080"))?;
//!
//!     // Plain typed GET
//!     let block: Option<Block> = client.get("blocks/latest", &[("page", "1")]).await?;
//!     println!("Block: {:?}", block);
//!
//!     // Same call, memoized for a minute; a repeat within the TTL is
//!     // served from the store without touching the network
//!     let cached: Option<Block> = client
//!         .get_cached("blocks/latest", &[("page", "1")], Duration::from_secs(60))
//!         .await?;
//!     println!("Cached: {:?}", cached);
//!
//!     // Optional: reap expired entries in the background
//!     let _sweeper = client.cache().start_sweeper(Duration::from_secs(300));
//!
//!     Ok(())
//! }
//! ```
//!
//! Entries are process-local and non-persistent; to share one store across
//! several clients, clone a [`MemoryCache`] into each
//! [`RequestConfig::with_cache`].

pub mod cache;
pub mod cache_key;
pub mod client;
pub mod error;
mod memo;

pub use cache::{CacheStats, MemoryCache};
pub use client::{ErrorHandler, RequestClient, RequestConfig};
pub use error::{HookError, RequestError, Result};
