use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

/// Trait for retrieving a resource by URL.
///
/// Both the artwork page and every tile go through this abstraction, so the
/// assembler can be driven by a real HTTP client or by an in-memory source.
/// Implementations must be thread-safe: with bounded concurrency several
/// requests may be in flight on the same fetcher.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the response body.
    ///
    /// Any non-success status is an error; callers decide whether that means
    /// "absent" or "fatal".
    async fn get(&self, url: &str) -> Result<Bytes, FetchError>;
}
