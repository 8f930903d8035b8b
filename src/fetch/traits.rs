use async_trait::async_trait;

use crate::errors::FeedwatchResult;

/// Single HTTP GET of a feed document.
///
/// Implementations do not retry; the fallback chain lives in the snapshot.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` as text, optionally defeating intermediate caches.
    async fn fetch(&self, url: &str, bypass_cache: bool) -> FeedwatchResult<String>;
}
