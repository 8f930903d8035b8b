use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use url::Url;

use crate::errors::{FeedwatchError, FeedwatchResult};
use crate::fetch::traits::Fetcher;

const CACHE_BUSTER_PARAM: &str = "_fwnc";

static CACHE_BUSTER_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> FeedwatchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Append a query parameter no cache has seen before.
    fn cache_busted(url: &str) -> FeedwatchResult<Url> {
        let mut parsed =
            Url::parse(url).map_err(|e| FeedwatchError::InvalidUrl(format!("{}: {}", url, e)))?;
        let seq = CACHE_BUSTER_SEQ.fetch_add(1, Ordering::Relaxed);
        let token = format!("{}{}", Utc::now().timestamp_millis(), seq);
        parsed
            .query_pairs_mut()
            .append_pair(CACHE_BUSTER_PARAM, &token);
        Ok(parsed)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, bypass_cache: bool) -> FeedwatchResult<String> {
        let request = if bypass_cache {
            self.client
                .get(Self::cache_busted(url)?)
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache")
        } else {
            self.client.get(url)
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedwatchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        tracing::trace!(url, bypass_cache, "fetched feed document");
        Ok(response.text().await?)
    }
}

/// The `http` variant of an `https` URL, or `None` for any other scheme.
pub fn insecure_variant(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    if parsed.scheme() != "https" {
        return None;
    }
    parsed.set_scheme("http").ok()?;
    Some(parsed.to_string())
}
