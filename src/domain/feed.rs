use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::FeedStatus;

/// Opaque, stable identifier of a feed bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(String);

impl FeedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the persisted [`StoredFeed`] record.
    pub fn storage_key(&self) -> String {
        format!("feed:{}", self.0)
    }
}

impl std::fmt::Display for FeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FeedId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FeedId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A named, ordered group of feeds. Batches are scoped to one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    pub title: String,
}

/// Bookmark-like record holding a feed's display title and source URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: FeedId,
    pub collection_id: i64,
    pub title: String,
    pub url: String,
    pub position: i64,
}

/// Per-feed state persisted between refreshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFeed {
    pub id: FeedId,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default, alias = "hash")]
    pub fingerprint: Option<String>,
    #[serde(default, alias = "pubDate")]
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: FeedStatus,
    #[serde(default)]
    pub last_error: Option<String>,
}

impl StoredFeed {
    pub fn new(id: FeedId) -> Self {
        Self {
            id,
            title: String::new(),
            fingerprint: None,
            publication_date: None,
            status: FeedStatus::default(),
            last_error: None,
        }
    }

    /// Set the status, keeping `last_error` in step with it.
    pub fn set_status(&mut self, status: FeedStatus, error: Option<String>) {
        self.status = status;
        self.last_error = match status {
            FeedStatus::Error => Some(error.unwrap_or_else(|| "unknown error".to_string())),
            _ => None,
        };
    }
}
