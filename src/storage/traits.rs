use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{Bookmark, Collection, FeedId};
use crate::errors::FeedwatchResult;

/// Read/write access to collections and their feed bookmarks.
#[cfg_attr(test, mockall::automock)]
pub trait BookmarkStore: Send + Sync {
    fn add_collection(&self, title: &str) -> FeedwatchResult<Collection>;
    fn remove_collection(&self, id: i64) -> FeedwatchResult<()>;
    fn collection(&self, id: i64) -> FeedwatchResult<Option<Collection>>;
    fn collection_by_title(&self, title: &str) -> FeedwatchResult<Option<Collection>>;
    fn collections(&self) -> FeedwatchResult<Vec<Collection>>;

    fn add_bookmark(&self, collection_id: i64, title: &str, url: &str) -> FeedwatchResult<Bookmark>;
    fn remove_bookmark(&self, id: &FeedId) -> FeedwatchResult<()>;
    fn get(&self, id: &FeedId) -> FeedwatchResult<Option<Bookmark>>;
    /// Bookmarks of a collection in display order.
    fn bookmarks_in(&self, collection_id: i64) -> FeedwatchResult<Vec<Bookmark>>;
}

/// Durable string key-value store.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get_raw(&self, key: &str) -> FeedwatchResult<Option<String>>;
    fn set_raw(&self, key: &str, value: &str) -> FeedwatchResult<()>;
    fn remove(&self, key: &str) -> FeedwatchResult<()>;
}

/// Typed JSON access on top of any [`KeyValueStore`].
pub trait KeyValueStoreExt {
    /// Value stored under `key`, or `default` when the key is missing or unreadable.
    fn get_value<T: DeserializeOwned>(&self, key: &str, default: T) -> FeedwatchResult<T>;
    fn set_value<T: Serialize>(&self, key: &str, value: &T) -> FeedwatchResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {
    fn get_value<T: DeserializeOwned>(&self, key: &str, default: T) -> FeedwatchResult<T> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(default);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable stored value");
                Ok(default)
            }
        }
    }

    fn set_value<T: Serialize>(&self, key: &str, value: &T) -> FeedwatchResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw)
    }
}
