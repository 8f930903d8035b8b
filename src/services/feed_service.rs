use std::sync::Arc;

use url::Url;

use crate::domain::{Bookmark, Collection, FeedId, FeedStatus, StoredFeed, VisualState};
use crate::errors::{FeedwatchError, FeedwatchResult};
use crate::services::context::FeedContext;
use crate::services::snapshot::FeedSnapshot;
use crate::storage::KeyValueStoreExt;
use crate::ui::UiSurface;

/// A collection together with its feeds and their persisted state.
#[derive(Debug, Clone)]
pub struct CollectionListing {
    pub collection: Collection,
    pub feeds: Vec<(Bookmark, StoredFeed)>,
}

pub struct FeedService {
    ctx: FeedContext,
    ui: Arc<dyn UiSurface>,
}

impl FeedService {
    pub fn new(ctx: FeedContext, ui: Arc<dyn UiSurface>) -> Self {
        Self { ctx, ui }
    }

    pub fn add_collection(&self, title: &str) -> FeedwatchResult<Collection> {
        let title = title.trim();
        if title.is_empty() {
            return Err(FeedwatchError::InvalidInput(
                "collection title cannot be empty".to_string(),
            ));
        }

        let collection = self.ctx.bookmarks.add_collection(title)?;
        tracing::info!(collection = %collection.title, id = collection.id, "collection added");
        Ok(collection)
    }

    /// Remove a collection, its bookmarks and their stored state.
    pub fn remove_collection(&self, id: i64) -> FeedwatchResult<Collection> {
        let collection = self.collection(id)?;
        let bookmarks = self.ctx.bookmarks.bookmarks_in(id)?;

        // Records of feeds that still exist are never dropped.
        self.ctx.bookmarks.remove_collection(id)?;
        for bookmark in bookmarks {
            self.ctx.store.remove(&bookmark.id.storage_key())?;
        }

        tracing::info!(collection = %collection.title, "collection removed");
        Ok(collection)
    }

    pub fn collection(&self, id: i64) -> FeedwatchResult<Collection> {
        self.ctx
            .bookmarks
            .collection(id)?
            .ok_or_else(|| FeedwatchError::CollectionNotFound(id.to_string()))
    }

    /// Look a collection up by numeric id, falling back to its title.
    pub fn find_collection(&self, key: &str) -> FeedwatchResult<Collection> {
        if let Ok(id) = key.parse::<i64>() {
            if let Some(collection) = self.ctx.bookmarks.collection(id)? {
                return Ok(collection);
            }
        }

        self.ctx
            .bookmarks
            .collection_by_title(key)?
            .ok_or_else(|| FeedwatchError::CollectionNotFound(key.to_string()))
    }

    /// Add a feed to a collection.
    ///
    /// With `verify` the URL is fetched and must hold a feed; a missing title
    /// is then taken from the channel. Without it the URL doubles as title.
    pub async fn add_feed(
        &self,
        collection_id: i64,
        url: &str,
        title: Option<&str>,
        verify: bool,
    ) -> FeedwatchResult<Bookmark> {
        self.collection(collection_id)?;
        let url = Self::normalize_url(url)?;

        let title = match (title, verify) {
            (Some(title), false) => title.to_string(),
            (None, false) => url.clone(),
            (title, true) => {
                let body = self.ctx.fetcher.fetch(&url, false).await?;
                self.ctx.parser.validate(&body)?;
                match title {
                    Some(title) => title.to_string(),
                    None => self.ctx.parser.feed_info(&body, &url)?.channel.title,
                }
            }
        };

        let bookmark = self.ctx.bookmarks.add_bookmark(collection_id, &title, &url)?;
        tracing::info!(feed = %bookmark.title, url = %bookmark.url, "feed added");
        Ok(bookmark)
    }

    pub fn remove_feed(&self, id: &FeedId) -> FeedwatchResult<Bookmark> {
        let bookmark = self
            .ctx
            .bookmarks
            .get(id)?
            .ok_or_else(|| FeedwatchError::FeedNotFound(id.to_string()))?;

        self.ctx.bookmarks.remove_bookmark(id)?;
        self.ctx.store.remove(&id.storage_key())?;

        tracing::info!(feed = %bookmark.title, "feed removed");
        Ok(bookmark)
    }

    pub fn list(&self) -> FeedwatchResult<Vec<CollectionListing>> {
        let mut listings = Vec::new();

        for collection in self.ctx.bookmarks.collections()? {
            let mut feeds = Vec::new();
            for bookmark in self.ctx.bookmarks.bookmarks_in(collection.id)? {
                let stored = self
                    .ctx
                    .store
                    .get_value(&bookmark.id.storage_key(), StoredFeed::new(bookmark.id.clone()))?;
                feeds.push((bookmark, stored));
            }
            listings.push(CollectionListing { collection, feeds });
        }

        Ok(listings)
    }

    pub fn mark_read(&self, id: &FeedId) -> FeedwatchResult<()> {
        self.mark(id, FeedStatus::Old)
    }

    pub fn mark_updated(&self, id: &FeedId) -> FeedwatchResult<()> {
        self.mark(id, FeedStatus::Updated)
    }

    /// Updated and failed feeds of the collection become read. Returns how many changed.
    pub fn mark_all_read(&self, collection_id: i64) -> FeedwatchResult<usize> {
        self.mark_all(collection_id, FeedStatus::Old)
    }

    /// Read and failed feeds of the collection become unread. Returns how many changed.
    pub fn mark_all_updated(&self, collection_id: i64) -> FeedwatchResult<usize> {
        self.mark_all(collection_id, FeedStatus::Updated)
    }

    fn mark(&self, id: &FeedId, status: FeedStatus) -> FeedwatchResult<()> {
        let mut snapshot = FeedSnapshot::load(&self.ctx, id)?;
        snapshot.set_status(&self.ctx, status)?;
        self.ui.set_visual_state(id, VisualState::from(status));
        Ok(())
    }

    fn mark_all(&self, collection_id: i64, status: FeedStatus) -> FeedwatchResult<usize> {
        self.collection(collection_id)?;

        let mut changed = 0;
        for bookmark in self.ctx.bookmarks.bookmarks_in(collection_id)? {
            let mut snapshot = FeedSnapshot::load(&self.ctx, &bookmark.id)?;
            if snapshot.status() == status {
                continue;
            }
            snapshot.set_status(&self.ctx, status)?;
            self.ui
                .set_visual_state(&bookmark.id, VisualState::from(status));
            changed += 1;
        }

        tracing::debug!(collection_id, changed, status = %status, "feeds marked");
        Ok(changed)
    }

    fn normalize_url(url: &str) -> FeedwatchResult<String> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| FeedwatchError::InvalidUrl(format!("{}: {}", url, e)))?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed.to_string()),
            scheme => Err(FeedwatchError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                url, scheme
            ))),
        }
    }
}
