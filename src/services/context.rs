use std::sync::Arc;

use crate::fetch::Fetcher;
use crate::parser::FeedParser;
use crate::storage::{BookmarkStore, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOptions {
    /// In-body redirects followed by one refresh before giving up.
    pub max_redirect_hops: usize,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            max_redirect_hops: 1,
        }
    }
}

/// Collaborators a refresh needs, injected by whoever builds the services.
#[derive(Clone)]
pub struct FeedContext {
    pub bookmarks: Arc<dyn BookmarkStore>,
    pub store: Arc<dyn KeyValueStore>,
    pub fetcher: Arc<dyn Fetcher>,
    pub parser: Arc<dyn FeedParser>,
    pub options: RefreshOptions,
}

impl FeedContext {
    pub fn new(
        bookmarks: Arc<dyn BookmarkStore>,
        store: Arc<dyn KeyValueStore>,
        fetcher: Arc<dyn Fetcher>,
        parser: Arc<dyn FeedParser>,
    ) -> Self {
        Self {
            bookmarks,
            store,
            fetcher,
            parser,
            options: RefreshOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RefreshOptions) -> Self {
        self.options = options;
        self
    }
}
