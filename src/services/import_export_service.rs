use std::sync::Arc;

use opml::{Head, Outline, OPML};
use url::Url;

use crate::domain::{Bookmark, Collection};
use crate::errors::{FeedwatchError, FeedwatchResult};
use crate::storage::BookmarkStore;

const EXPORT_TITLE: &str = "Feedwatch Subscriptions";

#[derive(Debug, Default)]
pub struct ImportResult {
    pub added: Vec<Bookmark>,
    pub invalid: Vec<(String, String)>, // (url, error_message)
    pub duplicates: Vec<String>,
    pub collections: Vec<Collection>,
}

pub struct ImportExportService {
    bookmarks: Arc<dyn BookmarkStore>,
}

impl ImportExportService {
    pub fn new(bookmarks: Arc<dyn BookmarkStore>) -> Self {
        Self { bookmarks }
    }

    /// Import subscriptions from OPML.
    ///
    /// Folder outlines become collections named after the folder; feeds
    /// outside any folder go to `default_collection`.
    pub fn import_opml(
        &self,
        content: &str,
        default_collection: &str,
    ) -> FeedwatchResult<ImportResult> {
        let opml = OPML::from_str(content).map_err(|e| FeedwatchError::OpmlParse(e.to_string()))?;

        let mut result = ImportResult::default();
        self.import_outlines(&opml.body.outlines, default_collection, &mut result)?;

        tracing::info!(
            added = result.added.len(),
            duplicates = result.duplicates.len(),
            invalid = result.invalid.len(),
            "OPML import finished"
        );
        Ok(result)
    }

    fn import_outlines(
        &self,
        outlines: &[Outline],
        collection_title: &str,
        result: &mut ImportResult,
    ) -> FeedwatchResult<()> {
        for outline in outlines {
            match outline.xml_url.as_deref().map(str::trim) {
                Some(url) if !url.is_empty() => {
                    let collection = self.collection_named(collection_title, result)?;
                    self.import_feed(&collection, outline, url, result)?;
                }
                _ if !outline.outlines.is_empty() => {
                    let folder = Self::outline_title(outline);
                    let folder = if folder.is_empty() { collection_title } else { folder };
                    self.import_outlines(&outline.outlines, folder, result)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn import_feed(
        &self,
        collection: &Collection,
        outline: &Outline,
        url: &str,
        result: &mut ImportResult,
    ) -> FeedwatchResult<()> {
        if let Err(e) = Self::check_url(url) {
            result.invalid.push((url.to_string(), e));
            return Ok(());
        }

        let title = match Self::outline_title(outline) {
            "" => url,
            title => title,
        };

        match self.bookmarks.add_bookmark(collection.id, title, url) {
            Ok(bookmark) => result.added.push(bookmark),
            Err(FeedwatchError::FeedAlreadyExists(_)) => result.duplicates.push(url.to_string()),
            Err(e) => result.invalid.push((url.to_string(), e.to_string())),
        }
        Ok(())
    }

    /// Existing collection with this title, created on first use.
    fn collection_named(&self, title: &str, result: &mut ImportResult) -> FeedwatchResult<Collection> {
        if let Some(collection) = result.collections.iter().find(|c| c.title == title) {
            return Ok(collection.clone());
        }

        let collection = match self.bookmarks.collection_by_title(title)? {
            Some(collection) => collection,
            None => self.bookmarks.add_collection(title)?,
        };
        result.collections.push(collection.clone());
        Ok(collection)
    }

    fn outline_title(outline: &Outline) -> &str {
        outline
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&outline.text)
            .trim()
    }

    fn check_url(url: &str) -> Result<(), String> {
        let parsed = Url::parse(url).map_err(|e| e.to_string())?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(format!("unsupported scheme '{}'", scheme)),
        }
    }

    /// Export every collection as a folder outline holding its feeds.
    pub fn export_opml(&self) -> FeedwatchResult<String> {
        let mut opml = OPML {
            head: Some(Head {
                title: Some(EXPORT_TITLE.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        for collection in self.bookmarks.collections()? {
            let feeds = self
                .bookmarks
                .bookmarks_in(collection.id)?
                .into_iter()
                .map(|bookmark| Outline {
                    text: bookmark.title.clone(),
                    title: Some(bookmark.title),
                    r#type: Some("rss".to_string()),
                    xml_url: Some(bookmark.url),
                    ..Default::default()
                })
                .collect();

            opml.body.outlines.push(Outline {
                text: collection.title.clone(),
                title: Some(collection.title),
                outlines: feeds,
                ..Default::default()
            });
        }

        opml.to_string()
            .map_err(|e| FeedwatchError::OpmlParse(e.to_string()))
    }
}
