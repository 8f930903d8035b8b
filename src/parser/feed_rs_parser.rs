use chrono::{DateTime, Utc};
use feed_rs::parser;

use crate::domain::{ChannelInfo, FeedInfo, FeedItem};
use crate::errors::{FeedwatchError, FeedwatchResult};
use crate::fetch::redirect;
use crate::parser::render::{render_feed, RenderedDocument};
use crate::parser::text;
use crate::parser::traits::FeedParser;

/// How much of a document is inspected when sniffing for HTML pages.
const SNIFF_CHARS: usize = 512;

/// [`FeedParser`] backed by `feed-rs` (RSS 0.9x/1.0/2.0, Atom, JSON Feed).
#[derive(Debug, Default, Clone)]
pub struct FeedRsParser;

impl FeedRsParser {
    pub fn new() -> Self {
        Self
    }

    fn parse(text: &str) -> FeedwatchResult<feed_rs::model::Feed> {
        parser::parse(text.as_bytes()).map_err(|e| FeedwatchError::FeedParse(e.to_string()))
    }

    fn looks_like_html(text: &str) -> bool {
        let head: String = text.chars().take(SNIFF_CHARS).collect::<String>().to_lowercase();
        head.contains("<!doctype html") || head.contains("<html")
    }

    fn entry_to_item(entry: feed_rs::model::Entry, source: &str) -> FeedItem {
        let title = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled".to_string());

        let link = entry.links.into_iter().next().map(|l| l.href);

        let description = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body));

        FeedItem::new(title, source)
            .with_link(link)
            .with_description(description)
            .with_published(entry.published.or(entry.updated))
    }
}

impl FeedParser for FeedRsParser {
    fn validate(&self, text: &str) -> FeedwatchResult<()> {
        if text.trim().is_empty() {
            return Err(FeedwatchError::FeedValidation("empty document".to_string()));
        }

        // A redirect directive is a valid answer even though it has no channel.
        if redirect::resolve(text).is_some() {
            return Ok(());
        }

        if Self::looks_like_html(text) {
            return Err(FeedwatchError::FeedValidation(
                "document is an HTML page, not a feed".to_string(),
            ));
        }

        parser::parse(text.as_bytes())
            .map(|_| ())
            .map_err(|e| FeedwatchError::FeedValidation(e.to_string()))
    }

    fn publication_date(&self, text: &str) -> Option<DateTime<Utc>> {
        let feed = Self::parse(text).ok()?;
        feed.published.or(feed.updated)
    }

    fn content_body<'a>(&self, text: &'a str) -> &'a str {
        text::content_body(text)
    }

    fn feed_info(&self, text: &str, title: &str) -> FeedwatchResult<FeedInfo> {
        let feed = Self::parse(text)?;

        let channel = ChannelInfo {
            title: feed
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| title.to_string()),
            link: feed.links.into_iter().next().map(|l| l.href),
            description: feed.description.map(|d| d.content),
        };

        let items = feed
            .entries
            .into_iter()
            .map(|entry| Self::entry_to_item(entry, title))
            .collect();

        Ok(FeedInfo { channel, items })
    }

    fn render(&self, text: &str, title: &str) -> FeedwatchResult<RenderedDocument> {
        let info = self.feed_info(text, title)?;
        Ok(render_feed(&info, title))
    }
}
