use chrono::{DateTime, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: Option<String>,
    /// Item description as published, may contain markup.
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
    /// Title of the feed this item came from.
    pub source: String,
}

impl FeedItem {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: None,
            description: None,
            published: None,
            source: source.into(),
        }
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_published(mut self, published: Option<DateTime<Utc>>) -> Self {
        self.published = published;
        self
    }

    /// Description stripped of markup, cut to at most `max_chars` characters.
    pub fn summary(&self, max_chars: usize) -> String {
        let Some(description) = self.description.as_deref() else {
            return String::new();
        };

        let fragment = Html::parse_fragment(description);
        let text = fragment
            .root_element()
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ");

        if text.chars().count() <= max_chars {
            text
        } else {
            let mut cut: String = text.chars().take(max_chars).collect();
            cut.push('…');
            cut
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub title: String,
    pub link: Option<String>,
    pub description: Option<String>,
}

/// Channel envelope plus its items, as extracted from one feed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedInfo {
    pub channel: ChannelInfo,
    pub items: Vec<FeedItem>,
}
