use chrono::{DateTime, Utc};

use crate::domain::FeedInfo;
use crate::errors::FeedwatchResult;
use crate::parser::render::RenderedDocument;

/// Feed document parser, treated as a black box by the refresh engine.
pub trait FeedParser: Send + Sync {
    /// Reject anything that is not a well-formed feed document.
    fn validate(&self, text: &str) -> FeedwatchResult<()>;

    /// Channel level publication date, `None` when absent or malformed.
    fn publication_date(&self, text: &str) -> Option<DateTime<Utc>>;

    /// Canonical content used for fingerprinting.
    fn content_body<'a>(&self, text: &'a str) -> &'a str;

    /// Channel envelope and items; `title` names the feed in each item.
    fn feed_info(&self, text: &str, title: &str) -> FeedwatchResult<FeedInfo>;

    fn render(&self, text: &str, title: &str) -> FeedwatchResult<RenderedDocument>;
}
