use crate::domain::{FeedId, FeedItem, VisualState};
use crate::errors::FeedwatchResult;
use crate::parser::RenderedDocument;

/// One-way notifications from the engine to whatever shows feeds to the user.
pub trait UiSurface: Send + Sync {
    /// Replace the status line. An empty string clears it.
    fn set_progress(&self, text: &str);

    /// Toggle the "work in progress" indicator.
    fn set_busy(&self, busy: bool);

    fn set_visual_state(&self, id: &FeedId, state: VisualState);

    /// Show a rendered document to the user (a new tab, a file, ...).
    fn open_document(&self, document: &RenderedDocument) -> FeedwatchResult<()>;

    /// Show an item list under a heading, optionally linking the heading.
    fn display_items(&self, title: &str, link: Option<&str>, items: &[FeedItem]);

    /// Popup style notification.
    fn notify(&self, message: &str);
}
