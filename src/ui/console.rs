use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{FeedId, FeedItem, VisualState};
use crate::errors::FeedwatchResult;
use crate::parser::RenderedDocument;
use crate::ui::traits::UiSurface;

const SUMMARY_CHARS: usize = 120;

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

/// Terminal front end: progress goes to the log, results to stdout, and
/// "opening" a document writes it as an HTML file into `output_dir`.
pub struct ConsoleSurface {
    output_dir: PathBuf,
}

impl ConsoleSurface {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn file_name(title: &str) -> String {
        let lowered = title.to_lowercase();
        let slug = NON_SLUG.replace_all(&lowered, "-");
        let slug = slug.trim_matches('-');
        if slug.is_empty() {
            "feed.html".to_string()
        } else {
            format!("{}.html", slug)
        }
    }
}

impl UiSurface for ConsoleSurface {
    fn set_progress(&self, text: &str) {
        if !text.is_empty() {
            tracing::info!("{}", text);
        }
    }

    fn set_busy(&self, busy: bool) {
        tracing::debug!(busy, "work in progress");
    }

    fn set_visual_state(&self, id: &FeedId, state: VisualState) {
        tracing::debug!(feed = %id, class = state.css_class(), "feed state changed");
    }

    fn open_document(&self, document: &RenderedDocument) -> FeedwatchResult<()> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(Self::file_name(&document.title));
        fs::write(&path, &document.html)?;
        println!("Opened {} -> {}", document.title, path.display());
        Ok(())
    }

    fn display_items(&self, title: &str, link: Option<&str>, items: &[FeedItem]) {
        match link {
            Some(link) => println!("{} ({} items) <{}>", title, items.len(), link),
            None => println!("{} ({} items)", title, items.len()),
        }
        for item in items {
            println!("  - {} [{}]", item.title, item.source);
            if let Some(link) = item.link.as_deref() {
                println!("    {}", link);
            }
            let summary = item.summary(SUMMARY_CHARS);
            if !summary.is_empty() {
                println!("    {}", summary);
            }
        }
    }

    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}
