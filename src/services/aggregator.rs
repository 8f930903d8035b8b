use crate::domain::{FeedItem, FeedOutcome};
use crate::parser::{render_unified, RenderedDocument};

/// Items of several feeds presented as one document.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedFeed {
    pub title: String,
    pub items: Vec<FeedItem>,
}

impl UnifiedFeed {
    pub fn render(&self) -> RenderedDocument {
        render_unified(&self.title, &self.items)
    }
}

/// Items of every successful outcome, in the order the outcomes completed.
pub fn merge(outcomes: &[FeedOutcome]) -> Vec<FeedItem> {
    outcomes
        .iter()
        .filter(|outcome| !outcome.is_error())
        .flat_map(|outcome| outcome.items.iter().cloned())
        .collect()
}

pub fn unify(title: &str, outcomes: &[FeedOutcome]) -> UnifiedFeed {
    UnifiedFeed {
        title: title.to_string(),
        items: merge(outcomes),
    }
}
