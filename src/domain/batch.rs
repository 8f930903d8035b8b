use super::feed::FeedId;
use super::item::FeedItem;
use super::notification::UpdateSummary;
use super::status::FeedStatus;

/// User-initiated batch commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// Refresh stale or errored feeds and report how many changed.
    Check,
    /// Open every unread feed as its own document.
    OpenAll,
    /// Merge every unread feed into one document.
    Unify,
}

impl BatchKind {
    /// Verb shown in progress lines.
    pub fn action_name(&self) -> &'static str {
        match self {
            BatchKind::Check => "Checking",
            BatchKind::OpenAll => "Opening",
            BatchKind::Unify => "Merging",
        }
    }

    pub fn selector(&self) -> FeedSelector {
        match self {
            BatchKind::Check => FeedSelector::StaleOrErrored,
            BatchKind::OpenAll | BatchKind::Unify => FeedSelector::Unread,
        }
    }
}

/// Which feeds of a collection qualify for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSelector {
    StaleOrErrored,
    Unread,
}

impl FeedSelector {
    pub fn matches(&self, status: FeedStatus) -> bool {
        match self {
            FeedSelector::StaleOrErrored => matches!(status, FeedStatus::Old | FeedStatus::Error),
            FeedSelector::Unread => status == FeedStatus::Updated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingPolicy {
    /// One feed at a time, in selection order.
    Sequential,
    /// Up to `width` feeds in flight at once.
    Concurrent { width: usize },
}

impl SchedulingPolicy {
    pub fn is_concurrent(&self) -> bool {
        matches!(self, SchedulingPolicy::Concurrent { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPhase {
    #[default]
    Idle,
    Selecting,
    Running,
    Finishing,
}

/// Result of processing a single feed inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedOutcome {
    pub id: FeedId,
    pub title: String,
    /// Status right after the refresh, before any follow-up action changed it.
    pub refreshed_status: FeedStatus,
    /// Status at the end of processing.
    pub status: FeedStatus,
    pub error: Option<String>,
    /// Site link of the channel, when the feed was parsed.
    pub channel_link: Option<String>,
    pub items: Vec<FeedItem>,
}

impl FeedOutcome {
    pub fn is_error(&self) -> bool {
        self.status == FeedStatus::Error
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub kind: BatchKind,
    pub collection_title: String,
    /// Outcomes in completion order.
    pub outcomes: Vec<FeedOutcome>,
    pub updated: usize,
    pub failed: usize,
    pub summary: Option<UpdateSummary>,
    pub unified_items: Vec<FeedItem>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }
}
