use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    /// Changed since the last time it was read.
    Updated,
    #[default]
    Old,
    Error,
}

impl FeedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedStatus::Updated => "updated",
            FeedStatus::Old => "old",
            FeedStatus::Error => "error",
        }
    }
}

impl std::str::FromStr for FeedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "updated" | "unread" => Ok(FeedStatus::Updated),
            "old" | "read" => Ok(FeedStatus::Old),
            "error" => Ok(FeedStatus::Error),
            _ => Err(format!("Unknown feed status: {}", s)),
        }
    }
}

impl std::fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three mutually exclusive visual states of a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Unread,
    Read,
    Error,
}

impl VisualState {
    pub fn css_class(&self) -> &'static str {
        match self {
            VisualState::Unread => "feedUnread",
            VisualState::Read => "feedRead",
            VisualState::Error => "feedError",
        }
    }
}

impl From<FeedStatus> for VisualState {
    fn from(status: FeedStatus) -> Self {
        match status {
            FeedStatus::Updated => VisualState::Unread,
            FeedStatus::Old => VisualState::Read,
            FeedStatus::Error => VisualState::Error,
        }
    }
}

/// What a refresh observed about the feed content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentMark {
    pub fingerprint: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
}

impl ContentMark {
    pub fn new(fingerprint: impl Into<String>, publication_date: Option<DateTime<Utc>>) -> Self {
        Self {
            fingerprint: Some(fingerprint.into()),
            publication_date,
        }
    }
}

/// Decide the status after a refresh.
///
/// `current` is `None` when the download chain failed. A feed never
/// fingerprinted before is always updated. A stored fingerprint may carry
/// surrounding whitespace, so it is trimmed before comparing.
pub fn next_status(previous: &ContentMark, current: Option<&ContentMark>) -> FeedStatus {
    let Some(current) = current else {
        return FeedStatus::Error;
    };
    let Some(previous_fingerprint) = previous.fingerprint.as_deref().map(str::trim) else {
        return FeedStatus::Updated;
    };

    let fingerprint_changed = current.fingerprint.as_deref() != Some(previous_fingerprint);

    match current.publication_date {
        Some(date) => match previous.publication_date {
            None => FeedStatus::Updated,
            // An unchanged or backdated date keeps the feed old even if the body moved.
            Some(previous_date) if date > previous_date && fingerprint_changed => {
                FeedStatus::Updated
            }
            Some(_) => FeedStatus::Old,
        },
        None if fingerprint_changed => FeedStatus::Updated,
        None => FeedStatus::Old,
    }
}
