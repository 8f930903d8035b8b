pub mod batch;
pub mod feed;
pub mod fingerprint;
pub mod item;
pub mod notification;
pub mod status;

pub use batch::{BatchKind, BatchPhase, BatchReport, FeedOutcome, FeedSelector, SchedulingPolicy};
pub use feed::{Bookmark, Collection, FeedId, StoredFeed};
pub use fingerprint::fingerprint;
pub use item::{ChannelInfo, FeedInfo, FeedItem};
pub use notification::UpdateSummary;
pub use status::{next_status, ContentMark, FeedStatus, VisualState};
