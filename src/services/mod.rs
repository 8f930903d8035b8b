pub mod aggregator;
pub mod context;
pub mod feed_service;
pub mod import_export_service;
pub mod notification_service;
pub mod orchestrator;
pub mod settings_service;
pub mod snapshot;

pub use aggregator::UnifiedFeed;
pub use context::{FeedContext, RefreshOptions};
pub use feed_service::{CollectionListing, FeedService};
pub use import_export_service::{ImportExportService, ImportResult};
pub use notification_service::NotificationService;
pub use orchestrator::BatchOrchestrator;
pub use settings_service::{BatchSettings, SettingsService};
pub use snapshot::FeedSnapshot;
