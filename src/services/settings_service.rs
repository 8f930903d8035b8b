use std::sync::Arc;

use crate::domain::SchedulingPolicy;
use crate::errors::{FeedwatchError, FeedwatchResult};
use crate::storage::{KeyValueStore, KeyValueStoreExt};

pub const ASYNCHRONOUS_CHECKING: &str = "asynchronousFeedChecking";
pub const SHOW_UPDATE_POPUP: &str = "showFeedUpdatePopup";
pub const RENDER_FEEDS: &str = "renderFeeds";

const KEYS: [&str; 3] = [ASYNCHRONOUS_CHECKING, SHOW_UPDATE_POPUP, RENDER_FEEDS];

/// User flags read at the start of every batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub asynchronous_checking: bool,
    pub show_update_popup: bool,
    pub render_feeds: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            asynchronous_checking: true,
            show_update_popup: true,
            render_feeds: true,
        }
    }
}

impl BatchSettings {
    pub fn policy(&self, width: usize) -> SchedulingPolicy {
        if self.asynchronous_checking {
            SchedulingPolicy::Concurrent {
                width: width.max(1),
            }
        } else {
            SchedulingPolicy::Sequential
        }
    }
}

pub struct SettingsService {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> FeedwatchResult<BatchSettings> {
        let defaults = BatchSettings::default();

        Ok(BatchSettings {
            asynchronous_checking: self
                .store
                .get_value(ASYNCHRONOUS_CHECKING, defaults.asynchronous_checking)?,
            show_update_popup: self
                .store
                .get_value(SHOW_UPDATE_POPUP, defaults.show_update_popup)?,
            render_feeds: self.store.get_value(RENDER_FEEDS, defaults.render_feeds)?,
        })
    }

    pub fn set(&self, key: &str, value: bool) -> FeedwatchResult<()> {
        if !KEYS.contains(&key) {
            return Err(FeedwatchError::InvalidInput(format!(
                "unknown setting '{}', expected one of: {}",
                key,
                KEYS.join(", ")
            )));
        }

        tracing::info!(key, value, "setting changed");
        self.store.set_value(key, &value)
    }

    /// Every known flag with its effective value.
    pub fn entries(&self) -> FeedwatchResult<Vec<(&'static str, bool)>> {
        let settings = self.load()?;
        Ok(vec![
            (ASYNCHRONOUS_CHECKING, settings.asynchronous_checking),
            (SHOW_UPDATE_POPUP, settings.show_update_popup),
            (RENDER_FEEDS, settings.render_feeds),
        ])
    }
}
