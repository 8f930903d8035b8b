use std::sync::Arc;

use crate::domain::UpdateSummary;
use crate::ui::UiSurface;

/// Tells the user how many feeds a check batch found updated.
pub struct NotificationService {
    ui: Arc<dyn UiSurface>,
}

impl NotificationService {
    pub fn new(ui: Arc<dyn UiSurface>) -> Self {
        Self { ui }
    }

    /// Emit exactly one message when enabled; `None` otherwise.
    pub fn report(&self, updated: usize, enabled: bool) -> Option<UpdateSummary> {
        if !enabled {
            tracing::debug!(updated, "update popup disabled");
            return None;
        }

        let summary = UpdateSummary::from_count(updated);
        self.ui.notify(&summary.message());
        Some(summary)
    }
}
