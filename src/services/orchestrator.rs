use std::sync::{Arc, Mutex, PoisonError};

use futures::stream::{self, StreamExt};

use crate::domain::{
    BatchKind, BatchPhase, BatchReport, Collection, FeedId, FeedItem, FeedOutcome, FeedStatus,
    SchedulingPolicy, VisualState,
};
use crate::errors::{FeedwatchError, FeedwatchResult};
use crate::services::aggregator;
use crate::services::context::FeedContext;
use crate::services::notification_service::NotificationService;
use crate::services::settings_service::{BatchSettings, SettingsService};
use crate::services::snapshot::FeedSnapshot;
use crate::ui::UiSurface;

/// The feeds of one batch run and what they produced so far.
struct BatchJob {
    kind: BatchKind,
    collection_title: String,
    pending: usize,
    outcomes: Vec<FeedOutcome>,
}

impl BatchJob {
    fn new(kind: BatchKind, collection_title: String, pending: usize) -> Self {
        Self {
            kind,
            collection_title,
            pending,
            outcomes: Vec::with_capacity(pending),
        }
    }

    /// Record one settled feed. Returns true when nothing is pending anymore.
    fn complete(&mut self, outcome: FeedOutcome) -> bool {
        self.pending = self.pending.saturating_sub(1);
        self.outcomes.push(outcome);
        self.pending == 0
    }
}

/// Puts the orchestrator back to idle however a batch ends.
struct PhaseGuard<'a> {
    phase: &'a Mutex<BatchPhase>,
    ui: &'a dyn UiSurface,
}

impl PhaseGuard<'_> {
    fn advance(&self, next: BatchPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.advance(BatchPhase::Idle);
        self.ui.set_progress("");
        self.ui.set_busy(false);
    }
}

/// Runs check / open / unify batches over one collection at a time.
pub struct BatchOrchestrator {
    ctx: FeedContext,
    ui: Arc<dyn UiSurface>,
    settings: SettingsService,
    notifier: NotificationService,
    concurrency: usize,
    phase: Mutex<BatchPhase>,
}

impl BatchOrchestrator {
    pub fn new(ctx: FeedContext, ui: Arc<dyn UiSurface>, concurrency: usize) -> Self {
        Self {
            settings: SettingsService::new(ctx.store.clone()),
            notifier: NotificationService::new(ui.clone()),
            ctx,
            ui,
            concurrency,
            phase: Mutex::new(BatchPhase::Idle),
        }
    }

    pub fn phase(&self) -> BatchPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn check_feeds(&self, collection_id: i64) -> FeedwatchResult<Option<BatchReport>> {
        self.run(BatchKind::Check, collection_id).await
    }

    pub async fn open_all_updated(&self, collection_id: i64) -> FeedwatchResult<Option<BatchReport>> {
        self.run(BatchKind::OpenAll, collection_id).await
    }

    pub async fn open_unified(&self, collection_id: i64) -> FeedwatchResult<Option<BatchReport>> {
        self.run(BatchKind::Unify, collection_id).await
    }

    /// Run one batch. Returns `Ok(None)` without doing anything when another
    /// batch of this orchestrator is still active.
    pub async fn run(
        &self,
        kind: BatchKind,
        collection_id: i64,
    ) -> FeedwatchResult<Option<BatchReport>> {
        let Some(guard) = self.try_begin() else {
            tracing::debug!(?kind, collection_id, "batch already active, request ignored");
            return Ok(None);
        };
        self.ui.set_busy(true);

        let collection = self
            .ctx
            .bookmarks
            .collection(collection_id)?
            .ok_or_else(|| FeedwatchError::CollectionNotFound(collection_id.to_string()))?;
        let settings = self.settings.load()?;
        let policy = settings.policy(self.concurrency);

        tracing::info!(?kind, collection = %collection.title, ?policy, "starting batch");

        let snapshots = self.select(kind, &collection, policy)?;
        let mut job = BatchJob::new(kind, collection.title.clone(), snapshots.len());

        if !snapshots.is_empty() {
            guard.advance(BatchPhase::Running);

            match policy {
                SchedulingPolicy::Sequential => {
                    for snapshot in snapshots {
                        let outcome = self.process(kind, snapshot, policy, settings).await;
                        if job.complete(outcome) {
                            break;
                        }
                    }
                }
                SchedulingPolicy::Concurrent { width } => {
                    let mut in_flight = stream::iter(snapshots)
                        .map(|snapshot| self.process(kind, snapshot, policy, settings))
                        .buffer_unordered(width);

                    while let Some(outcome) = in_flight.next().await {
                        if job.complete(outcome) {
                            break;
                        }
                    }
                }
            }
        }

        guard.advance(BatchPhase::Finishing);
        Ok(Some(self.finish(job, &settings)))
    }

    /// Refresh and open a single feed, independent of any batch.
    pub async fn open_feed(&self, id: &FeedId) -> FeedwatchResult<FeedOutcome> {
        let settings = self.settings.load()?;
        let mut snapshot = FeedSnapshot::load(&self.ctx, id)?;

        let outcome = match self.open_one(&mut snapshot, true, settings.render_feeds).await {
            Ok(outcome) => outcome,
            Err(error) => self.fail(snapshot, error),
        };

        if !outcome.is_error() {
            self.ui.display_items(
                &outcome.title,
                outcome.channel_link.as_deref(),
                &outcome.items,
            );
        }
        self.ui.set_progress("");
        Ok(outcome)
    }

    fn try_begin(&self) -> Option<PhaseGuard<'_>> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase != BatchPhase::Idle {
            return None;
        }
        *phase = BatchPhase::Selecting;

        Some(PhaseGuard {
            phase: &self.phase,
            ui: self.ui.as_ref(),
        })
    }

    fn select(
        &self,
        kind: BatchKind,
        collection: &Collection,
        policy: SchedulingPolicy,
    ) -> FeedwatchResult<Vec<FeedSnapshot>> {
        let selector = kind.selector();
        let action = if policy.is_concurrent() {
            kind.action_name()
        } else {
            "Preparing"
        };

        let mut selected = Vec::new();
        for bookmark in self.ctx.bookmarks.bookmarks_in(collection.id)? {
            match FeedSnapshot::load(&self.ctx, &bookmark.id) {
                Ok(snapshot) if selector.matches(snapshot.status()) => {
                    self.ui
                        .set_progress(&format!("{}: {}", action, snapshot.title()));
                    selected.push(snapshot);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(feed = %bookmark.id, error = %e, "skipping feed that could not be loaded");
                }
            }
        }

        tracing::debug!(selected = selected.len(), "feeds selected");
        Ok(selected)
    }

    /// Refresh one feed and apply the batch action. Always yields an outcome.
    async fn process(
        &self,
        kind: BatchKind,
        mut snapshot: FeedSnapshot,
        policy: SchedulingPolicy,
        settings: BatchSettings,
    ) -> FeedOutcome {
        let sequential = !policy.is_concurrent();

        let result = match kind {
            BatchKind::Check => self.check_one(&mut snapshot, sequential).await,
            BatchKind::OpenAll => {
                self.open_one(&mut snapshot, sequential, settings.render_feeds)
                    .await
            }
            BatchKind::Unify => self.merge_one(&mut snapshot, sequential).await,
        };

        result.unwrap_or_else(|error| self.fail(snapshot, error))
    }

    async fn check_one(
        &self,
        snapshot: &mut FeedSnapshot,
        sequential: bool,
    ) -> FeedwatchResult<FeedOutcome> {
        if sequential {
            self.announce(BatchKind::Check, snapshot);
        }

        let refreshed = snapshot.refresh(&self.ctx).await?;
        if refreshed == FeedStatus::Error {
            return Ok(self.refresh_failed(snapshot));
        }

        if !sequential {
            self.ui
                .set_progress(&format!("{} : received", snapshot.title()));
        }
        self.ui.set_visual_state(snapshot.id(), refreshed.into());

        Ok(outcome(snapshot, refreshed, None, Vec::new()))
    }

    async fn open_one(
        &self,
        snapshot: &mut FeedSnapshot,
        sequential: bool,
        render: bool,
    ) -> FeedwatchResult<FeedOutcome> {
        if sequential {
            self.announce(BatchKind::OpenAll, snapshot);
        }

        let refreshed = snapshot.refresh(&self.ctx).await?;
        if refreshed == FeedStatus::Error {
            return Ok(self.refresh_failed(snapshot));
        }

        let info = snapshot.feed_info(&self.ctx)?;
        if render {
            self.ui.open_document(&snapshot.document(&self.ctx)?)?;
        }

        snapshot.set_status(&self.ctx, FeedStatus::Old)?;
        self.ui.set_visual_state(snapshot.id(), VisualState::Read);
        self.ui
            .set_progress(&format!("{} loaded", snapshot.title()));

        Ok(outcome(snapshot, refreshed, info.channel.link, info.items))
    }

    async fn merge_one(
        &self,
        snapshot: &mut FeedSnapshot,
        sequential: bool,
    ) -> FeedwatchResult<FeedOutcome> {
        if sequential {
            self.announce(BatchKind::Unify, snapshot);
        }

        let refreshed = snapshot.refresh(&self.ctx).await?;
        if refreshed == FeedStatus::Error {
            return Ok(self.refresh_failed(snapshot));
        }

        let info = snapshot.feed_info(&self.ctx)?;
        snapshot.set_status(&self.ctx, FeedStatus::Old)?;
        self.ui.set_visual_state(snapshot.id(), VisualState::Read);
        if !sequential {
            self.ui
                .set_progress(&format!("{} : received", snapshot.title()));
        }

        Ok(outcome(snapshot, refreshed, info.channel.link, info.items))
    }

    fn announce(&self, kind: BatchKind, snapshot: &FeedSnapshot) {
        self.ui
            .set_progress(&format!("{}: {}", kind.action_name(), snapshot.title()));
    }

    /// The download chain failed; the snapshot already holds the error.
    fn refresh_failed(&self, snapshot: &FeedSnapshot) -> FeedOutcome {
        let message = snapshot.error_message().unwrap_or_default();
        self.ui
            .set_progress(&format!("{} : {}", snapshot.title(), message));
        self.ui.set_visual_state(snapshot.id(), VisualState::Error);
        outcome(snapshot, FeedStatus::Error, None, Vec::new())
    }

    /// A batch action failed after the refresh; force the error state.
    fn fail(&self, mut snapshot: FeedSnapshot, error: FeedwatchError) -> FeedOutcome {
        tracing::error!(feed = %snapshot.title(), error = %error, "feed action failed");
        self.ui
            .set_progress(&format!("{} : {}", snapshot.title(), error));

        if let Err(e) = snapshot.mark_failed(&self.ctx, error) {
            tracing::error!(feed = %snapshot.title(), error = %e, "could not record feed failure");
        }
        self.ui.set_visual_state(snapshot.id(), VisualState::Error);

        outcome(&snapshot, FeedStatus::Error, None, Vec::new())
    }

    fn finish(&self, job: BatchJob, settings: &BatchSettings) -> BatchReport {
        let BatchJob {
            kind,
            collection_title,
            pending,
            outcomes,
        } = job;
        debug_assert_eq!(pending, 0);

        let updated = outcomes
            .iter()
            .filter(|o| o.refreshed_status == FeedStatus::Updated)
            .count();
        let failed = outcomes.iter().filter(|o| o.is_error()).count();

        let mut summary = None;
        let mut unified_items = Vec::new();

        match kind {
            BatchKind::Check => {
                summary = self.notifier.report(updated, settings.show_update_popup);
            }
            BatchKind::OpenAll => {
                for outcome in outcomes.iter().filter(|o| !o.is_error()) {
                    self.ui.display_items(
                        &outcome.title,
                        outcome.channel_link.as_deref(),
                        &outcome.items,
                    );
                }
            }
            BatchKind::Unify if !outcomes.is_empty() => {
                let unified = aggregator::unify(&collection_title, &outcomes);
                self.ui
                    .display_items(&unified.title, None, &unified.items);

                if settings.render_feeds {
                    if let Err(e) = self.ui.open_document(&unified.render()) {
                        tracing::error!(collection = %collection_title, error = %e, "could not open unified feed");
                    }
                }
                unified_items = unified.items;
            }
            BatchKind::Unify => {}
        }

        tracing::info!(
            ?kind,
            collection = %collection_title,
            processed = outcomes.len(),
            updated,
            failed,
            "batch finished"
        );

        BatchReport {
            kind,
            collection_title,
            outcomes,
            updated,
            failed,
            summary,
            unified_items,
        }
    }
}

fn outcome(
    snapshot: &FeedSnapshot,
    refreshed_status: FeedStatus,
    channel_link: Option<String>,
    items: Vec<FeedItem>,
) -> FeedOutcome {
    FeedOutcome {
        id: snapshot.id().clone(),
        title: snapshot.title().to_string(),
        refreshed_status,
        status: snapshot.status(),
        error: snapshot.error_message(),
        channel_link,
        items,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::UpdateSummary;
    use crate::services::settings_service::ASYNCHRONOUS_CHECKING;
    use crate::services::settings_service::{RENDER_FEEDS, SHOW_UPDATE_POPUP};
    use crate::testing::{rss_feed, RecordingSurface, TestBed, UiEvent};

    const JAN_6: &str = "Mon, 06 Jan 2025 10:00:00 GMT";

    struct Fixture {
        bed: TestBed,
        collection: Collection,
        orchestrator: BatchOrchestrator,
    }

    fn fixture_with(surface: RecordingSurface, concurrent: bool) -> Fixture {
        let bed = TestBed::with_surface(surface);
        bed.set_flag(ASYNCHRONOUS_CHECKING, concurrent);
        let collection = bed.add_collection("Morning");
        let orchestrator = BatchOrchestrator::new(bed.ctx.clone(), bed.surface(), 4);
        Fixture {
            bed,
            collection,
            orchestrator,
        }
    }

    fn fixture(concurrent: bool) -> Fixture {
        fixture_with(RecordingSurface::default(), concurrent)
    }

    fn feed(fx: &Fixture, name: &str, items: &[&str]) -> FeedId {
        let url = format!("https://{}.example/feed", name.to_lowercase());
        fx.bed.fetcher.serve(&url, &rss_feed(name, Some(JAN_6), items));
        fx.bed.add_feed(fx.collection.id, name, &url)
    }

    fn broken_feed(fx: &Fixture, name: &str) -> FeedId {
        let url = format!("https://{}.example/feed", name.to_lowercase());
        fx.bed.add_feed(fx.collection.id, name, &url)
    }

    #[tokio::test]
    async fn test_check_finishes_once_with_failures_sequential() {
        let fx = fixture(false);
        let alpha = feed(&fx, "Alpha", &["a1"]);
        let broken = broken_feed(&fx, "Broken");
        let gamma = feed(&fx, "Gamma", &["g1"]);

        let report = fx
            .orchestrator
            .check_feeds(fx.collection.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.processed(), 3);
        assert_eq!(report.updated, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.summary, Some(UpdateSummary::ManyUpdated(2)));

        let ui = &fx.bed.ui;
        assert_eq!(ui.busy_cleared(), 1);
        assert_eq!(ui.notifications(), vec!["2 feeds have been updated"]);
        assert_eq!(ui.visual_state(&alpha), Some(VisualState::Unread));
        assert_eq!(ui.visual_state(&broken), Some(VisualState::Error));
        assert_eq!(ui.visual_state(&gamma), Some(VisualState::Unread));
        assert_eq!(fx.orchestrator.phase(), BatchPhase::Idle);

        // Sequential outcomes follow selection order.
        let order: Vec<&str> = report.outcomes.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(order, vec!["Alpha", "Broken", "Gamma"]);
    }

    #[tokio::test]
    async fn test_check_finishes_once_with_failures_concurrent() {
        let fx = fixture(true);
        feed(&fx, "Alpha", &["a1"]);
        broken_feed(&fx, "Broken");
        broken_feed(&fx, "Dead");

        let report = fx
            .orchestrator
            .check_feeds(fx.collection.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.processed(), 3);
        assert_eq!(report.updated, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(fx.bed.ui.busy_cleared(), 1);
        assert_eq!(fx.bed.ui.notifications(), vec!["One feed has been updated"]);
    }

    #[tokio::test]
    async fn test_concurrent_policy_respects_width() {
        let fx = fixture(true);
        for n in 0..10 {
            let url = format!("https://feed{}.example/feed", n);
            fx.bed.fetcher.serve_after(
                &url,
                &rss_feed(&format!("Feed {}", n), Some(JAN_6), &["x"]),
                Duration::from_millis(20),
            );
            fx.bed.add_feed(fx.collection.id, &format!("Feed {}", n), &url);
        }
        let orchestrator = BatchOrchestrator::new(fx.bed.ctx.clone(), fx.bed.surface(), 3);

        let report = orchestrator
            .check_feeds(fx.collection.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.processed(), 10);
        let peak = fx.bed.fetcher.peak_in_flight();
        assert!(peak > 1 && peak <= 3, "peak in flight was {}", peak);
    }

    #[tokio::test]
    async fn test_sequential_progress_announces_each_feed() {
        let fx = fixture(false);
        feed(&fx, "Alpha", &["a1"]);

        fx.orchestrator.check_feeds(fx.collection.id).await.unwrap();

        let progress = fx.bed.ui.progress();
        assert_eq!(progress[0], "Preparing: Alpha");
        assert!(progress.contains(&"Checking: Alpha".to_string()));
        assert_eq!(progress.last().map(String::as_str), Some(""));
    }

    #[tokio::test]
    async fn test_concurrent_progress_only_reports_completion() {
        let fx = fixture(true);
        feed(&fx, "Alpha", &["a1"]);
        broken_feed(&fx, "Broken");

        fx.orchestrator.check_feeds(fx.collection.id).await.unwrap();

        let progress = fx.bed.ui.progress();
        assert!(progress.contains(&"Alpha : received".to_string()));
        assert!(progress.iter().any(|p| p.starts_with("Broken : ")));
        assert!(!progress.iter().any(|p| p.starts_with("Preparing")));
    }

    #[tokio::test]
    async fn test_concurrent_outcomes_in_completion_order() {
        let fx = fixture(true);
        let slow_url = "https://slow.example/feed";
        fx.bed.fetcher.serve_after(
            slow_url,
            &rss_feed("Slow", Some(JAN_6), &["s1"]),
            Duration::from_millis(50),
        );
        fx.bed.add_feed(fx.collection.id, "Slow", slow_url);
        feed(&fx, "Fast", &["f1"]);

        let report = fx
            .orchestrator
            .check_feeds(fx.collection.id)
            .await
            .unwrap()
            .unwrap();

        let order: Vec<&str> = report.outcomes.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(order, vec!["Fast", "Slow"]);
    }

    #[tokio::test]
    async fn test_second_start_while_running_is_ignored() {
        let fx = fixture(true);
        let url = "https://slow.example/feed";
        fx.bed.fetcher.serve_after(
            url,
            &rss_feed("Slow", Some(JAN_6), &["s1"]),
            Duration::from_millis(20),
        );
        fx.bed.add_feed(fx.collection.id, "Slow", url);

        let (first, second) = tokio::join!(
            fx.orchestrator.check_feeds(fx.collection.id),
            fx.orchestrator.check_feeds(fx.collection.id),
        );

        assert!(first.unwrap().is_some());
        assert!(second.unwrap().is_none());
        assert_eq!(fx.bed.fetcher.calls_to(url), 1);
        assert_eq!(fx.bed.ui.busy_cleared(), 1);
        assert_eq!(fx.bed.ui.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_check_skips_unread_feeds() {
        let fx = fixture(false);
        let unread = feed(&fx, "Unread", &["u1"]);
        fx.bed.set_status(&unread, FeedStatus::Updated);

        let report = fx
            .orchestrator
            .check_feeds(fx.collection.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.processed(), 0);
        assert_eq!(fx.bed.fetcher.calls().len(), 0);
        assert_eq!(fx.bed.ui.notifications(), vec!["No feed has been updated"]);
    }

    #[tokio::test]
    async fn test_empty_selection_still_finishes() {
        for kind in [BatchKind::Check, BatchKind::OpenAll, BatchKind::Unify] {
            let fx = fixture(true);

            let report = fx
                .orchestrator
                .run(kind, fx.collection.id)
                .await
                .unwrap()
                .unwrap();

            assert_eq!(report.processed(), 0);
            assert_eq!(fx.bed.ui.busy_cleared(), 1);
            assert!(fx.bed.ui.opened().is_empty());
            assert_eq!(fx.orchestrator.phase(), BatchPhase::Idle);
        }
    }

    #[tokio::test]
    async fn test_popup_can_be_disabled() {
        let fx = fixture(false);
        fx.bed.set_flag(SHOW_UPDATE_POPUP, false);
        feed(&fx, "Alpha", &["a1"]);

        let report = fx
            .orchestrator
            .check_feeds(fx.collection.id)
            .await
            .unwrap()
            .unwrap();

        assert!(report.summary.is_none());
        assert!(fx.bed.ui.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_collection_resets_to_idle() {
        let fx = fixture(false);

        let result = fx.orchestrator.check_feeds(999).await;

        assert!(matches!(result, Err(FeedwatchError::CollectionNotFound(_))));
        assert_eq!(fx.orchestrator.phase(), BatchPhase::Idle);
        assert_eq!(fx.bed.ui.busy_cleared(), 1);
    }

    #[tokio::test]
    async fn test_open_all_opens_and_marks_read() {
        let fx = fixture(false);
        let alpha = feed(&fx, "Alpha", &["a1", "a2"]);
        let beta = feed(&fx, "Beta", &["b1"]);
        fx.bed.set_status(&alpha, FeedStatus::Updated);
        fx.bed.set_status(&beta, FeedStatus::Updated);

        let report = fx
            .orchestrator
            .open_all_updated(fx.collection.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.processed(), 2);
        assert_eq!(fx.bed.ui.opened(), vec!["Alpha", "Beta"]);
        assert_eq!(fx.bed.stored(&alpha).status, FeedStatus::Old);
        assert_eq!(fx.bed.stored(&beta).status, FeedStatus::Old);
        assert!(fx.bed.ui.events().contains(&UiEvent::Items {
            title: "Alpha".to_string(),
            count: 2
        }));
    }

    #[tokio::test]
    async fn test_open_all_respects_render_flag() {
        let fx = fixture(false);
        fx.bed.set_flag(RENDER_FEEDS, false);
        let alpha = feed(&fx, "Alpha", &["a1"]);
        fx.bed.set_status(&alpha, FeedStatus::Updated);

        fx.orchestrator
            .open_all_updated(fx.collection.id)
            .await
            .unwrap();

        assert!(fx.bed.ui.opened().is_empty());
        assert_eq!(fx.bed.stored(&alpha).status, FeedStatus::Old);
    }

    #[tokio::test]
    async fn test_failed_open_marks_only_that_feed() {
        let fx = fixture_with(RecordingSurface::failing_open(), true);
        let alpha = feed(&fx, "Alpha", &["a1"]);
        let beta = feed(&fx, "Beta", &["b1"]);
        fx.bed.set_status(&alpha, FeedStatus::Updated);
        fx.bed.set_status(&beta, FeedStatus::Updated);

        let report = fx
            .orchestrator
            .open_all_updated(fx.collection.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.processed(), 2);
        assert_eq!(report.failed, 2);
        assert_eq!(fx.bed.stored(&alpha).status, FeedStatus::Error);
        assert!(fx.bed.stored(&alpha).last_error.is_some());
        assert_eq!(fx.bed.ui.visual_state(&beta), Some(VisualState::Error));
        assert_eq!(fx.bed.ui.busy_cleared(), 1);
    }

    #[tokio::test]
    async fn test_unify_merges_into_one_document() {
        let fx = fixture(true);
        let alpha = feed(&fx, "Alpha", &["a1", "a2"]);
        let beta = feed(&fx, "Beta", &["b1"]);
        let broken = broken_feed(&fx, "Broken");
        let stale = feed(&fx, "Stale", &["s1"]);
        for id in [&alpha, &beta, &broken] {
            fx.bed.set_status(id, FeedStatus::Updated);
        }

        let report = fx
            .orchestrator
            .open_unified(fx.collection.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.processed(), 3);
        assert_eq!(report.unified_items.len(), 3);
        assert_eq!(fx.bed.ui.opened(), vec!["Morning"]);
        assert!(fx.bed.ui.events().contains(&UiEvent::Items {
            title: "Morning".to_string(),
            count: 3
        }));
        assert_eq!(fx.bed.stored(&alpha).status, FeedStatus::Old);
        assert_eq!(fx.bed.stored(&broken).status, FeedStatus::Error);
        assert_eq!(fx.bed.stored(&stale).status, FeedStatus::Old);
        assert_eq!(fx.bed.fetcher.calls_to("https://stale.example/feed"), 0);
    }

    #[tokio::test]
    async fn test_open_feed_single() {
        let fx = fixture(true);
        let alpha = feed(&fx, "Alpha", &["a1"]);

        let outcome = fx.orchestrator.open_feed(&alpha).await.unwrap();

        assert!(!outcome.is_error());
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.channel_link.as_deref(), Some("https://example.com/"));
        assert_eq!(fx.bed.ui.opened(), vec!["Alpha"]);
        assert_eq!(fx.bed.stored(&alpha).status, FeedStatus::Old);
        assert_eq!(fx.bed.ui.busy_cleared(), 0);
    }

    #[tokio::test]
    async fn test_open_feed_unknown() {
        let fx = fixture(true);
        let result = fx.orchestrator.open_feed(&FeedId::from("404")).await;
        assert!(matches!(result, Err(FeedwatchError::FeedNotFound(_))));
    }
}
