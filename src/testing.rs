//! Fakes and fixtures shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Collection, FeedId, FeedItem, FeedStatus, StoredFeed, VisualState};
use crate::errors::{FeedwatchError, FeedwatchResult};
use crate::fetch::Fetcher;
use crate::parser::{FeedRsParser, RenderedDocument};
use crate::services::context::FeedContext;
use crate::storage::{
    BookmarkStore, KeyValueStore, KeyValueStoreExt, SqliteBookmarkRepository,
    SqliteKeyValueRepository, SqliteStorage,
};
use crate::ui::UiSurface;

pub const SAMPLE_ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Compiler Notes</title>
  <link href="https://notes.example.org/"/>
  <id>urn:uuid:4a1c2f0e-0b7d-4d52-9c0e-5f3b1d2a9e11</id>
  <updated>2025-01-08T09:30:00Z</updated>
  <entry>
    <title>Understanding WebAssembly</title>
    <link href="https://notes.example.org/wasm"/>
    <id>urn:uuid:7d9e2b44-1c3a-4e8f-a6b0-2c4d8e1f3a55</id>
    <updated>2025-01-08T09:30:00Z</updated>
    <summary>A tour of the stack machine behind the modules.</summary>
  </entry>
</feed>
"#;

/// Minimal RSS 2.0 document; each item gets a link and description derived from its title.
pub fn rss_feed(title: &str, pub_date: Option<&str>, items: &[&str]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n<channel>\n\
         <title>{}</title>\n<link>https://example.com/</link>\n<description>Test feed</description>\n",
        title
    );
    if let Some(date) = pub_date {
        xml.push_str(&format!("<pubDate>{}</pubDate>\n", date));
    }
    for item in items {
        let slug = item.to_lowercase().replace(' ', "-");
        xml.push_str(&format!(
            "<item>\n<title>{item}</title>\n<link>https://example.com/{slug}</link>\n\
             <description>About {item}</description>\n<guid>https://example.com/{slug}</guid>\n</item>\n"
        ));
    }
    xml.push_str("</channel>\n</rss>\n");
    xml
}

pub fn redirect_body(target: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<redirect>\n<newLocation>{}</newLocation>\n</redirect>\n",
        target
    )
}

#[derive(Debug, Clone)]
struct Route {
    body: String,
    cached_only: bool,
    delay: Option<Duration>,
}

/// [`Fetcher`] answering from a fixed table and recording every request.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<(String, bool)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    fn route(&self, url: &str, route: Route) {
        self.routes.lock().unwrap().insert(url.to_string(), route);
    }

    pub fn serve(&self, url: &str, body: &str) {
        self.route(
            url,
            Route {
                body: body.to_string(),
                cached_only: false,
                delay: None,
            },
        );
    }

    /// Only answers requests that do not bypass the cache.
    pub fn serve_cached_only(&self, url: &str, body: &str) {
        self.route(
            url,
            Route {
                body: body.to_string(),
                cached_only: true,
                delay: None,
            },
        );
    }

    pub fn serve_after(&self, url: &str, body: &str, delay: Duration) {
        self.route(
            url,
            Route {
                body: body.to_string(),
                cached_only: false,
                delay: Some(delay),
            },
        );
    }

    pub fn clear(&self) {
        self.routes.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == url)
            .count()
    }

    /// Most requests that were ever awaiting an answer at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(&self, url: &str, bypass_cache: bool) -> FeedwatchResult<String> {
        let route = self.routes.lock().unwrap().get(url).cloned();
        let Some(route) = route else {
            return Err(FeedwatchError::HttpStatus {
                url: url.to_string(),
                status: 404,
            });
        };

        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }
        if route.cached_only && bypass_cache {
            return Err(FeedwatchError::HttpStatus {
                url: url.to_string(),
                status: 503,
            });
        }
        Ok(route.body)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, bypass_cache: bool) -> FeedwatchResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), bypass_cache));

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        let result = self.answer(url, bypass_cache).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Progress(String),
    Busy(bool),
    Visual(FeedId, VisualState),
    Opened(String),
    Items { title: String, count: usize },
    Notified(String),
}

/// [`UiSurface`] that records every call in order.
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<UiEvent>>,
    fail_open: AtomicBool,
}

impl RecordingSurface {
    pub fn failing_open() -> Self {
        let surface = Self::default();
        surface.fail_open.store(true, Ordering::SeqCst);
        surface
    }

    fn record(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Progress(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Notified(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn opened(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Opened(title) => Some(title),
                _ => None,
            })
            .collect()
    }

    pub fn busy_cleared(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| **e == UiEvent::Busy(false))
            .count()
    }

    pub fn visual_state(&self, id: &FeedId) -> Option<VisualState> {
        self.events().into_iter().rev().find_map(|e| match e {
            UiEvent::Visual(feed, state) if feed == *id => Some(state),
            _ => None,
        })
    }
}

impl UiSurface for RecordingSurface {
    fn set_progress(&self, text: &str) {
        self.record(UiEvent::Progress(text.to_string()));
    }

    fn set_busy(&self, busy: bool) {
        self.record(UiEvent::Busy(busy));
    }

    fn set_visual_state(&self, id: &FeedId, state: VisualState) {
        self.record(UiEvent::Visual(id.clone(), state));
    }

    fn open_document(&self, document: &RenderedDocument) -> FeedwatchResult<()> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(FeedwatchError::Unexpected("surface refused the document".to_string()));
        }
        self.record(UiEvent::Opened(document.title.clone()));
        Ok(())
    }

    fn display_items(&self, title: &str, _link: Option<&str>, items: &[FeedItem]) {
        self.record(UiEvent::Items {
            title: title.to_string(),
            count: items.len(),
        });
    }

    fn notify(&self, message: &str) {
        self.record(UiEvent::Notified(message.to_string()));
    }
}

/// In-memory SQLite stores, a scripted fetcher and a recording surface wired together.
pub struct TestBed {
    pub bookmarks: Arc<SqliteBookmarkRepository>,
    pub store: Arc<SqliteKeyValueRepository>,
    pub fetcher: Arc<ScriptedFetcher>,
    pub ui: Arc<RecordingSurface>,
    pub ctx: FeedContext,
}

impl TestBed {
    pub fn new() -> Self {
        Self::with_surface(RecordingSurface::default())
    }

    pub fn with_surface(surface: RecordingSurface) -> Self {
        let storage = SqliteStorage::in_memory().unwrap();
        let bookmarks = Arc::new(SqliteBookmarkRepository::new(storage.clone()));
        let store = Arc::new(SqliteKeyValueRepository::new(storage));
        let fetcher = Arc::new(ScriptedFetcher::default());

        let ctx = FeedContext::new(
            bookmarks.clone(),
            store.clone(),
            fetcher.clone(),
            Arc::new(FeedRsParser::new()),
        );

        Self {
            bookmarks,
            store,
            fetcher,
            ui: Arc::new(surface),
            ctx,
        }
    }

    pub fn surface(&self) -> Arc<dyn UiSurface> {
        self.ui.clone()
    }

    pub fn add_collection(&self, title: &str) -> Collection {
        self.bookmarks.add_collection(title).unwrap()
    }

    pub fn add_feed(&self, collection_id: i64, title: &str, url: &str) -> FeedId {
        self.bookmarks
            .add_bookmark(collection_id, title, url)
            .unwrap()
            .id
    }

    pub fn stored(&self, id: &FeedId) -> StoredFeed {
        self.store
            .get_value(&id.storage_key(), StoredFeed::new(id.clone()))
            .unwrap()
    }

    pub fn put_stored(&self, stored: &StoredFeed) {
        self.store
            .set_value(&stored.id.storage_key(), stored)
            .unwrap();
    }

    pub fn set_status(&self, id: &FeedId, status: FeedStatus) {
        let mut stored = self.stored(id);
        stored.set_status(status, None);
        self.put_stored(&stored);
    }

    pub fn set_flag(&self, key: &str, value: bool) {
        self.store.set_value(key, &value).unwrap();
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.store.get_raw(key).unwrap()
    }
}
