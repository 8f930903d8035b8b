use crate::domain::{
    fingerprint, next_status, Bookmark, ContentMark, FeedId, FeedInfo, FeedStatus, StoredFeed,
};
use crate::errors::{FeedwatchError, FeedwatchResult};
use crate::fetch::{insecure_variant, redirect};
use crate::parser::text::decode_entities;
use crate::parser::RenderedDocument;
use crate::services::context::FeedContext;
use crate::storage::KeyValueStoreExt;

/// A feed document that passed validation.
#[derive(Debug, Clone)]
struct Downloaded {
    url: String,
    /// Text as received; structured parsing works on this.
    source: String,
    /// Entity-decoded text; fingerprinting and the redirect target come from this.
    body: String,
}

/// One feed's state across a single refresh.
///
/// Invariant: `status() == FeedStatus::Error` iff an error is recorded.
#[derive(Debug)]
pub struct FeedSnapshot {
    bookmark: Bookmark,
    stored: StoredFeed,
    previous: ContentMark,
    document: Option<Downloaded>,
    error: Option<FeedwatchError>,
    redirect_target: Option<String>,
}

impl FeedSnapshot {
    pub fn load(ctx: &FeedContext, id: &FeedId) -> FeedwatchResult<Self> {
        let bookmark = ctx
            .bookmarks
            .get(id)?
            .ok_or_else(|| FeedwatchError::FeedNotFound(id.to_string()))?;

        let mut stored: StoredFeed = ctx
            .store
            .get_value(&id.storage_key(), StoredFeed::new(id.clone()))?;
        stored.id = id.clone();
        stored.title = bookmark.title.clone();
        if stored.status == FeedStatus::Error && stored.last_error.is_none() {
            stored.set_status(FeedStatus::Error, None);
        }

        let previous = ContentMark {
            fingerprint: stored.fingerprint.clone(),
            publication_date: stored.publication_date,
        };

        Ok(Self {
            bookmark,
            stored,
            previous,
            document: None,
            error: None,
            redirect_target: None,
        })
    }

    pub fn id(&self) -> &FeedId {
        &self.stored.id
    }

    pub fn title(&self) -> &str {
        &self.stored.title
    }

    /// Source URL from the bookmark.
    pub fn url(&self) -> &str {
        &self.bookmark.url
    }

    /// URL the last accepted document came from.
    pub fn final_url(&self) -> &str {
        self.document
            .as_ref()
            .map(|d| d.url.as_str())
            .unwrap_or(&self.bookmark.url)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_target.as_deref()
    }

    pub fn status(&self) -> FeedStatus {
        self.stored.status
    }

    pub fn error(&self) -> Option<&FeedwatchError> {
        self.error.as_ref()
    }

    /// Description of the current failure, including one persisted by an earlier run.
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            Some(error) => Some(error.to_string()),
            None => self.stored.last_error.clone(),
        }
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.stored.fingerprint.as_deref()
    }

    pub fn previous(&self) -> &ContentMark {
        &self.previous
    }

    /// Entity-decoded body of the last accepted document.
    pub fn body(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.body.as_str())
    }

    /// Download, fingerprint and classify the feed, then persist the result.
    ///
    /// Download and validation failures end up as `FeedStatus::Error` with the
    /// error kept on the snapshot; only persistence failures are returned.
    pub async fn refresh(&mut self, ctx: &FeedContext) -> FeedwatchResult<FeedStatus> {
        self.previous = ContentMark {
            fingerprint: self.stored.fingerprint.clone(),
            publication_date: self.stored.publication_date,
        };
        self.document = None;
        self.error = None;
        self.redirect_target = None;

        match self.download(ctx).await {
            Ok(downloaded) => {
                let publication_date = ctx.parser.publication_date(&downloaded.source);
                let current = ContentMark::new(
                    fingerprint(ctx.parser.content_body(&downloaded.body)),
                    publication_date,
                );
                let status = next_status(&self.previous, Some(&current));

                tracing::debug!(
                    feed = %self.stored.title,
                    url = %downloaded.url,
                    status = %status,
                    "feed refreshed"
                );

                self.stored.fingerprint = current.fingerprint;
                self.stored.publication_date = current.publication_date;
                self.stored.set_status(status, None);
                self.document = Some(downloaded);
            }
            Err(error) => {
                tracing::warn!(
                    feed = %self.stored.title,
                    url = %self.bookmark.url,
                    error = %error,
                    "feed download failed"
                );
                // Fingerprint and date stay at the last good content.
                self.stored
                    .set_status(next_status(&self.previous, None), Some(error.to_string()));
                self.error = Some(error);
            }
        }

        self.save(ctx)?;
        Ok(self.stored.status)
    }

    /// Explicit override, e.g. mark as read or as updated.
    pub fn set_status(&mut self, ctx: &FeedContext, status: FeedStatus) -> FeedwatchResult<()> {
        if status == FeedStatus::Error {
            let error = FeedwatchError::Unexpected("marked as failed".to_string());
            self.stored.set_status(status, Some(error.to_string()));
            self.error = Some(error);
        } else {
            self.stored.set_status(status, None);
            self.error = None;
        }
        self.save(ctx)
    }

    /// Force the error state with the failure that caused it.
    pub fn mark_failed(&mut self, ctx: &FeedContext, error: FeedwatchError) -> FeedwatchResult<()> {
        self.stored
            .set_status(FeedStatus::Error, Some(error.to_string()));
        self.error = Some(error);
        self.save(ctx)
    }

    pub fn save(&self, ctx: &FeedContext) -> FeedwatchResult<()> {
        ctx.store.set_value(&self.stored.id.storage_key(), &self.stored)
    }

    pub fn feed_info(&self, ctx: &FeedContext) -> FeedwatchResult<FeedInfo> {
        let document = self.downloaded()?;
        ctx.parser.feed_info(&document.source, &self.stored.title)
    }

    pub fn document(&self, ctx: &FeedContext) -> FeedwatchResult<RenderedDocument> {
        let document = self.downloaded()?;
        ctx.parser.render(&document.source, &self.stored.title)
    }

    fn downloaded(&self) -> FeedwatchResult<&Downloaded> {
        self.document.as_ref().ok_or_else(|| {
            FeedwatchError::FeedParse(format!("{} has no downloaded document", self.stored.title))
        })
    }

    /// Fetch the feed, following in-body redirects up to the configured bound.
    async fn download(&mut self, ctx: &FeedContext) -> FeedwatchResult<Downloaded> {
        let limit = ctx.options.max_redirect_hops;
        let mut url = self.bookmark.url.clone();
        let mut hops = 0;

        loop {
            let downloaded = Self::download_with_fallback(ctx, &url).await?;

            // Escaped markup inside item text only turns into a directive once decoded.
            let target = redirect::resolve(&downloaded.source)
                .and_then(|_| redirect::resolve(&downloaded.body));
            let Some(target) = target else {
                return Ok(downloaded);
            };
            if hops >= limit {
                return Err(FeedwatchError::RedirectLoopExceeded {
                    url: downloaded.url,
                    limit,
                });
            }

            hops += 1;
            tracing::info!(
                feed = %self.stored.title,
                from = %downloaded.url,
                to = %target,
                "feed has moved, following redirect"
            );
            self.redirect_target = Some(target.clone());
            url = target;
        }
    }

    /// Run the fetch chain, then once more over plain http for https URLs.
    async fn download_with_fallback(ctx: &FeedContext, url: &str) -> FeedwatchResult<Downloaded> {
        let error = match Self::download_chain(ctx, url).await {
            Ok(downloaded) => return Ok(downloaded),
            Err(error) => error,
        };

        match insecure_variant(url) {
            Some(insecure) => {
                tracing::debug!(url, error = %error, "secure fetch failed, retrying over http");
                Self::download_chain(ctx, &insecure).await
            }
            None => Err(error),
        }
    }

    async fn download_chain(ctx: &FeedContext, url: &str) -> FeedwatchResult<Downloaded> {
        match Self::download_once(ctx, url, true).await {
            Ok(downloaded) => Ok(downloaded),
            Err(error) => {
                tracing::debug!(url, error = %error, "uncached fetch failed, trying cached copy");
                Self::download_once(ctx, url, false).await
            }
        }
    }

    async fn download_once(
        ctx: &FeedContext,
        url: &str,
        bypass_cache: bool,
    ) -> FeedwatchResult<Downloaded> {
        let source = ctx.fetcher.fetch(url, bypass_cache).await?;
        ctx.parser.validate(&source)?;
        let body = decode_entities(&source);

        Ok(Downloaded {
            url: url.to_string(),
            source,
            body,
        })
    }
}
