//! The sync cycle: load cache, fetch feeds, merge, persist, publish.

use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::articles::{merge_articles, sort_by_date_desc};
use crate::error::{Result, SyncError};
use crate::feed::FeedSource;
use crate::models::{Article, FeedDescriptor, FeedItem};
use crate::store::ArticleStore;
use crate::timestamp::parse_published;

/// Time between the end of one cycle and the start of the next.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// How many feeds are fetched at once.
const MAX_CONCURRENT_FETCHES: usize = 8;

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Fresh data was fetched, merged with the cache and published.
    Success,
    /// Every feed failed; the cache alone was published.
    CacheOnly,
    /// The cache could not be read; nothing was published.
    Failed,
}

/// Result of one sync cycle, delivered to whoever owns the view.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub state: CycleState,
    /// The new view, newest first. `None` when the previous view must stay.
    pub articles: Option<Vec<Article>>,
    /// Non-fatal problems, plus the fatal one for a failed cycle.
    pub diagnostics: Vec<SyncError>,
}

impl CycleOutcome {
    fn failed(err: SyncError) -> Self {
        Self {
            state: CycleState::Failed,
            articles: None,
            diagnostics: vec![err],
        }
    }

    /// One-line status for the UI.
    pub fn summary(&self) -> String {
        let failed_feeds = self
            .diagnostics
            .iter()
            .filter(|e| matches!(e, SyncError::Fetch { .. }))
            .count();

        match (&self.state, &self.articles) {
            (CycleState::Failed, _) | (_, None) => match self
                .diagnostics
                .iter()
                .find(|e| e.is_fatal())
                .or_else(|| self.diagnostics.first())
            {
                Some(err) => format!("Refresh failed: {}", err),
                None => "Refresh failed".to_string(),
            },
            (CycleState::CacheOnly, Some(articles)) => {
                format!("{} cached articles (offline)", articles.len())
            }
            (CycleState::Success, Some(articles)) if failed_feeds > 0 => format!(
                "{} articles, {} feed{} failed",
                articles.len(),
                failed_feeds,
                if failed_feeds == 1 { "" } else { "s" }
            ),
            (CycleState::Success, Some(articles)) => format!("{} articles", articles.len()),
        }
    }
}

/// Drives sync cycles against a feed source and an article store.
pub struct SyncOrchestrator<F, S> {
    source: F,
    store: S,
    feeds: Vec<FeedDescriptor>,
    interval: Duration,
}

impl<F: FeedSource, S: ArticleStore> SyncOrchestrator<F, S> {
    pub fn new(source: F, store: S, feeds: Vec<FeedDescriptor>) -> Self {
        Self {
            source,
            store,
            feeds,
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one full cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        debug!(feeds = self.feeds.len(), "sync cycle started");

        let cached = match self.store.load_all() {
            Ok(cached) => cached,
            Err(e) => {
                error!("Sync cycle aborted: {}", e);
                return CycleOutcome::failed(e);
            }
        };

        let (fresh, failed_feeds, mut diagnostics) = self.fetch_all().await;
        for err in &diagnostics {
            warn!("{}", err);
        }

        if !self.feeds.is_empty() && failed_feeds == self.feeds.len() && fresh.is_empty() {
            warn!(
                "All {} feeds failed, showing {} cached articles",
                failed_feeds,
                cached.len()
            );
            diagnostics.push(SyncError::AllFeedsFailed(failed_feeds));
            let mut articles = cached;
            sort_by_date_desc(&mut articles);
            return CycleOutcome {
                state: CycleState::CacheOnly,
                articles: Some(articles),
                diagnostics,
            };
        }

        match self.store.insert_if_absent(&fresh) {
            Ok(inserted) => debug!(inserted, "persisted fresh articles"),
            Err(e) => {
                // The merged view is still published; these articles may be
                // missing from the cache after a restart.
                error!("{}", e);
                diagnostics.push(e);
            }
        }

        let mut articles = merge_articles(&fresh, &cached);
        sort_by_date_desc(&mut articles);

        info!(
            fresh = fresh.len(),
            cached = cached.len(),
            total = articles.len(),
            errors = diagnostics.len(),
            "sync cycle complete"
        );

        CycleOutcome {
            state: CycleState::Success,
            articles: Some(articles),
            diagnostics,
        }
    }

    /// Fetch every configured feed. Returns the normalized articles in
    /// configured feed order, the number of feeds that failed outright, and
    /// all per-feed and per-item errors.
    async fn fetch_all(&self) -> (Vec<Article>, usize, Vec<SyncError>) {
        let results: Vec<_> = stream::iter(self.feeds.iter().cloned())
            .map(|feed| self.fetch_feed(feed))
            .buffered(MAX_CONCURRENT_FETCHES)
            .collect()
            .await;

        let mut articles = Vec::new();
        let mut errors = Vec::new();
        let mut failed_feeds = 0;

        for (feed, result) in results {
            match result {
                Ok(items) => {
                    let (parsed, parse_errors) = normalize_items(&feed, items);
                    articles.extend(parsed);
                    errors.extend(parse_errors);
                }
                Err(e) => {
                    failed_feeds += 1;
                    errors.push(tag_fetch_error(&feed, e));
                }
            }
        }

        (articles, failed_feeds, errors)
    }

    async fn fetch_feed(&self, feed: FeedDescriptor) -> (FeedDescriptor, Result<Vec<FeedItem>>) {
        let result = self.source.fetch(&feed.url).await;
        (feed, result)
    }

    /// Run cycles until `outcomes` is closed.
    ///
    /// The next cycle starts `interval` after the previous one finished, or
    /// earlier if a message arrives on `refresh_now`.
    pub async fn run(
        self,
        outcomes: mpsc::Sender<CycleOutcome>,
        mut refresh_now: mpsc::Receiver<()>,
    ) {
        info!(
            "Sync loop started (interval: {} seconds)",
            self.interval.as_secs()
        );

        loop {
            let outcome = self.run_cycle().await;
            // Requests made while the cycle ran are already served by it.
            while refresh_now.try_recv().is_ok() {}

            if outcomes.send(outcome).await.is_err() {
                debug!("view closed, stopping sync loop");
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                Some(()) = refresh_now.recv() => debug!("manual refresh requested"),
            }
        }
    }
}

/// Turn raw feed items into articles for `feed`.
///
/// Items without a timestamp are skipped silently; items with an unparsable
/// timestamp are skipped and reported.
pub fn normalize_items(feed: &FeedDescriptor, items: Vec<FeedItem>) -> (Vec<Article>, Vec<SyncError>) {
    let mut articles = Vec::with_capacity(items.len());
    let mut errors = Vec::new();

    for item in items {
        let Some(raw) = item.published_raw.as_deref() else {
            continue;
        };

        match parse_published(raw) {
            Ok(published_at) => articles.push(Article {
                source: feed.source.clone(),
                title: item.title,
                published_at,
                link: item.link,
            }),
            Err(e) => errors.push(SyncError::Parse {
                title: item.title,
                source_name: feed.source.clone(),
                error: Box::new(e),
            }),
        }
    }

    (articles, errors)
}

fn tag_fetch_error(feed: &FeedDescriptor, err: SyncError) -> SyncError {
    let message = match err {
        SyncError::Fetch { message, .. } => message,
        other => other.to_string(),
    };
    SyncError::fetch(&feed.source, &feed.url, message)
}
