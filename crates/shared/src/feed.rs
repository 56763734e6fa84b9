//! Fetching and parsing remote RSS/Atom feeds.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::models::FeedItem;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TOTAL_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 5;

/// Maximum accepted feed body (10 MiB).
pub const MAX_FEED_SIZE: u64 = 10 * 1024 * 1024;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; Headlines/1.0)";

/// Anything that can turn a feed URL into a list of entries.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>>;
}

/// Feed source backed by HTTP.
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>> {
        let failed = |message: String| SyncError::fetch("", url, message);

        validate_url(url).map_err(failed)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP error: {}", status)));
        }

        if let Some(length) = response.content_length() {
            if length > MAX_FEED_SIZE {
                return Err(failed(format!("feed too large: {} bytes", length)));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| failed(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > MAX_FEED_SIZE {
            return Err(failed(format!("feed too large: {} bytes", bytes.len())));
        }

        let items = parse_feed(&bytes).map_err(failed)?;
        debug!(url, items = items.len(), "fetched feed");
        Ok(items)
    }
}

/// Only plain http(s) URLs are fetched.
pub fn validate_url(url: &str) -> std::result::Result<(), String> {
    let parsed = url::Url::parse(url).map_err(|e| format!("invalid URL: {}", e))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(format!("unsupported URL scheme: {}", scheme)),
    }

    if parsed.host().is_none() {
        return Err("URL has no host".to_string());
    }

    Ok(())
}

/// Parse raw RSS/Atom bytes into feed items.
///
/// RSS is tried first, then Atom. Entries without a link are dropped since
/// the link is their identity. RSS `pubDate` text is passed through
/// untouched; Atom `published` is already typed by the parser and is
/// rendered as RFC 3339. Neither falls back to `updated`.
pub fn parse_feed(bytes: &[u8]) -> std::result::Result<Vec<FeedItem>, String> {
    if let Ok(channel) = rss::Channel::read_from(bytes) {
        return Ok(rss_items(&channel));
    }

    atom_syndication::Feed::read_from(bytes)
        .map(|feed| atom_items(&feed))
        .map_err(|e| format!("failed to parse feed: {}", e))
}

fn rss_items(channel: &rss::Channel) -> Vec<FeedItem> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let link = item.link()?.trim().to_string();
            Some(FeedItem {
                title: title_or_untitled(item.title().unwrap_or_default()),
                link,
                published_raw: item.pub_date().map(str::to_string),
            })
        })
        .collect()
}

fn atom_items(feed: &atom_syndication::Feed) -> Vec<FeedItem> {
    feed.entries()
        .iter()
        .filter_map(|entry| {
            let link = entry.links().first()?.href().to_string();
            Some(FeedItem {
                title: title_or_untitled(entry.title().as_str()),
                link,
                published_raw: entry.published().map(|dt| dt.to_rfc3339()),
            })
        })
        .collect()
}

fn title_or_untitled(title: &str) -> String {
    match title.trim() {
        "" => "Untitled".to_string(),
        t => t.to_string(),
    }
}
