use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single article as shown in the list and stored in the cache.
///
/// `link` is the identity key: no collection built by this crate holds two
/// articles with the same link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub source: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub link: String,
}

impl Article {
    pub fn new(
        source: impl Into<String>,
        title: impl Into<String>,
        published_at: DateTime<Utc>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            published_at,
            link: link.into(),
        }
    }
}

/// A configured feed: display name plus the URL to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDescriptor {
    pub source: String,
    pub url: String,
}

impl FeedDescriptor {
    pub fn new(source: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            url: url.into(),
        }
    }
}

/// One entry as returned by a feed source, before timestamp normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub published_raw: Option<String>,
}
