use thiserror::Error;

/// Everything that can go wrong during a sync cycle.
///
/// Only `StoreRead` aborts a cycle. The rest are collected as diagnostics
/// while the cycle carries on with whatever data it still has.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A timestamp matched none of the accepted formats.
    #[error("unsupported date format: {0:?}")]
    UnsupportedTimeFormat(String),

    /// A single item was skipped because its timestamp could not be parsed.
    #[error("parsing date for {title:?} from {source_name}: {error}")]
    Parse {
        title: String,
        source_name: String,
        error: Box<SyncError>,
    },

    /// A single feed could not be fetched or parsed.
    #[error("fetching {source_name} ({url}): {message}")]
    Fetch {
        source_name: String,
        url: String,
        message: String,
    },

    #[error("reading article cache: {0}")]
    StoreRead(String),

    #[error("writing article cache: {0}")]
    StoreWrite(String),

    /// Every configured feed failed; the cycle fell back to the cache.
    #[error("all {0} feeds failed")]
    AllFeedsFailed(usize),
}

impl SyncError {
    pub fn fetch(source_name: &str, url: &str, message: impl Into<String>) -> Self {
        SyncError::Fetch {
            source_name: source_name.to_string(),
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error is fatal for the cycle it occurred in.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::StoreRead(_))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_time_format_display() {
        let err = SyncError::UnsupportedTimeFormat("yesterday".to_string());
        assert_eq!(err.to_string(), "unsupported date format: \"yesterday\"");
    }

    #[test]
    fn test_parse_error_wraps_item_context() {
        let err = SyncError::Parse {
            title: "Rust 2.0".to_string(),
            source_name: "Lobsters".to_string(),
            error: Box::new(SyncError::UnsupportedTimeFormat("soon".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "parsing date for \"Rust 2.0\" from Lobsters: unsupported date format: \"soon\""
        );
    }

    #[test]
    fn test_fetch_error_display() {
        let err = SyncError::fetch("HN", "https://example.com/rss", "HTTP error: 503");
        assert_eq!(
            err.to_string(),
            "fetching HN (https://example.com/rss): HTTP error: 503"
        );
    }

    #[test]
    fn test_only_store_read_is_fatal() {
        assert!(SyncError::StoreRead("locked".to_string()).is_fatal());
        assert!(!SyncError::StoreWrite("locked".to_string()).is_fatal());
        assert!(!SyncError::AllFeedsFailed(2).is_fatal());
        assert!(!SyncError::fetch("a", "b", "c").is_fatal());
    }
}
