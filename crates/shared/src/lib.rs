// Public modules
pub mod articles;
pub mod config;
pub mod error;
pub mod feed;
pub mod io;
pub mod logging;
pub mod models;
pub mod store;
pub mod sync;
pub mod timestamp;
pub mod view;

// Re-export commonly used types
pub use articles::{filter_by_title, merge_articles, sort_by_date_desc, DisplayRow};
pub use config::Config;
pub use error::SyncError;
pub use feed::{FeedSource, HttpFeedSource};
pub use models::{Article, FeedDescriptor, FeedItem};
pub use store::{ArticleStore, SqliteStore};
pub use sync::{CycleOutcome, CycleState, SyncOrchestrator};
pub use timestamp::parse_published;
pub use view::{InputMode, ViewAction, ViewKey, ViewState};
