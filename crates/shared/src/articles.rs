use chrono::{DateTime, Utc};
use chrono_humanize::HumanTime;
use std::collections::HashSet;

use crate::models::Article;

/// One rendered table row, with a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub position: usize,
    pub source: String,
    pub relative_time: String,
    pub title: String,
}

impl DisplayRow {
    pub fn new(article: &Article, position: usize, now: DateTime<Utc>) -> Self {
        Self {
            position,
            source: article.source.clone(),
            relative_time: relative_time(article.published_at, now),
            title: article.title.clone(),
        }
    }
}

/// Human-readable distance from `now`, e.g. "3 hours ago".
pub fn relative_time(published_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    HumanTime::from(published_at - now).to_string()
}

/// Convert articles to display rows numbered from 1.
pub fn articles_to_rows(articles: &[Article], now: DateTime<Utc>) -> Vec<DisplayRow> {
    articles
        .iter()
        .enumerate()
        .map(|(i, article)| DisplayRow::new(article, i + 1, now))
        .collect()
}

/// Sort articles in place, newest first.
pub fn sort_by_date_desc(articles: &mut [Article]) {
    articles.sort_unstable_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// Deduplicate two article lists by link.
///
/// When both lists contain the same link, the article from `primary` is kept.
pub fn merge_articles(primary: &[Article], secondary: &[Article]) -> Vec<Article> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(primary.len() + secondary.len());
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());

    for article in primary.iter().chain(secondary) {
        if seen.insert(article.link.as_str()) {
            merged.push(article.clone());
        }
    }

    merged
}

/// Articles whose title contains `query`, ignoring case.
pub fn filter_by_title(articles: &[Article], query: &str) -> Vec<Article> {
    if query.is_empty() {
        return articles.to_vec();
    }

    let query = query.to_lowercase();
    articles
        .iter()
        .filter(|a| a.title.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, hour, 0, 0).unwrap()
    }

    fn article(source: &str, title: &str, hour: u32, link: &str) -> Article {
        Article::new(source, title, at(hour), link)
    }

    fn links(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.link.as_str()).collect()
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_merge_primary_wins_on_collision() {
        let primary = vec![article("fresh", "New title", 10, "https://a.com")];
        let secondary = vec![article("cache", "Old title", 9, "https://a.com")];

        let merged = merge_articles(&primary, &secondary);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, "fresh");
        assert_eq!(merged[0].title, "New title");
    }

    #[test]
    fn test_merge_keeps_unique_links_in_order() {
        let primary = vec![
            article("a", "One", 1, "https://1.com"),
            article("a", "Two", 2, "https://2.com"),
        ];
        let secondary = vec![
            article("b", "Two again", 3, "https://2.com"),
            article("b", "Three", 4, "https://3.com"),
            article("b", "Four", 5, "https://4.com"),
        ];

        let merged = merge_articles(&primary, &secondary);

        assert_eq!(
            links(&merged),
            vec!["https://1.com", "https://2.com", "https://3.com", "https://4.com"]
        );
        assert_eq!(merged[1].title, "Two");
    }

    #[test]
    fn test_merge_secondary_only_when_primary_empty() {
        let secondary = vec![
            article("b", "One", 1, "https://1.com"),
            article("b", "One dup", 2, "https://1.com"),
        ];

        let merged = merge_articles(&[], &secondary);

        assert_eq!(links(&merged), vec!["https://1.com"]);
        assert_eq!(merged[0].title, "One");
    }

    #[test]
    fn test_merge_dedups_within_primary() {
        let primary = vec![
            article("a", "First", 1, "https://1.com"),
            article("b", "Second", 2, "https://1.com"),
        ];

        let merged = merge_articles(&primary, &[]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "First");
    }

    // ==================== Sort Tests ====================

    #[test]
    fn test_sort_newest_first() {
        let mut articles = vec![
            article("a", "Old", 1, "https://1.com"),
            article("a", "Newest", 12, "https://2.com"),
            article("a", "Middle", 6, "https://3.com"),
            article("a", "Middle too", 6, "https://4.com"),
        ];

        sort_by_date_desc(&mut articles);

        assert_eq!(articles[0].title, "Newest");
        assert_eq!(articles[3].title, "Old");
        for pair in articles.windows(2) {
            assert!(pair[0].published_at >= pair[1].published_at);
        }
    }

    #[test]
    fn test_sort_empty_is_noop() {
        let mut articles: Vec<Article> = Vec::new();
        sort_by_date_desc(&mut articles);
        assert!(articles.is_empty());
    }

    // ==================== Filter Tests ====================

    #[test]
    fn test_filter_empty_query_returns_input() {
        let articles = vec![
            article("a", "Go News", 1, "https://1.com"),
            article("a", "Rust News", 2, "https://2.com"),
        ];

        assert_eq!(filter_by_title(&articles, ""), articles);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let articles = vec![article("a", "Go News", 1, "https://1.com")];

        let filtered = filter_by_title(&articles, "go");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Go News");
    }

    #[test]
    fn test_filter_keeps_relative_order() {
        let articles = vec![
            article("a", "SQL tips", 3, "https://1.com"),
            article("a", "Nothing here", 2, "https://2.com"),
            article("a", "Why NoSQL", 1, "https://3.com"),
        ];

        let filtered = filter_by_title(&articles, "SQL");

        assert_eq!(links(&filtered), vec!["https://1.com", "https://3.com"]);
    }

    #[test]
    fn test_filter_no_match() {
        let articles = vec![article("a", "Go News", 1, "https://1.com")];
        assert!(filter_by_title(&articles, "python").is_empty());
    }

    // ==================== Row Tests ====================

    #[test]
    fn test_rows_are_numbered_from_one() {
        let articles = vec![
            article("HN", "First", 10, "https://1.com"),
            article("Lobsters", "Second", 9, "https://2.com"),
        ];

        let rows = articles_to_rows(&articles, at(12));

        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[0].source, "HN");
        assert_eq!(rows[1].position, 2);
        assert_eq!(rows[1].title, "Second");
    }

    #[test]
    fn test_relative_time_in_past() {
        let now = at(12);
        let text = relative_time(now - Duration::hours(3), now);
        assert_eq!(text, "3 hours ago");
    }
}
