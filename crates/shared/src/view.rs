//! What the user currently sees and how key presses address it.

use chrono::{DateTime, Utc};

use crate::articles::{articles_to_rows, filter_by_title, DisplayRow};
use crate::models::Article;

/// Typing this in jump mode switches to search mode.
pub const SEARCH_TRIGGER: char = '/';

/// Key presses the view understands. Everything else is handled (or
/// ignored) by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKey {
    Char(char),
    Backspace,
    Enter,
    Esc,
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    None,
    /// The user picked this article; the front end should open its link.
    Open(Article),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Digits select a row by its number.
    Jump,
    /// Input narrows the list by title.
    Search,
}

/// The article list plus the interactive state around it.
///
/// `displayed` is always `all` narrowed by the current query, and every
/// selection indexes into `displayed`.
#[derive(Debug, Default)]
pub struct ViewState {
    all: Vec<Article>,
    displayed: Vec<Article>,
    search_active: bool,
    pending_input: String,
    cursor: usize,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full article list, keeping any active search applied.
    pub fn publish(&mut self, articles: Vec<Article>) {
        self.all = articles;
        self.refresh_displayed();
    }

    #[cfg(test)]
    pub fn all_articles(&self) -> &[Article] {
        &self.all
    }

    pub fn displayed_articles(&self) -> &[Article] {
        &self.displayed
    }

    pub fn mode(&self) -> InputMode {
        if self.search_active {
            InputMode::Search
        } else {
            InputMode::Jump
        }
    }

    /// The input buffer, without the search trigger.
    #[cfg(test)]
    pub fn input(&self) -> &str {
        &self.pending_input
    }

    /// Prompt text as typed, i.e. with the trigger in search mode.
    pub fn prompt(&self) -> String {
        match self.mode() {
            InputMode::Search => format!("{}{}", SEARCH_TRIGGER, self.pending_input),
            InputMode::Jump => self.pending_input.clone(),
        }
    }

    /// Index of the highlighted row in the displayed list.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn highlighted(&self) -> Option<&Article> {
        self.displayed.get(self.cursor)
    }

    pub fn rows(&self, now: DateTime<Utc>) -> Vec<DisplayRow> {
        articles_to_rows(&self.displayed, now)
    }

    pub fn handle_key(&mut self, key: ViewKey) -> ViewAction {
        match key {
            ViewKey::Enter => return self.confirm(),
            ViewKey::Esc => {
                if self.search_active {
                    self.search_active = false;
                    self.pending_input.clear();
                    self.refresh_displayed();
                }
                self.pending_input.clear();
            }
            ViewKey::Up => self.cursor = self.cursor.saturating_sub(1),
            ViewKey::Down => {
                if self.cursor + 1 < self.displayed.len() {
                    self.cursor += 1;
                }
            }
            ViewKey::Backspace => {
                self.pending_input.pop();
                if self.search_active {
                    self.refresh_displayed();
                }
            }
            ViewKey::Char(c) if self.search_active => {
                self.pending_input.push(c);
                self.refresh_displayed();
            }
            ViewKey::Char(SEARCH_TRIGGER) => {
                self.search_active = true;
                self.pending_input.clear();
                self.refresh_displayed();
            }
            ViewKey::Char(c) if c.is_ascii_digit() => self.pending_input.push(c),
            ViewKey::Char(_) => self.pending_input.clear(),
        }

        ViewAction::None
    }

    fn confirm(&mut self) -> ViewAction {
        if !self.search_active && !self.pending_input.is_empty() {
            let in_range = self
                .pending_input
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=self.displayed.len()).contains(n));

            return match in_range {
                Some(n) => {
                    self.pending_input.clear();
                    ViewAction::Open(self.displayed[n - 1].clone())
                }
                None => ViewAction::None,
            };
        }

        match self.highlighted() {
            Some(article) => ViewAction::Open(article.clone()),
            None => ViewAction::None,
        }
    }

    fn refresh_displayed(&mut self) {
        self.displayed = if self.search_active {
            filter_by_title(&self.all, &self.pending_input)
        } else {
            self.all.clone()
        };
        self.cursor = self.cursor.min(self.displayed.len().saturating_sub(1));
    }
}
