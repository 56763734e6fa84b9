use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use shared::{
    ArticleStore, CycleOutcome, FeedSource, SyncOrchestrator, ViewAction, ViewKey, ViewState,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::ui::{self, RenderConfig};

/// How often the terminal is polled for input.
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(30);

/// Everything the event loop reacts to, handled one at a time.
#[derive(Debug)]
pub enum Message {
    Key(KeyEvent),
    Synced(CycleOutcome),
}

/// What the loop should do after handling a message.
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    Refresh,
    OpenLink(String),
}

pub struct App {
    view: ViewState,
    status: String,
    render: RenderConfig,
}

impl App {
    pub fn new(render: RenderConfig) -> Self {
        Self {
            view: ViewState::new(),
            status: "Loading...".to_string(),
            render,
        }
    }

    /// Start the sync loop in the background and run the UI until quit.
    pub async fn run<F, S>(mut self, orchestrator: SyncOrchestrator<F, S>) -> Result<()>
    where
        F: FeedSource + 'static,
        S: ArticleStore + 'static,
    {
        let (outcome_tx, mut outcome_rx) = mpsc::channel(4);
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let sync_task = tokio::spawn(orchestrator.run(outcome_tx, refresh_rx));

        let mut terminal = ratatui::try_init().context("Failed to initialise terminal")?;
        let result = self
            .event_loop(&mut terminal, &mut outcome_rx, &refresh_tx)
            .await;
        ratatui::try_restore().context("Failed to restore terminal")?;

        sync_task.abort();
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut DefaultTerminal,
        outcomes: &mut mpsc::Receiver<CycleOutcome>,
        refresh: &mpsc::Sender<()>,
    ) -> Result<()> {
        let mut poll = tokio::time::interval(INPUT_POLL_INTERVAL);

        loop {
            terminal.draw(|f| ui::draw(f, &self.view, &self.status, &self.render, Utc::now()))?;

            let mut messages = Vec::new();
            tokio::select! {
                _ = poll.tick() => {
                    while event::poll(Duration::ZERO)? {
                        if let Event::Key(key) = event::read()? {
                            if key.kind == KeyEventKind::Press {
                                messages.push(Message::Key(key));
                            }
                        }
                    }
                }
                Some(outcome) = outcomes.recv() => messages.push(Message::Synced(outcome)),
            }

            for message in messages {
                match self.update(message) {
                    Effect::None => {}
                    Effect::Quit => return Ok(()),
                    Effect::Refresh => {
                        if refresh.try_send(()).is_ok() {
                            self.status = "Refreshing...".to_string();
                        }
                    }
                    Effect::OpenLink(link) => {
                        if let Err(e) = open::that(&link) {
                            warn!("Failed to open {}: {}", link, e);
                            self.status = format!("Could not open {}: {}", link, e);
                        }
                    }
                }
            }
        }
    }

    /// Apply one message to the state.
    pub fn update(&mut self, message: Message) -> Effect {
        match message {
            Message::Synced(outcome) => {
                self.status = outcome.summary();
                if let Some(articles) = outcome.articles {
                    info!("Publishing {} articles", articles.len());
                    self.view.publish(articles);
                }
                Effect::None
            }
            Message::Key(key) => self.handle_key(key),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Effect {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Effect::Quit,
                KeyCode::Char('r') => Effect::Refresh,
                _ => Effect::None,
            };
        }

        let Some(view_key) = to_view_key(key.code) else {
            return Effect::None;
        };

        match self.view.handle_key(view_key) {
            ViewAction::Open(article) => Effect::OpenLink(article.link),
            ViewAction::None => Effect::None,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn status(&self) -> &str {
        &self.status
    }
}

fn to_view_key(code: KeyCode) -> Option<ViewKey> {
    match code {
        KeyCode::Char(c) => Some(ViewKey::Char(c)),
        KeyCode::Backspace => Some(ViewKey::Backspace),
        KeyCode::Enter => Some(ViewKey::Enter),
        KeyCode::Esc => Some(ViewKey::Esc),
        KeyCode::Up => Some(ViewKey::Up),
        KeyCode::Down => Some(ViewKey::Down),
        _ => None,
    }
}
