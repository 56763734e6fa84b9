use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};
use ratatui::Frame;
use shared::{InputMode, ViewState};

/// Colours and column widths for one draw call.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub border: Color,
    pub header: Color,
    pub selected_fg: Color,
    pub selected_bg: Color,
    pub position_width: u16,
    pub source_width: u16,
    pub date_width: u16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            border: Color::Indexed(69),
            header: Color::Indexed(240),
            selected_fg: Color::Indexed(229),
            selected_bg: Color::Indexed(57),
            position_width: 8,
            source_width: 12,
            date_width: 16,
        }
    }
}

/// Draw the prompt, the article table and the status line.
pub fn draw(
    frame: &mut Frame,
    view: &ViewState,
    status: &str,
    config: &RenderConfig,
    now: DateTime<Utc>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(config.border));
    let inner = block.inner(frame.area());
    frame.render_widget(block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    draw_prompt(frame, view, chunks[0]);
    draw_table(frame, view, config, now, chunks[1]);

    let status = Paragraph::new(status.to_string()).style(Style::default().fg(config.header));
    frame.render_widget(status, chunks[2]);
}

fn draw_prompt(frame: &mut Frame, view: &ViewState, area: Rect) {
    let label = match view.mode() {
        InputMode::Jump => "Go to # ",
        InputMode::Search => "Search ",
    };
    let text = view.prompt();
    let cursor_x = area.x + (label.len() + text.chars().count()) as u16;

    let prompt = Paragraph::new(Line::from(vec![
        Span::styled(label, Style::default().add_modifier(Modifier::DIM)),
        Span::raw(text),
    ]));
    frame.render_widget(prompt, area);
    frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(1)), area.y));
}

fn draw_table(
    frame: &mut Frame,
    view: &ViewState,
    config: &RenderConfig,
    now: DateTime<Utc>,
    area: Rect,
) {
    let rows: Vec<Row> = view
        .rows(now)
        .into_iter()
        .map(|row| {
            Row::new(vec![
                row.position.to_string(),
                row.source,
                row.relative_time,
                row.title,
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(config.position_width),
        Constraint::Length(config.source_width),
        Constraint::Length(config.date_width),
        Constraint::Min(10),
    ];

    let header = Row::new(vec!["", "Source", "Date", "Title"])
        .style(Style::default().fg(config.header));

    let table = Table::new(rows, widths).header(header).row_highlight_style(
        Style::default()
            .fg(config.selected_fg)
            .bg(config.selected_bg),
    );

    let mut state = TableState::default().with_selected(Some(view.cursor()));
    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use shared::{Article, ViewKey};

    fn screen(view: &ViewState, status: &str) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 8)).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        terminal
            .draw(|f| draw(f, view, status, &RenderConfig::default(), now))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn view() -> ViewState {
        let mut view = ViewState::new();
        view.publish(vec![
            Article::new(
                "HN",
                "Rust in the kernel",
                Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap(),
                "https://example.com/1",
            ),
            Article::new(
                "Lobsters",
                "SQLite internals",
                Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap(),
                "https://example.com/2",
            ),
        ]);
        view
    }

    #[test]
    fn test_draw_shows_rows_and_status() {
        let text = screen(&view(), "2 articles");

        assert!(text.contains("Rust in the kernel"));
        assert!(text.contains("Lobsters"));
        assert!(text.contains("3 hours ago"));
        assert!(text.contains("2 articles"));
        assert!(text.contains("Go to #"));
    }

    #[test]
    fn test_draw_search_prompt() {
        let mut view = view();
        for c in "/sql".chars() {
            view.handle_key(ViewKey::Char(c));
        }

        let text = screen(&view, "");

        assert!(text.contains("Search /sql"));
        assert!(text.contains("SQLite internals"));
        assert!(!text.contains("Rust in the kernel"));
    }
}
