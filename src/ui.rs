//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a scrollable list of published lines on top, a one-line
//!   status bar below it, and an input line that only appears after `a`.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let input_height = if app.input.is_some() { 1 } else { 0 };
    let [main_area, status_area, input_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(input_height),
    ])
    .areas(frame.area());

    draw_published(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
    if let Some(text) = &app.input {
        draw_input(text, frame, input_area);
    }
}

/// Render the scrollable list of published lines.
fn draw_published(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .lines
        .iter()
        .map(|published| {
            let line = Line::from(vec![
                Span::styled(
                    published.at.format("%H:%M:%S").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("[{}]", published.destination),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(" "),
                Span::styled(&published.text, Style::default().fg(Color::White)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(list_items)
        .block(Block::default().title(" Commits ").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} feeds, {} lines", app.feeds, app.lines.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  Home/End: jump  a: add repo"),
    ]));
    frame.render_widget(status, area);
}

/// Render the link input line.
fn draw_input(text: &str, frame: &mut Frame, area: Rect) {
    let input = Paragraph::new(Line::from(vec![
        Span::styled(" add> ", Style::default().fg(Color::Cyan)),
        Span::raw(text),
        Span::styled("█", Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(input, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Destination;
    use crate::sink::NotificationSink;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(app: &mut App) -> String {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    #[test]
    fn draw_does_not_panic_with_no_lines() {
        let mut app = App::new();
        screen_text(&mut app);
    }

    #[test]
    fn draw_shows_published_lines_with_destination() {
        let mut app = App::new();
        app.publish(&Destination::new("freenode", "#parrot"), "gil: review: http://x");

        let text = screen_text(&mut app);
        assert!(text.contains("[freenode/#parrot]"));
        assert!(text.contains("gil: review: http://x"));
    }

    #[test]
    fn draw_status_shows_counts() {
        let mut app = App::new();
        app.feeds = 2;
        app.publish(&Destination::new("local", "#commits"), "one");
        app.status = "OK".to_string();

        let text = screen_text(&mut app);
        assert!(text.contains("2 feeds, 1 lines"), "status bar should show counts");
    }

    #[test]
    fn input_line_appears_only_in_input_mode() {
        let mut app = App::new();
        assert!(!screen_text(&mut app).contains("add>"));

        app.begin_input();
        app.input.as_mut().unwrap().push_str("http://github.com/a/b");
        let text = screen_text(&mut app);
        assert!(text.contains("add> http://github.com/a/b"));
    }
}
