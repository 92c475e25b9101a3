//! Single-pane service table, the dashboard's entire view — this domain
//! has one kind of monitored entity, unlike the teacher's servers/
//! services/alerts tab set.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::domain::ServiceStatus;

use super::super::state::AppState;

pub fn render(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(frame.area());

    render_header(frame, chunks[0]);
    render_table(frame, chunks[1], state);
    render_footer(frame, chunks[2], state);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new("service topology monitor")
        .block(Block::default().borders(Borders::ALL).title("guardian"));
    frame.render_widget(header, area);
}

fn status_style(status: ServiceStatus) -> Style {
    match status {
        ServiceStatus::Alive => Style::default().fg(Color::Green),
        ServiceStatus::Degraded => Style::default().fg(Color::Yellow),
        ServiceStatus::Dead => Style::default().fg(Color::Red),
        ServiceStatus::Checking => Style::default().fg(Color::Cyan),
        ServiceStatus::Unknown => Style::default().fg(Color::DarkGray),
    }
}

fn render_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows: Vec<Row> = state
        .sorted_services()
        .into_iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.service_id.to_string()),
                Cell::from(s.host.clone()),
                Cell::from(Span::styled(s.status.as_str(), status_style(s.status))),
                Cell::from(s.last_checked_at.clone().unwrap_or_else(|| "-".to_string())),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(26),
        ],
    )
    .header(
        Row::new(vec!["id", "host", "status", "last checked"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title("services"));

    frame.render_widget(table, area);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![
        Span::raw("Items: "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" | Refresh: "),
        Span::styled("R", Style::default().fg(Color::Yellow)),
        Span::raw(" | Quit: "),
        Span::styled("Q", Style::default().fg(Color::Yellow)),
        Span::raw(" | "),
    ];

    if state.connected {
        spans.push(Span::styled("● connected", Style::default().fg(Color::Green)));
    } else {
        spans.push(Span::styled("○ disconnected", Style::default().fg(Color::Red)));
    }

    if let Some(err) = &state.error_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(format!("error: {err}"), Style::default().fg(Color::Red)));
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
