use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{difficulty_color, format_date, status_color, truncate};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.mission_filter {
        Some(status) => format!(" Missions (filter: {}) ", status.as_str()),
        None => " Missions ".to_string(),
    };

    let items: Vec<ListItem> = app
        .missions
        .items
        .iter()
        .map(|mission| {
            let status = mission.status();

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<34}", truncate(&mission.title, 32)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<10}", mission.difficulty.label()),
                    Style::default().fg(difficulty_color(mission.difficulty)),
                ),
                Span::styled(
                    format!("{:<8}", mission.rewards),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    format!("{:<11}", status.label()),
                    Style::default().fg(status_color(status)),
                ),
                Span::styled(
                    format_date(&mission.created_at),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    let header_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let header = Line::from(vec![
        Span::styled(format!("{:<34}", "Title"), header_style),
        Span::styled(format!("{:<10}", "Difficulty"), header_style),
        Span::styled(format!("{:<8}", "XP"), header_style),
        Span::styled(format!("{:<11}", "Status"), header_style),
        Span::styled("Created", header_style),
    ]);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.missions.selected);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    // Indent the header past the highlight symbol
    let header_area = Rect {
        x: chunks[0].x + 2,
        width: chunks[0].width.saturating_sub(2),
        ..chunks[0]
    };
    f.render_widget(Paragraph::new(header), header_area);
    f.render_stateful_widget(list, chunks[1], &mut state);
}
