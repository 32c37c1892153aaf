use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::format_timestamp;
use crate::models::InsightDebt;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(debt) = &app.selected_debt else {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Insight ");
        let paragraph = Paragraph::new("No insight selected").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Header info
            Constraint::Min(0),    // Insight text
        ])
        .split(area);

    draw_header(f, debt, chunks[0]);
    draw_entry(f, debt, chunks[1]);
}

fn draw_header(f: &mut Frame, debt: &InsightDebt, area: Rect) {
    let mut text = vec![
        Line::from(vec![
            Span::styled("Ticket: ", Style::default().fg(Color::Gray)),
            Span::styled(debt.ticket_type.label(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Used: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format_timestamp(&debt.created_at),
                Style::default().fg(Color::White),
            ),
        ]),
    ];

    match &debt.cleared_at {
        Some(at) => text.push(Line::from(vec![
            Span::styled("Cleared: ", Style::default().fg(Color::Gray)),
            Span::styled(format_timestamp(at), Style::default().fg(Color::Green)),
        ])),
        None => text.push(Line::from(Span::styled(
            "Outstanding: write what you learned to clear it",
            Style::default().fg(Color::Red),
        ))),
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", debt.used_for))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_entry(f: &mut Frame, debt: &InsightDebt, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Insight ")
        .title_style(Style::default().fg(Color::Magenta));

    let paragraph = match &debt.insight_entry {
        Some(entry) => Paragraph::new(entry.as_str()),
        None => Paragraph::new("Press w to write your insight.")
            .style(Style::default().fg(Color::DarkGray)),
    };

    f.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);
}
