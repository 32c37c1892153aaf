use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{format_date, truncate};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .debts
        .items
        .iter()
        .map(|debt| {
            let (state_text, state_color) = if debt.cleared {
                ("Cleared", Color::Green)
            } else {
                ("Owed", Color::Red)
            };
            let date = debt.cleared_at.as_ref().unwrap_or(&debt.created_at);

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<10}", debt.ticket_type.label()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{:<40}", truncate(&debt.used_for, 38)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<9}", state_text),
                    Style::default().fg(state_color),
                ),
                Span::styled(format_date(date), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let title = format!(
        " Insight Debts ({} owed, {} cleared) ",
        app.stats.outstanding_debts, app.stats.cleared_debts
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    let header_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let header = Line::from(vec![
        Span::styled(format!("{:<10}", "Ticket"), header_style),
        Span::styled(format!("{:<40}", "Used for"), header_style),
        Span::styled(format!("{:<9}", "State"), header_style),
        Span::styled("Date", header_style),
    ]);

    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.debts.items.is_empty() {
        f.render_widget(
            Paragraph::new("No insight debts. Press H or T to use a ticket.")
                .style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.debts.selected);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let header_area = Rect {
        x: chunks[0].x + 2,
        width: chunks[0].width.saturating_sub(2),
        ..chunks[0]
    };
    f.render_widget(Paragraph::new(header), header_area);
    f.render_stateful_widget(list, chunks[1], &mut state);
}
