use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};

use super::{difficulty_color, truncate};
use crate::progress::{XP_PER_LEVEL, WEEKLY_HELP_TICKETS, WEEKLY_TUTORIAL_TICKETS};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Level gauge
            Constraint::Length(7), // Progress + tickets row
            Constraint::Min(0),    // Active missions + debts
        ])
        .split(area);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);

    draw_level_gauge(f, app, chunks[0]);
    draw_progress(f, app, middle[0]);
    draw_tickets(f, app, middle[1]);
    draw_active_missions(f, app, bottom[0]);
    draw_outstanding_debts(f, app, bottom[1]);
}

fn draw_level_gauge(f: &mut Frame, app: &App, area: Rect) {
    let progress = app.tracker().progress();
    let into_level = progress.xp_into_level();

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Level {} ", progress.level))
                .title_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio(f64::from(into_level) / f64::from(XP_PER_LEVEL))
        .label(format!("{}/{} XP", into_level, XP_PER_LEVEL));

    f.render_widget(gauge, area);
}

fn draw_progress(f: &mut Frame, app: &App, area: Rect) {
    let progress = app.tracker().progress();
    let stats = &app.stats;

    let text = vec![
        Line::from(vec![
            Span::styled("Total XP: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", progress.xp),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Next level in: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} XP", progress.xp_to_next_level()),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(vec![
            Span::styled("Active: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.active_missions),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw("  "),
            Span::styled("Completed: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.completed_missions),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  "),
            Span::styled("Failed: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.failed_missions),
                Style::default().fg(Color::Red),
            ),
        ]),
        Line::from(vec![
            Span::styled("Insights written: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.cleared_debts),
                Style::default().fg(Color::Magenta),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Progress ")
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_tickets(f: &mut Frame, app: &App, area: Rect) {
    let progress = app.tracker().progress();
    let days = progress.days_until_ticket_reset();

    let text = vec![
        Line::from(vec![
            Span::styled("Help: ", Style::default().fg(Color::Gray)),
            Span::styled(
                ticket_bar(progress.help_tickets, WEEKLY_HELP_TICKETS),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!(" {}/{}", progress.help_tickets, WEEKLY_HELP_TICKETS),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Tutorial: ", Style::default().fg(Color::Gray)),
            Span::styled(
                ticket_bar(progress.tutorial_tickets, WEEKLY_TUTORIAL_TICKETS),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!(" {}/{}", progress.tutorial_tickets, WEEKLY_TUTORIAL_TICKETS),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Resets in: ", Style::default().fg(Color::Gray)),
            Span::styled(
                if days == 0 {
                    "next start".to_string()
                } else {
                    format!("{} day(s)", days)
                },
                Style::default().fg(Color::White),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tickets ")
        .title_style(Style::default().fg(Color::Yellow));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_active_missions(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .active_missions
        .iter()
        .map(|mission| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<8}", mission.difficulty.label()),
                    Style::default().fg(difficulty_color(mission.difficulty)),
                ),
                Span::styled(
                    format!("{:<32}", truncate(&mission.title, 30)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("+{} XP", mission.rewards),
                    Style::default().fg(Color::Green),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Active Missions ")
        .title_style(Style::default().fg(Color::Magenta));

    f.render_widget(List::new(items).block(block), area);
}

fn draw_outstanding_debts(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .debts
        .items
        .iter()
        .filter(|debt| !debt.cleared)
        .map(|debt| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<10}", debt.ticket_type.label()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(truncate(&debt.used_for, 24), Style::default().fg(Color::White)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Insight Debts ")
        .title_style(Style::default().fg(Color::Red));

    f.render_widget(List::new(items).block(block), area);
}

fn ticket_bar(remaining: u32, allowance: u32) -> String {
    let used = allowance.saturating_sub(remaining) as usize;
    format!("{}{}", "█".repeat(remaining as usize), "░".repeat(used))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_bar_shows_remaining_and_used() {
        assert_eq!(ticket_bar(2, 3), "██░");
        assert_eq!(ticket_bar(0, 2), "░░");
    }
}
