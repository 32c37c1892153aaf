use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{difficulty_color, format_timestamp, status_color};
use crate::models::{Mission, MissionStatus};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(mission) = &app.selected_mission else {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Mission Detail ");
        let paragraph = Paragraph::new("No mission selected").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Summary
            Constraint::Min(4),    // Description
            Constraint::Length(6), // Constraints + punishment
        ])
        .split(area);

    draw_summary(f, mission, chunks[0]);
    draw_description(f, mission, chunks[1]);
    draw_terms(f, mission, chunks[2]);
}

fn draw_summary(f: &mut Frame, mission: &Mission, area: Rect) {
    let status = mission.status();
    let finished = match status {
        MissionStatus::Active => None,
        MissionStatus::Completed => mission.completed_at.as_ref(),
        MissionStatus::Failed => mission.failed_at.as_ref(),
    };

    let mut text = vec![
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::Gray)),
            Span::styled(
                status.label(),
                Style::default()
                    .fg(status_color(status))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled("Difficulty: ", Style::default().fg(Color::Gray)),
            Span::styled(
                mission.difficulty.label(),
                Style::default().fg(difficulty_color(mission.difficulty)),
            ),
            Span::raw("  "),
            Span::styled("Reward: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} XP", mission.rewards),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::styled("Created: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format_timestamp(&mission.created_at),
                Style::default().fg(Color::White),
            ),
        ]),
    ];

    if let Some(at) = finished {
        text.push(Line::from(vec![
            Span::styled(
                format!("{}: ", status.label()),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(format_timestamp(at), Style::default().fg(Color::White)),
        ]));
    }

    text.push(Line::from(vec![
        Span::styled("ID: ", Style::default().fg(Color::Gray)),
        Span::styled(mission.id.as_str(), Style::default().fg(Color::DarkGray)),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", mission.title))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_description(f: &mut Frame, mission: &Mission, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Description ")
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(mission.description.as_str())
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_terms(f: &mut Frame, mission: &Mission, area: Rect) {
    let constraints = if mission.constraints.is_empty() {
        "None"
    } else {
        mission.constraints.as_str()
    };
    let punishment = mission.punishment.as_deref().unwrap_or("None");

    let text = vec![
        Line::from(vec![
            Span::styled("Constraints: ", Style::default().fg(Color::Gray)),
            Span::styled(constraints, Style::default().fg(Color::White)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Punishment: ", Style::default().fg(Color::Gray)),
            Span::styled(punishment, Style::default().fg(Color::Red)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Terms ")
        .title_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
