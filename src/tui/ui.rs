use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::widgets::{dashboard, insight_detail, insights, mission_detail, missions};
use super::{App, PromptKind, View};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_status_line(f, app, chunks[2]);
    draw_help_bar(f, app, chunks[3]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tab_titles = vec!["Dashboard", "Missions", "Insights"];
    let selected = match app.view {
        View::Dashboard => 0,
        View::Missions | View::MissionDetail => 1,
        View::Insights | View::InsightDetail => 2,
    };

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" SoloCraft "))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Dashboard => dashboard::draw(f, app, area),
        View::Missions => missions::draw(f, app, area),
        View::MissionDetail => mission_detail::draw(f, app, area),
        View::Insights => insights::draw(f, app, area),
        View::InsightDetail => insight_detail::draw(f, app, area),
    }
}

fn draw_status_line(f: &mut Frame, app: &App, area: Rect) {
    let line = match (&app.prompt, &app.message) {
        (Some(prompt), _) => {
            let mut spans = vec![Span::styled(
                format!("{} ", prompt.label()),
                Style::default().fg(Color::Yellow),
            )];
            if !matches!(prompt.kind, PromptKind::ConfirmDelete { .. }) {
                spans.push(Span::raw(prompt.input.as_str()));
                spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
            }
            Line::from(spans)
        }
        (None, Some(message)) => Line::from(Span::styled(
            message.text.as_str(),
            Style::default().fg(if message.is_error {
                Color::Red
            } else {
                Color::Green
            }),
        )),
        (None, None) => Line::from(""),
    };

    f.render_widget(Paragraph::new(line), area);
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = match &app.prompt {
        Some(prompt) if matches!(prompt.kind, PromptKind::ConfirmDelete { .. }) => vec![
            Span::styled("y", Style::default().fg(Color::Cyan)),
            Span::raw(" Delete  "),
            Span::styled("any", Style::default().fg(Color::Cyan)),
            Span::raw(" Cancel"),
        ],
        Some(_) => vec![
            Span::styled("<CR>", Style::default().fg(Color::Cyan)),
            Span::raw(" Submit  "),
            Span::styled("<Esc>", Style::default().fg(Color::Cyan)),
            Span::raw(" Cancel"),
        ],
        None => {
            let mut spans = vec![
                Span::styled("h/l", Style::default().fg(Color::Cyan)),
                Span::raw(" Views  "),
            ];

            match app.view {
                View::Dashboard => {
                    spans.extend(vec![
                        Span::styled("H/T", Style::default().fg(Color::Cyan)),
                        Span::raw(" Ticket  "),
                        Span::styled("^r", Style::default().fg(Color::Cyan)),
                        Span::raw(" Refresh  "),
                    ]);
                }
                View::Missions => {
                    spans.extend(vec![
                        Span::styled("j/k", Style::default().fg(Color::Cyan)),
                        Span::raw(" Nav  "),
                        Span::styled("l/<CR>", Style::default().fg(Color::Cyan)),
                        Span::raw(" Open  "),
                        Span::styled("c", Style::default().fg(Color::Cyan)),
                        Span::raw(" Complete  "),
                        Span::styled("x", Style::default().fg(Color::Cyan)),
                        Span::raw(" Fail  "),
                        Span::styled("d", Style::default().fg(Color::Cyan)),
                        Span::raw(" Delete  "),
                        Span::styled("/", Style::default().fg(Color::Cyan)),
                        Span::raw(" Filter  "),
                    ]);
                }
                View::MissionDetail => {
                    spans.extend(vec![
                        Span::styled("h/<Esc>", Style::default().fg(Color::Cyan)),
                        Span::raw(" Back  "),
                    ]);
                    if app.selected_mission.as_ref().is_some_and(|m| m.is_active()) {
                        spans.extend(vec![
                            Span::styled("c", Style::default().fg(Color::Cyan)),
                            Span::raw(" Complete  "),
                            Span::styled("x", Style::default().fg(Color::Cyan)),
                            Span::raw(" Fail  "),
                        ]);
                    }
                    spans.extend(vec![
                        Span::styled("d", Style::default().fg(Color::Cyan)),
                        Span::raw(" Delete  "),
                    ]);
                }
                View::Insights => {
                    spans.extend(vec![
                        Span::styled("j/k", Style::default().fg(Color::Cyan)),
                        Span::raw(" Nav  "),
                        Span::styled("l/<CR>", Style::default().fg(Color::Cyan)),
                        Span::raw(" Open  "),
                        Span::styled("w", Style::default().fg(Color::Cyan)),
                        Span::raw(" Write insight  "),
                        Span::styled("H/T", Style::default().fg(Color::Cyan)),
                        Span::raw(" Ticket  "),
                    ]);
                }
                View::InsightDetail => {
                    spans.extend(vec![
                        Span::styled("h/<Esc>", Style::default().fg(Color::Cyan)),
                        Span::raw(" Back  "),
                        Span::styled("w", Style::default().fg(Color::Cyan)),
                        Span::raw(" Write insight  "),
                    ]);
                }
            }

            spans.extend(vec![
                Span::styled("q", Style::default().fg(Color::Cyan)),
                Span::raw(" Quit"),
            ]);

            spans
        }
    };

    let help = Paragraph::new(Line::from(help_text)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
