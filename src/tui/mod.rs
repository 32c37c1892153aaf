mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::error::Result as TrackerResult;
use crate::models::{InsightDebt, Mission, MissionStatus, TicketType};
use crate::store::JsonStore;
use crate::tracker::{Stats, TicketUse, Tracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Missions,
    MissionDetail,
    Insights,
    InsightDetail,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Dashboard => View::Missions,
            View::Missions => View::Insights,
            View::MissionDetail => View::Missions,
            View::Insights => View::Dashboard,
            View::InsightDetail => View::Insights,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Dashboard => View::Insights,
            View::Missions => View::Dashboard,
            View::MissionDetail => View::Missions,
            View::Insights => View::Missions,
            View::InsightDetail => View::Insights,
        }
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    // Keeps the cursor near where it was after a reload
    fn replace_items(&mut self, items: Vec<T>) {
        self.selected = match (self.selected, items.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.items = items;
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    fn first(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(0);
        }
    }

    fn last(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(self.items.len() - 1);
        }
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    TicketPurpose(TicketType),
    Insight { debt_id: String },
    ConfirmDelete { mission_id: String, title: String },
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn label(&self) -> String {
        match &self.kind {
            PromptKind::TicketPurpose(TicketType::Help) => "What do you need help with?".into(),
            PromptKind::TicketPurpose(TicketType::Tutorial) => "What tutorial do you need?".into(),
            PromptKind::Insight { .. } => "Insight".into(),
            PromptKind::ConfirmDelete { title, .. } => format!("Delete '{}'? (y/n)", title),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    tracker: Tracker<JsonStore>,
    pub view: View,
    pub missions: StatefulList<Mission>,
    pub active_missions: Vec<Mission>,
    pub debts: StatefulList<InsightDebt>,
    pub selected_mission: Option<Mission>,
    pub selected_debt: Option<InsightDebt>,
    pub stats: Stats,
    pub mission_filter: Option<MissionStatus>,
    pub prompt: Option<Prompt>,
    pub message: Option<Message>,
    pub should_quit: bool,
}

impl App {
    pub fn new(tracker: Tracker<JsonStore>) -> Self {
        let missions = StatefulList::with_items(tracker.missions(None));
        let active_missions = tracker.missions(Some(MissionStatus::Active));
        let debts = StatefulList::with_items(debts_for_display(&tracker));
        let stats = tracker.stats();

        Self {
            tracker,
            view: View::Dashboard,
            missions,
            active_missions,
            debts,
            selected_mission: None,
            selected_debt: None,
            stats,
            mission_filter: None,
            prompt: None,
            message: None,
            should_quit: false,
        }
    }

    pub fn tracker(&self) -> &Tracker<JsonStore> {
        &self.tracker
    }

    pub fn refresh_data(&mut self) {
        self.stats = self.tracker.stats();
        self.active_missions = self.tracker.missions(Some(MissionStatus::Active));
        self.missions
            .replace_items(self.tracker.missions(self.mission_filter));
        self.debts.replace_items(debts_for_display(&self.tracker));
    }

    fn cycle_filter(&mut self) {
        self.mission_filter = match self.mission_filter {
            None => Some(MissionStatus::Active),
            Some(MissionStatus::Active) => Some(MissionStatus::Completed),
            Some(MissionStatus::Completed) => Some(MissionStatus::Failed),
            Some(MissionStatus::Failed) => None,
        };
        self.missions =
            StatefulList::with_items(self.tracker.missions(self.mission_filter));
    }

    fn info(&mut self, text: impl Into<String>) {
        self.message = Some(Message {
            text: text.into(),
            is_error: false,
        });
    }

    // Domain errors are shown in the status line rather than ending the session
    fn report<T>(&mut self, result: TrackerResult<T>, describe: impl FnOnce(T) -> String) {
        match result {
            Ok(value) => {
                let text = describe(value);
                self.info(text);
            }
            Err(e) => {
                self.message = Some(Message {
                    text: e.to_string(),
                    is_error: true,
                });
            }
        }
        self.refresh_data();
    }

    fn current_mission_id(&self) -> Option<String> {
        match self.view {
            View::MissionDetail => self.selected_mission.as_ref().map(|m| m.id.clone()),
            _ => self.missions.selected_item().map(|m| m.id.clone()),
        }
    }

    fn complete_selected(&mut self) {
        let Some(id) = self.current_mission_id() else {
            return;
        };
        let result = self.tracker.complete_mission(&id);
        self.report(result, |c| {
            let mut text = format!(
                "Mission '{}' completed! You earned {} XP.",
                c.mission.title, c.xp_gained
            );
            if c.leveled_up {
                text.push_str(&format!(" You leveled up to Level {}!", c.level));
            }
            text
        });
        self.sync_selected_mission(&id);
    }

    fn fail_selected(&mut self) {
        let Some(id) = self.current_mission_id() else {
            return;
        };
        let result = self.tracker.fail_mission(&id);
        self.report(result, |f| {
            if f.effects.is_empty() {
                format!("Mission '{}' failed. No punishment applied.", f.mission.title)
            } else {
                format!(
                    "Mission '{}' failed. {}",
                    f.mission.title,
                    f.effects.join("; ")
                )
            }
        });
        self.sync_selected_mission(&id);
    }

    fn sync_selected_mission(&mut self, id: &str) {
        if self.selected_mission.is_some() {
            self.selected_mission = self.tracker.find_mission(id).ok();
        }
    }

    fn request_delete(&mut self) {
        let target = match self.view {
            View::MissionDetail => self.selected_mission.as_ref(),
            _ => self.missions.selected_item(),
        };
        if let Some(m) = target {
            self.prompt = Some(Prompt {
                kind: PromptKind::ConfirmDelete {
                    mission_id: m.id.clone(),
                    title: m.title.clone(),
                },
                input: String::new(),
            });
        }
    }

    fn request_insight(&mut self) {
        let target = match self.view {
            View::InsightDetail => self.selected_debt.as_ref(),
            _ => self.debts.selected_item(),
        }
        .map(|debt| (debt.id.clone(), debt.cleared));

        match target {
            Some((debt_id, false)) => {
                self.prompt = Some(Prompt {
                    kind: PromptKind::Insight { debt_id },
                    input: String::new(),
                });
            }
            Some((_, true)) => self.info("That debt is already cleared."),
            None => self.info("You have no outstanding insight debts!"),
        }
    }

    fn request_ticket(&mut self, ticket_type: TicketType) {
        if self.tracker.progress().tickets(ticket_type) == 0 {
            self.info(format!(
                "You have no {} tickets remaining.",
                ticket_type.label().to_lowercase()
            ));
            return;
        }
        self.prompt = Some(Prompt {
            kind: PromptKind::TicketPurpose(ticket_type),
            input: String::new(),
        });
    }

    fn submit_prompt(&mut self, prompt: Prompt) {
        match prompt.kind {
            PromptKind::TicketPurpose(ticket_type) => {
                let result = self.tracker.use_ticket(ticket_type, &prompt.input);
                self.report(result, |outcome| match outcome {
                    TicketUse::Used { remaining, .. } => format!(
                        "{} ticket used! {} left. You now have an insight debt to clear.",
                        ticket_type.label(),
                        remaining
                    ),
                    TicketUse::Exhausted { ticket_type } => format!(
                        "You have no {} tickets remaining.",
                        ticket_type.label().to_lowercase()
                    ),
                });
            }
            PromptKind::Insight { debt_id } => {
                let result = self.tracker.write_insight(&debt_id, &prompt.input);
                let cleared = result.as_ref().ok().cloned();
                self.report(result, |_| {
                    "Your insight has been recorded and the debt cleared!".to_string()
                });
                if cleared.is_some() && self.selected_debt.is_some() {
                    self.selected_debt = cleared;
                }
            }
            PromptKind::ConfirmDelete { mission_id, title } => {
                let result = self.tracker.delete_mission(&mission_id);
                self.report(result, |_| format!("Mission '{}' deleted.", title));
                if self.view == View::MissionDetail {
                    self.view = View::Missions;
                    self.selected_mission = None;
                }
            }
        }
    }

    fn handle_prompt_key(&mut self, key: KeyCode) {
        let Some(mut prompt) = self.prompt.take() else {
            return;
        };

        if let PromptKind::ConfirmDelete { .. } = prompt.kind {
            if let KeyCode::Char('y') | KeyCode::Char('Y') = key {
                self.submit_prompt(prompt);
            }
            return;
        }

        match key {
            KeyCode::Esc => {}
            KeyCode::Enter => self.submit_prompt(prompt),
            KeyCode::Backspace => {
                prompt.input.pop();
                self.prompt = Some(prompt);
            }
            KeyCode::Char(c) => {
                prompt.input.push(c);
                self.prompt = Some(prompt);
            }
            _ => self.prompt = Some(prompt),
        }
    }

    fn open_selected(&mut self) {
        match self.view {
            View::Missions => {
                if let Some(m) = self.missions.selected_item() {
                    self.selected_mission = Some(m.clone());
                    self.view = View::MissionDetail;
                }
            }
            View::Insights => {
                if let Some(d) = self.debts.selected_item() {
                    self.selected_debt = Some(d.clone());
                    self.view = View::InsightDetail;
                }
            }
            _ => self.view = self.view.next(),
        }
    }

    fn close_detail(&mut self) -> bool {
        match self.view {
            View::MissionDetail => {
                self.view = View::Missions;
                self.selected_mission = None;
                true
            }
            View::InsightDetail => {
                self.view = View::Insights;
                self.selected_debt = None;
                true
            }
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data();
                self.message = None;
            }

            KeyCode::Esc => {
                if !self.close_detail() {
                    self.message = None;
                }
            }

            // Navigation between views: h/l (left/right like vim)
            KeyCode::Char('h') | KeyCode::Left => {
                if !self.close_detail() {
                    self.view = self.view.prev();
                }
            }
            KeyCode::Char('l') | KeyCode::Right => self.open_selected(),

            KeyCode::Tab => {
                if modifiers.contains(KeyModifiers::SHIFT) {
                    self.view = self.view.prev();
                } else {
                    self.view = self.view.next();
                }
            }
            KeyCode::BackTab => self.view = self.view.prev(),

            KeyCode::Char('j') | KeyCode::Down => match self.view {
                View::Missions => self.missions.next(),
                View::Insights => self.debts.next(),
                _ => {}
            },
            KeyCode::Char('k') | KeyCode::Up => match self.view {
                View::Missions => self.missions.previous(),
                View::Insights => self.debts.previous(),
                _ => {}
            },
            KeyCode::Char('g') => match self.view {
                View::Missions => self.missions.first(),
                View::Insights => self.debts.first(),
                _ => {}
            },
            KeyCode::Char('G') => match self.view {
                View::Missions => self.missions.last(),
                View::Insights => self.debts.last(),
                _ => {}
            },

            KeyCode::Enter => match self.view {
                View::Missions | View::Insights => self.open_selected(),
                _ => {}
            },

            // Mission actions
            KeyCode::Char('/') if self.view == View::Missions => self.cycle_filter(),
            KeyCode::Char('c') if is_mission_view(self.view) => self.complete_selected(),
            KeyCode::Char('x') if is_mission_view(self.view) => self.fail_selected(),
            KeyCode::Char('d') if is_mission_view(self.view) => self.request_delete(),

            // Ticket and insight actions
            KeyCode::Char('H') => self.request_ticket(TicketType::Help),
            KeyCode::Char('T') => self.request_ticket(TicketType::Tutorial),
            KeyCode::Char('w') if is_insight_view(self.view) => self.request_insight(),

            _ => {}
        }
    }
}

fn is_mission_view(view: View) -> bool {
    matches!(view, View::Missions | View::MissionDetail)
}

fn is_insight_view(view: View) -> bool {
    matches!(view, View::Insights | View::InsightDetail)
}

// Outstanding debts first, then recorded insights
fn debts_for_display(tracker: &Tracker<JsonStore>) -> Vec<InsightDebt> {
    let mut debts = tracker.outstanding_debts();
    debts.extend(tracker.cleared_debts());
    debts
}

pub fn run(tracker: Tracker<JsonStore>) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(tracker);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, NewMission};
    use tempfile::TempDir;

    fn setup_app() -> (TempDir, App) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonStore::open(dir.path()).expect("Failed to open store");
        let mut tracker = Tracker::open(store);
        for (title, punishment) in [("First", Some("lose 5 xp")), ("Second", None)] {
            tracker
                .create_mission(NewMission {
                    title: title.to_string(),
                    description: "desc".to_string(),
                    difficulty: Difficulty::Easy,
                    constraints: String::new(),
                    rewards: 120,
                    punishment: punishment.map(str::to_string),
                })
                .unwrap();
        }
        (dir, App::new(tracker))
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    mod stateful_list_tests {
        use super::*;

        #[test]
        fn next_wraps_around() {
            let mut list = StatefulList::with_items(vec![1, 2, 3]);
            list.next();
            list.next();
            assert_eq!(list.selected, Some(2));
            list.next();
            assert_eq!(list.selected, Some(0));
        }

        #[test]
        fn previous_wraps_around() {
            let mut list = StatefulList::with_items(vec![1, 2, 3]);
            list.previous();
            assert_eq!(list.selected, Some(2));
        }

        #[test]
        fn empty_list_has_no_selection() {
            let mut list: StatefulList<i32> = StatefulList::with_items(vec![]);
            list.next();
            list.last();
            assert!(list.selected.is_none());
            assert!(list.selected_item().is_none());
        }

        #[test]
        fn replace_items_clamps_selection() {
            let mut list = StatefulList::with_items(vec![1, 2, 3]);
            list.last();
            list.replace_items(vec![1]);
            assert_eq!(list.selected, Some(0));
            list.replace_items(vec![]);
            assert!(list.selected.is_none());
        }
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn view_cycle_round_trips() {
            let (_dir, mut app) = setup_app();
            assert_eq!(app.view, View::Dashboard);
            press(&mut app, KeyCode::Tab);
            assert_eq!(app.view, View::Missions);
            press(&mut app, KeyCode::Tab);
            assert_eq!(app.view, View::Insights);
            press(&mut app, KeyCode::Tab);
            assert_eq!(app.view, View::Dashboard);
        }

        #[test]
        fn enter_opens_and_h_closes_mission_detail() {
            let (_dir, mut app) = setup_app();
            app.view = View::Missions;
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.view, View::MissionDetail);
            assert!(app.selected_mission.is_some());

            press(&mut app, KeyCode::Char('h'));
            assert_eq!(app.view, View::Missions);
            assert!(app.selected_mission.is_none());
        }

        #[test]
        fn slash_cycles_status_filter() {
            let (_dir, mut app) = setup_app();
            app.view = View::Missions;
            press(&mut app, KeyCode::Char('/'));
            assert_eq!(app.mission_filter, Some(MissionStatus::Active));
            assert_eq!(app.missions.items.len(), 2);
            press(&mut app, KeyCode::Char('/'));
            assert_eq!(app.mission_filter, Some(MissionStatus::Completed));
            assert!(app.missions.items.is_empty());
        }

        #[test]
        fn q_quits() {
            let (_dir, mut app) = setup_app();
            press(&mut app, KeyCode::Char('q'));
            assert!(app.should_quit);
        }
    }

    mod action_tests {
        use super::*;

        #[test]
        fn complete_reports_level_up() {
            let (_dir, mut app) = setup_app();
            app.view = View::Missions;
            press(&mut app, KeyCode::Char('c'));

            let message = app.message.clone().expect("message");
            assert!(!message.is_error);
            assert!(message.text.contains("Level 2"));
            assert_eq!(app.tracker().progress().xp, 120);
            assert_eq!(app.stats.completed_missions, 1);
        }

        #[test]
        fn completing_twice_shows_error() {
            let (_dir, mut app) = setup_app();
            app.view = View::Missions;
            press(&mut app, KeyCode::Char('c'));
            press(&mut app, KeyCode::Char('c'));
            assert!(app.message.as_ref().map(|m| m.is_error).unwrap_or(false));
            assert_eq!(app.tracker().progress().xp, 120);
        }

        #[test]
        fn fail_reports_effects() {
            let (_dir, mut app) = setup_app();
            app.view = View::Missions;
            press(&mut app, KeyCode::Char('x'));
            let message = app.message.clone().expect("message");
            assert!(message.text.contains("Lost 0 XP"));
            assert_eq!(app.stats.failed_missions, 1);
        }

        #[test]
        fn delete_requires_confirmation() {
            let (_dir, mut app) = setup_app();
            app.view = View::Missions;

            press(&mut app, KeyCode::Char('d'));
            assert!(app.prompt.is_some());
            press(&mut app, KeyCode::Char('n'));
            assert!(app.prompt.is_none());
            assert_eq!(app.missions.items.len(), 2);

            press(&mut app, KeyCode::Char('d'));
            press(&mut app, KeyCode::Char('y'));
            assert_eq!(app.missions.items.len(), 1);
        }

        #[test]
        fn ticket_then_insight_flow() {
            let (_dir, mut app) = setup_app();
            app.view = View::Insights;

            press(&mut app, KeyCode::Char('H'));
            type_text(&mut app, "closures");
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.tracker().progress().help_tickets, 2);
            assert_eq!(app.debts.items.len(), 1);
            assert!(!app.debts.items[0].cleared);

            press(&mut app, KeyCode::Char('w'));
            type_text(&mut app, "Closures capture by the least needed mode");
            press(&mut app, KeyCode::Enter);
            assert!(app.debts.items[0].cleared);
            assert_eq!(app.stats.cleared_debts, 1);
        }

        #[test]
        fn escape_cancels_prompt_without_side_effects() {
            let (_dir, mut app) = setup_app();
            press(&mut app, KeyCode::Char('T'));
            type_text(&mut app, "macros");
            press(&mut app, KeyCode::Esc);
            assert!(app.prompt.is_none());
            assert_eq!(app.tracker().progress().tutorial_tickets, 2);
        }

        #[test]
        fn empty_ticket_purpose_shows_validation_error() {
            let (_dir, mut app) = setup_app();
            press(&mut app, KeyCode::Char('H'));
            press(&mut app, KeyCode::Enter);
            assert!(app.message.as_ref().map(|m| m.is_error).unwrap_or(false));
            assert_eq!(app.tracker().progress().help_tickets, 3);
        }
    }
}
