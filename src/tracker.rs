use serde::Serialize;
use tracing::info;

use crate::error::{Result, SoloCraftError};
use crate::models::{InsightDebt, Mission, MissionStatus, NewMission, TicketType};
use crate::progress::UserProgress;
use crate::store::Storage;

#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub mission: Mission,
    pub xp_gained: u32,
    pub leveled_up: bool,
    pub level: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub mission: Mission,
    pub effects: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TicketUse {
    Used { debt: InsightDebt, remaining: u32 },
    Exhausted { ticket_type: TicketType },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub active_missions: usize,
    pub completed_missions: usize,
    pub failed_missions: usize,
    pub outstanding_debts: usize,
    pub cleared_debts: usize,
}

/// Owns the user's progress and drives every load, mutate and save cycle
/// against the injected storage.
pub struct Tracker<S: Storage> {
    store: S,
    progress: UserProgress,
}

impl<S: Storage> Tracker<S> {
    pub fn open(store: S) -> Self {
        let progress = store.load_user_progress();
        Self { store, progress }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    /// Restores the weekly allowance when a week has passed. Meant to run once
    /// per start-up. Returns whether a reset happened.
    pub fn refresh_weekly_tickets(&mut self) -> Result<bool> {
        if !self.progress.should_reset_tickets() {
            return Ok(false);
        }
        self.progress.reset_tickets();
        self.store.save_user_progress(&self.progress)?;
        info!("weekly tickets reset");
        Ok(true)
    }

    pub fn create_mission(&mut self, new: NewMission) -> Result<Mission> {
        new.validate()?;
        let mission = Mission::new(new);
        self.store.save_mission(&mission)?;
        info!(id = %mission.id, title = %mission.title, "mission created");
        Ok(mission)
    }

    pub fn complete_mission(&mut self, id: &str) -> Result<Completion> {
        let mut mission = self.store.find_mission(id)?;
        mission.complete()?;

        // Progress is written before the mission
        let leveled_up = self.progress.add_xp(mission.rewards);
        self.store.save_user_progress(&self.progress)?;
        self.store.save_mission(&mission)?;
        info!(id = %mission.id, xp = mission.rewards, leveled_up, "mission completed");

        Ok(Completion {
            xp_gained: mission.rewards,
            leveled_up,
            level: self.progress.level,
            mission,
        })
    }

    pub fn fail_mission(&mut self, id: &str) -> Result<Failure> {
        let mut mission = self.store.find_mission(id)?;
        mission.fail()?;

        let effects = self
            .progress
            .apply_punishment(mission.punishment.as_deref().unwrap_or(""));
        self.store.save_user_progress(&self.progress)?;
        self.store.save_mission(&mission)?;
        info!(id = %mission.id, effects = effects.len(), "mission failed");

        Ok(Failure { mission, effects })
    }

    /// Removes the mission with exactly this id. Unknown ids are not an error.
    pub fn delete_mission(&mut self, id: &str) -> Result<bool> {
        let removed = self.store.delete_mission(id)?;
        if removed {
            info!(id, "mission deleted");
        }
        Ok(removed)
    }

    /// Spends a ticket and opens an insight debt for it. Running out of
    /// tickets is reported, not raised.
    pub fn use_ticket(&mut self, ticket_type: TicketType, purpose: &str) -> Result<TicketUse> {
        if purpose.trim().is_empty() {
            return Err(SoloCraftError::Validation(format!(
                "Say what the {} ticket is for",
                ticket_type.label().to_lowercase()
            )));
        }
        if !self.progress.use_ticket(ticket_type) {
            return Ok(TicketUse::Exhausted { ticket_type });
        }
        self.store.save_user_progress(&self.progress)?;

        let debt = InsightDebt::new(ticket_type, purpose);
        self.store.save_insight_debt(&debt)?;
        info!(id = %debt.id, ticket = ticket_type.label(), "ticket used");

        Ok(TicketUse::Used {
            remaining: self.progress.tickets(ticket_type),
            debt,
        })
    }

    pub fn write_insight(&mut self, debt_id: &str, insight: &str) -> Result<InsightDebt> {
        let mut debt = self.store.find_insight_debt(debt_id)?;
        debt.clear(insight)?;
        self.store.save_insight_debt(&debt)?;
        info!(id = %debt.id, "insight debt cleared");
        Ok(debt)
    }

    pub fn missions(&self, status: Option<MissionStatus>) -> Vec<Mission> {
        match status {
            Some(status) => self.store.missions_with_status(status),
            None => self.store.load_missions(),
        }
    }

    pub fn find_mission(&self, id: &str) -> Result<Mission> {
        self.store.find_mission(id)
    }

    pub fn outstanding_debts(&self) -> Vec<InsightDebt> {
        self.store.active_debts()
    }

    pub fn cleared_debts(&self) -> Vec<InsightDebt> {
        self.store.cleared_debts()
    }

    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        for mission in self.store.load_missions() {
            match mission.status() {
                MissionStatus::Active => stats.active_missions += 1,
                MissionStatus::Completed => stats.completed_missions += 1,
                MissionStatus::Failed => stats.failed_missions += 1,
            }
        }
        for debt in self.store.load_insight_debts() {
            if debt.cleared {
                stats.cleared_debts += 1;
            } else {
                stats.outstanding_debts += 1;
            }
        }
        stats
    }
}
