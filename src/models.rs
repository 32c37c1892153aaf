use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SoloCraftError};

// Timestamps are naive local time, matching the files the desktop tool wrote
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Anything persisted in a collection keyed by an opaque string id.
pub trait Record {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" | "e" | "1" => Some(Difficulty::Easy),
            "medium" | "m" | "2" => Some(Difficulty::Medium),
            "hard" | "h" | "3" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketType {
    Help,
    Tutorial,
}

impl TicketType {
    pub fn label(&self) -> &'static str {
        match self {
            TicketType::Help => "Help",
            TicketType::Tutorial => "Tutorial",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "help" | "h" => Some(TicketType::Help),
            "tutorial" | "tut" | "t" => Some(TicketType::Tutorial),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionStatus {
    Active,
    Completed,
    Failed,
}

impl MissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Active => "active",
            MissionStatus::Completed => "completed",
            MissionStatus::Failed => "failed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MissionStatus::Active => "Active",
            MissionStatus::Completed => "Completed",
            MissionStatus::Failed => "Failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" | "a" | "open" => Some(MissionStatus::Active),
            "completed" | "complete" | "done" | "c" => Some(MissionStatus::Completed),
            "failed" | "fail" | "f" => Some(MissionStatus::Failed),
            _ => None,
        }
    }
}

// User input for a mission that does not exist yet
#[derive(Debug, Clone)]
pub struct NewMission {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub constraints: String,
    pub rewards: u32,
    pub punishment: Option<String>,
}

impl NewMission {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err(SoloCraftError::Validation(
                "Mission title and description are required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub constraints: String,
    pub rewards: u32,
    #[serde(default)]
    pub punishment: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub failed_at: Option<NaiveDateTime>,
}

impl Mission {
    pub fn new(new: NewMission) -> Self {
        // Blank punishment text is stored as absent
        let punishment = new
            .punishment
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Self {
            id: new_id(),
            title: new.title.trim().to_string(),
            description: new.description.trim().to_string(),
            difficulty: new.difficulty,
            constraints: new.constraints.trim().to_string(),
            rewards: new.rewards,
            punishment,
            created_at: now(),
            completed: false,
            completed_at: None,
            failed: false,
            failed_at: None,
        }
    }

    pub fn status(&self) -> MissionStatus {
        if self.completed {
            MissionStatus::Completed
        } else if self.failed {
            MissionStatus::Failed
        } else {
            MissionStatus::Active
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == MissionStatus::Active
    }

    fn ensure_active(&self) -> Result<()> {
        match self.status() {
            MissionStatus::Active => Ok(()),
            status => Err(SoloCraftError::InvalidState(format!(
                "Mission '{}' is already {}",
                self.title,
                status.as_str()
            ))),
        }
    }

    /// Marks the mission completed. The caller awards `rewards` as XP.
    pub fn complete(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.completed = true;
        self.completed_at = Some(now());
        Ok(())
    }

    /// Marks the mission failed. The caller applies `punishment`.
    pub fn fail(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.failed = true;
        self.failed_at = Some(now());
        Ok(())
    }
}

impl Record for Mission {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightDebt {
    pub id: String,
    pub ticket_type: TicketType,
    pub used_for: String,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub cleared: bool,
    #[serde(default)]
    pub insight_entry: Option<String>,
    #[serde(default)]
    pub cleared_at: Option<NaiveDateTime>,
}

impl InsightDebt {
    pub fn new(ticket_type: TicketType, used_for: &str) -> Self {
        Self {
            id: new_id(),
            ticket_type,
            used_for: used_for.trim().to_string(),
            created_at: now(),
            cleared: false,
            insight_entry: None,
            cleared_at: None,
        }
    }

    /// Records the insight that pays the debt off. A debt clears once.
    pub fn clear(&mut self, insight_entry: &str) -> Result<()> {
        let entry = insight_entry.trim();
        if entry.is_empty() {
            return Err(SoloCraftError::Validation(
                "Please write your insight before saving".to_string(),
            ));
        }
        if self.cleared {
            return Err(SoloCraftError::InvalidState(format!(
                "{} ticket debt for '{}' is already cleared",
                self.ticket_type.label(),
                self.used_for
            )));
        }

        self.cleared = true;
        self.insight_entry = Some(entry.to_string());
        self.cleared_at = Some(now());
        Ok(())
    }
}

impl Record for InsightDebt {
    fn id(&self) -> &str {
        &self.id
    }
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
