use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{now, TicketType};

pub const XP_PER_LEVEL: u32 = 100;
pub const WEEKLY_HELP_TICKETS: u32 = 3;
pub const WEEKLY_TUTORIAL_TICKETS: u32 = 2;
pub const TICKET_RESET_DAYS: i64 = 7;

// Applied when the punishment text names neither XP nor tickets
const DEFAULT_XP_PENALTY: u32 = 5;
// Applied when the text mentions XP without an amount
const UNSPECIFIED_XP_PENALTY: u32 = 10;

// Amount written right before "xp", e.g. "lose 15 xp" -> 15
static XP_AMOUNT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(\d+)\s*xp").ok());

pub fn level_for_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// The single progress record: XP, level and the weekly ticket allowance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProgress {
    pub xp: u32,
    pub help_tickets: u32,
    pub tutorial_tickets: u32,
    pub last_ticket_reset: NaiveDateTime,
    pub level: u32,
    pub badges: Vec<String>,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            xp: 0,
            help_tickets: WEEKLY_HELP_TICKETS,
            tutorial_tickets: WEEKLY_TUTORIAL_TICKETS,
            last_ticket_reset: now(),
            level: 1,
            badges: Vec::new(),
        }
    }
}

impl UserProgress {
    /// Adds XP and returns true when the level went up. Never lowers the level.
    pub fn add_xp(&mut self, amount: u32) -> bool {
        self.xp = self.xp.saturating_add(amount);
        let new_level = level_for_xp(self.xp);
        if new_level > self.level {
            self.level = new_level;
            return true;
        }
        false
    }

    /// Applies free-form punishment text and returns a description of each
    /// effect in the order it was applied.
    ///
    /// The XP rule and the ticket rule fire independently. Non-empty text that
    /// triggers neither costs a flat default penalty, while empty text is a
    /// no-op.
    pub fn apply_punishment(&mut self, punishment: &str) -> Vec<String> {
        let mut effects = Vec::new();
        if punishment.is_empty() {
            return effects;
        }

        let text = punishment.to_lowercase();

        if text.contains("xp") || text.contains("experience") {
            let amount = requested_xp(&text).unwrap_or(UNSPECIFIED_XP_PENALTY);
            let (lost, dropped_to) = self.lose_xp(amount);
            effects.push(match dropped_to {
                Some(level) => format!("Lost {} XP and dropped to Level {}", lost, level),
                None => format!("Lost {} XP", lost),
            });
        }

        if text.contains("ticket") {
            let mut lost_any = false;
            if text.contains("help") && self.use_help_ticket() {
                effects.push(ticket_effect(TicketType::Help));
                lost_any = true;
            }
            if text.contains("tutorial") && self.use_tutorial_ticket() {
                effects.push(ticket_effect(TicketType::Tutorial));
                lost_any = true;
            }
            // Unnamed or exhausted ticket types fall back to help, then tutorial
            if !lost_any {
                if let Some(ticket_type) = self.take_any_ticket() {
                    effects.push(ticket_effect(ticket_type));
                }
            }
        }

        if effects.is_empty() {
            let (lost, dropped_to) = self.lose_xp(DEFAULT_XP_PENALTY);
            effects.push(match dropped_to {
                Some(level) => format!(
                    "Default penalty: lost {} XP and dropped to Level {}",
                    lost, level
                ),
                None => format!("Default penalty: lost {} XP", lost),
            });
        }

        effects
    }

    // Returns the XP actually lost and the new level if it dropped
    fn lose_xp(&mut self, amount: u32) -> (u32, Option<u32>) {
        let before = self.xp;
        self.xp = self.xp.saturating_sub(amount);
        let recomputed = level_for_xp(self.xp);
        let dropped_to = if recomputed < self.level {
            self.level = recomputed;
            Some(recomputed)
        } else {
            None
        };
        (before - self.xp, dropped_to)
    }

    fn take_any_ticket(&mut self) -> Option<TicketType> {
        if self.use_help_ticket() {
            Some(TicketType::Help)
        } else if self.use_tutorial_ticket() {
            Some(TicketType::Tutorial)
        } else {
            None
        }
    }

    pub fn use_help_ticket(&mut self) -> bool {
        if self.help_tickets > 0 {
            self.help_tickets -= 1;
            return true;
        }
        false
    }

    pub fn use_tutorial_ticket(&mut self) -> bool {
        if self.tutorial_tickets > 0 {
            self.tutorial_tickets -= 1;
            return true;
        }
        false
    }

    pub fn use_ticket(&mut self, ticket_type: TicketType) -> bool {
        match ticket_type {
            TicketType::Help => self.use_help_ticket(),
            TicketType::Tutorial => self.use_tutorial_ticket(),
        }
    }

    pub fn tickets(&self, ticket_type: TicketType) -> u32 {
        match ticket_type {
            TicketType::Help => self.help_tickets,
            TicketType::Tutorial => self.tutorial_tickets,
        }
    }

    pub fn should_reset_tickets(&self) -> bool {
        self.should_reset_tickets_at(now())
    }

    pub fn should_reset_tickets_at(&self, at: NaiveDateTime) -> bool {
        at - self.last_ticket_reset >= Duration::days(TICKET_RESET_DAYS)
    }

    pub fn reset_tickets(&mut self) {
        self.reset_tickets_at(now());
    }

    pub fn reset_tickets_at(&mut self, at: NaiveDateTime) {
        self.help_tickets = WEEKLY_HELP_TICKETS;
        self.tutorial_tickets = WEEKLY_TUTORIAL_TICKETS;
        self.last_ticket_reset = at;
    }

    /// Whole days left until the weekly reset is due, rounded up.
    pub fn days_until_ticket_reset(&self) -> i64 {
        self.days_until_ticket_reset_at(now())
    }

    pub fn days_until_ticket_reset_at(&self, at: NaiveDateTime) -> i64 {
        let due = self.last_ticket_reset + Duration::days(TICKET_RESET_DAYS);
        let remaining = due - at;
        if remaining <= Duration::zero() {
            return 0;
        }
        let days = remaining.num_days();
        if remaining > Duration::days(days) {
            days + 1
        } else {
            days
        }
    }

    pub fn xp_into_level(&self) -> u32 {
        self.xp % XP_PER_LEVEL
    }

    pub fn xp_to_next_level(&self) -> u32 {
        XP_PER_LEVEL - self.xp_into_level()
    }
}

fn requested_xp(text: &str) -> Option<u32> {
    let digits = XP_AMOUNT.as_ref()?.captures(text)?.get(1)?.as_str();
    // Absurdly large amounts still just drain everything
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}

fn ticket_effect(ticket_type: TicketType) -> String {
    format!("Lost 1 {} ticket", ticket_type.label())
}
