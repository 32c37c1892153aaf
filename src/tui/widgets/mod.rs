pub mod dashboard;
pub mod insight_detail;
pub mod insights;
pub mod mission_detail;
pub mod missions;

use chrono::NaiveDateTime;
use ratatui::style::Color;

use crate::models::{Difficulty, MissionStatus};

pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub(crate) fn format_date(dt: &NaiveDateTime) -> String {
    dt.format("%b %d").to_string()
}

pub(crate) fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format("%b %d, %Y %H:%M").to_string()
}

pub(crate) fn status_color(status: MissionStatus) -> Color {
    match status {
        MissionStatus::Active => Color::Yellow,
        MissionStatus::Completed => Color::Green,
        MissionStatus::Failed => Color::Red,
    }
}

pub(crate) fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("ミッションを完了する", 6), "ミッシ...");
    }

    #[test]
    fn format_date_is_month_and_day() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(format_date(&dt), "Mar 05");
        assert_eq!(format_timestamp(&dt), "Mar 05, 2024 09:00");
    }
}
