use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SoloCraftError};
use crate::models::{InsightDebt, Mission, MissionStatus, Record};
use crate::progress::UserProgress;

pub const MISSIONS_FILE: &str = "missions.json";
pub const DEBTS_FILE: &str = "insight_debts.json";
pub const PROGRESS_FILE: &str = "user_progress.json";

/// Persistence for the three collections.
///
/// Loads never fail: a missing or unreadable file yields an empty collection
/// (or fresh progress). Saves rewrite the whole collection.
pub trait Storage {
    fn load_missions(&self) -> Vec<Mission>;
    fn save_mission(&self, mission: &Mission) -> Result<()>;
    /// Returns whether a mission with this id existed.
    fn delete_mission(&self, id: &str) -> Result<bool>;

    fn load_insight_debts(&self) -> Vec<InsightDebt>;
    fn save_insight_debt(&self, debt: &InsightDebt) -> Result<()>;

    fn load_user_progress(&self) -> UserProgress;
    fn save_user_progress(&self, progress: &UserProgress) -> Result<()>;

    fn missions_with_status(&self, status: MissionStatus) -> Vec<Mission> {
        self.load_missions()
            .into_iter()
            .filter(|m| m.status() == status)
            .collect()
    }

    fn active_debts(&self) -> Vec<InsightDebt> {
        self.load_insight_debts()
            .into_iter()
            .filter(|d| !d.cleared)
            .collect()
    }

    fn cleared_debts(&self) -> Vec<InsightDebt> {
        self.load_insight_debts()
            .into_iter()
            .filter(|d| d.cleared)
            .collect()
    }

    fn find_mission(&self, id_or_prefix: &str) -> Result<Mission> {
        resolve(self.load_missions(), id_or_prefix)?
            .ok_or_else(|| SoloCraftError::MissionNotFound(id_or_prefix.to_string()))
    }

    fn find_insight_debt(&self, id_or_prefix: &str) -> Result<InsightDebt> {
        resolve(self.load_insight_debts(), id_or_prefix)?
            .ok_or_else(|| SoloCraftError::DebtNotFound(id_or_prefix.to_string()))
    }
}

// Exact id wins; otherwise a prefix must match exactly one record
fn resolve<T: Record>(records: Vec<T>, id_or_prefix: &str) -> Result<Option<T>> {
    let needle = id_or_prefix.trim();
    if needle.is_empty() {
        return Ok(None);
    }

    let mut matches: Vec<T> = Vec::new();
    for record in records {
        if record.id() == needle {
            return Ok(Some(record));
        }
        if record.id().starts_with(needle) {
            matches.push(record);
        }
    }

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        _ => Err(SoloCraftError::AmbiguousId(needle.to_string())),
    }
}

/// JSON files in one data directory, one file per collection.
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    /// Opens the store, creating the directory and seeding missing files.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;

        let store = Self { data_dir };
        store.init_files()?;
        Ok(store)
    }

    fn init_files(&self) -> Result<()> {
        if !self.missions_path().exists() {
            write_json(&self.missions_path(), &Vec::<Mission>::new())?;
        }
        if !self.debts_path().exists() {
            write_json(&self.debts_path(), &Vec::<InsightDebt>::new())?;
        }
        if !self.progress_path().exists() {
            write_json(&self.progress_path(), &UserProgress::default())?;
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn missions_path(&self) -> PathBuf {
        self.data_dir.join(MISSIONS_FILE)
    }

    pub fn debts_path(&self) -> PathBuf {
        self.data_dir.join(DEBTS_FILE)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.data_dir.join(PROGRESS_FILE)
    }
}

impl Storage for JsonStore {
    fn load_missions(&self) -> Vec<Mission> {
        read_records(&self.missions_path())
    }

    fn save_mission(&self, mission: &Mission) -> Result<()> {
        debug!(id = %mission.id, "saving mission");
        upsert_record(&self.missions_path(), mission)
    }

    fn delete_mission(&self, id: &str) -> Result<bool> {
        let removed = remove_record(&self.missions_path(), id)?;
        debug!(id, removed, "deleting mission");
        Ok(removed)
    }

    fn load_insight_debts(&self) -> Vec<InsightDebt> {
        read_records(&self.debts_path())
    }

    fn save_insight_debt(&self, debt: &InsightDebt) -> Result<()> {
        debug!(id = %debt.id, "saving insight debt");
        upsert_record(&self.debts_path(), debt)
    }

    fn load_user_progress(&self) -> UserProgress {
        read_json(&self.progress_path()).unwrap_or_default()
    }

    fn save_user_progress(&self, progress: &UserProgress) -> Result<()> {
        debug!(xp = progress.xp, level = progress.level, "saving user progress");
        write_json(&self.progress_path(), progress)
    }
}

// Missing files are normal on first run; anything else is logged and ignored
fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read data file");
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed data file");
            None
        }
    }
}

// A record that fails to parse is skipped on load but stays in the file
fn read_records<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    read_json::<Vec<Value>>(path)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| match serde_json::from_value(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %path.display(), index, error = %e, "skipping unreadable record");
                None
            }
        })
        .collect()
}

fn raw_id(raw: &Value) -> Option<&str> {
    raw.get("id").and_then(Value::as_str)
}

/// Replaces the record with the same id, or appends it. Other entries are
/// written back untouched.
fn upsert_record<T: Record + Serialize>(path: &Path, record: &T) -> Result<()> {
    let mut raw: Vec<Value> = read_json(path).unwrap_or_default();
    let value = serde_json::to_value(record)?;
    match raw.iter_mut().find(|r| raw_id(r) == Some(record.id())) {
        Some(existing) => *existing = value,
        None => raw.push(value),
    }
    write_json(path, &raw)
}

fn remove_record(path: &Path, id: &str) -> Result<bool> {
    let mut raw: Vec<Value> = read_json(path).unwrap_or_default();
    let before = raw.len();
    raw.retain(|r| raw_id(r) != Some(id));
    let removed = raw.len() != before;
    write_json(path, &raw)?;
    Ok(removed)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, NewMission, TicketType};
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonStore::open(dir.path()).expect("Failed to open store");
        (dir, store)
    }

    fn mission(title: &str) -> Mission {
        Mission::new(NewMission {
            title: title.to_string(),
            description: format!("{} description", title),
            difficulty: Difficulty::Easy,
            constraints: String::new(),
            rewards: 40,
            punishment: None,
        })
    }

    mod init_tests {
        use super::*;

        #[test]
        fn open_creates_directory_and_files() {
            let dir = TempDir::new().unwrap();
            let data_dir = dir.path().join("nested").join("solocraft");
            let store = JsonStore::open(&data_dir).unwrap();

            assert!(store.missions_path().exists());
            assert!(store.debts_path().exists());
            assert!(store.progress_path().exists());
            assert_eq!(fs::read_to_string(store.missions_path()).unwrap(), "[]");
        }

        #[test]
        fn data_dir_is_the_opened_path() {
            let (dir, store) = setup_store();
            assert_eq!(store.data_dir(), dir.path());
        }

        #[test]
        fn open_is_idempotent() {
            let (dir, store) = setup_store();
            store.save_mission(&mission("Keep me")).unwrap();

            let reopened = JsonStore::open(dir.path()).unwrap();
            assert_eq!(reopened.load_missions().len(), 1);
        }

        #[test]
        fn seeded_progress_has_starter_tickets() {
            let (_dir, store) = setup_store();
            let progress = store.load_user_progress();
            assert_eq!(progress.help_tickets, 3);
            assert_eq!(progress.tutorial_tickets, 2);
        }
    }

    mod mission_tests {
        use super::*;

        #[test]
        fn save_appends_new_missions_in_order() {
            let (_dir, store) = setup_store();
            store.save_mission(&mission("First")).unwrap();
            store.save_mission(&mission("Second")).unwrap();

            let titles: Vec<String> = store
                .load_missions()
                .into_iter()
                .map(|m| m.title)
                .collect();
            assert_eq!(titles, vec!["First", "Second"]);
        }

        #[test]
        fn save_replaces_existing_by_id() {
            let (_dir, store) = setup_store();
            let mut m = mission("Original");
            store.save_mission(&m).unwrap();
            store.save_mission(&mission("Other")).unwrap();

            m.complete().unwrap();
            store.save_mission(&m).unwrap();

            let missions = store.load_missions();
            assert_eq!(missions.len(), 2);
            assert_eq!(missions[0].id, m.id);
            assert!(missions[0].completed);
        }

        #[test]
        fn delete_removes_mission() {
            let (_dir, store) = setup_store();
            let m = mission("Doomed");
            store.save_mission(&m).unwrap();

            assert!(store.delete_mission(&m.id).unwrap());
            assert!(store.load_missions().is_empty());
        }

        #[test]
        fn delete_nonexistent_is_a_no_op() {
            let (_dir, store) = setup_store();
            store.save_mission(&mission("Survivor")).unwrap();

            assert!(!store.delete_mission("no-such-id").unwrap());
            assert_eq!(store.load_missions().len(), 1);
        }

        #[test]
        fn filter_by_status() {
            let (_dir, store) = setup_store();
            let mut done = mission("Done");
            done.complete().unwrap();
            let mut failed = mission("Failed");
            failed.fail().unwrap();
            store.save_mission(&mission("Open")).unwrap();
            store.save_mission(&done).unwrap();
            store.save_mission(&failed).unwrap();

            let active = store.missions_with_status(MissionStatus::Active);
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].title, "Open");
            assert_eq!(
                store.missions_with_status(MissionStatus::Completed)[0].title,
                "Done"
            );
            assert_eq!(
                store.missions_with_status(MissionStatus::Failed)[0].title,
                "Failed"
            );
        }

        #[test]
        fn persisted_file_is_pretty_json_array() {
            let (_dir, store) = setup_store();
            store.save_mission(&mission("Pretty")).unwrap();
            let raw = fs::read_to_string(store.missions_path()).unwrap();
            assert!(raw.starts_with("[\n  {"));
            assert!(raw.contains("\"title\": \"Pretty\""));
        }
    }

    mod load_recovery_tests {
        use super::*;

        #[test]
        fn malformed_missions_file_loads_empty() {
            let (_dir, store) = setup_store();
            fs::write(store.missions_path(), "{ not json").unwrap();
            assert!(store.load_missions().is_empty());
        }

        #[test]
        fn missing_debts_file_loads_empty() {
            let (_dir, store) = setup_store();
            fs::remove_file(store.debts_path()).unwrap();
            assert!(store.load_insight_debts().is_empty());
        }

        #[test]
        fn malformed_progress_loads_default() {
            let (_dir, store) = setup_store();
            fs::write(store.progress_path(), "[1, 2, 3]").unwrap();
            let progress = store.load_user_progress();
            assert_eq!(progress.xp, 0);
            assert_eq!(progress.help_tickets, 3);
            assert_eq!(progress.tutorial_tickets, 2);
        }

        #[test]
        fn save_after_malformed_file_starts_fresh_collection() {
            let (_dir, store) = setup_store();
            fs::write(store.missions_path(), "garbage").unwrap();
            store.save_mission(&mission("Fresh")).unwrap();
            assert_eq!(store.load_missions().len(), 1);
        }

        #[test]
        fn unreadable_record_does_not_hide_its_siblings() {
            let (_dir, store) = setup_store();
            let good = mission("Good");
            store.save_mission(&good).unwrap();

            let mut raw: Vec<Value> =
                serde_json::from_str(&fs::read_to_string(store.missions_path()).unwrap())
                    .unwrap();
            raw.push(serde_json::json!({
                "id": "legacy-1",
                "title": "Legacy",
                "description": "no reward recorded",
                "difficulty": "Easy",
                "created_at": "2024-02-11T18:04:12"
            }));
            fs::write(store.missions_path(), serde_json::to_string(&raw).unwrap()).unwrap();

            let loaded = store.load_missions();
            assert_eq!(loaded.len(), 1);
            assert_eq!(loaded[0].id, good.id);
        }

        #[test]
        fn save_keeps_unreadable_records_and_valid_siblings() {
            let (_dir, store) = setup_store();
            let good = mission("Good");
            store.save_mission(&good).unwrap();
            let mut raw: Vec<Value> =
                serde_json::from_str(&fs::read_to_string(store.missions_path()).unwrap())
                    .unwrap();
            raw.push(serde_json::json!({ "id": "legacy-1", "title": "Legacy" }));
            fs::write(store.missions_path(), serde_json::to_string(&raw).unwrap()).unwrap();

            store.save_mission(&mission("New")).unwrap();

            let titles: Vec<String> = store.load_missions().into_iter().map(|m| m.title).collect();
            assert_eq!(titles, vec!["Good", "New"]);
            let on_disk = fs::read_to_string(store.missions_path()).unwrap();
            assert!(on_disk.contains("legacy-1"));
        }

        #[test]
        fn delete_keeps_unreadable_records() {
            let (_dir, store) = setup_store();
            let doomed = mission("Doomed");
            store.save_mission(&doomed).unwrap();
            let mut raw: Vec<Value> =
                serde_json::from_str(&fs::read_to_string(store.missions_path()).unwrap())
                    .unwrap();
            raw.push(serde_json::json!({ "id": "legacy-1" }));
            fs::write(store.missions_path(), serde_json::to_string(&raw).unwrap()).unwrap();

            assert!(store.delete_mission(&doomed.id).unwrap());
            assert!(store.load_missions().is_empty());
            assert!(fs::read_to_string(store.missions_path())
                .unwrap()
                .contains("legacy-1"));
        }

        #[test]
        fn unreadable_debt_is_kept_on_save() {
            let (_dir, store) = setup_store();
            fs::write(
                store.debts_path(),
                r#"[{"id": "old-debt", "used_for": "missing ticket type"}]"#,
            )
            .unwrap();
            assert!(store.load_insight_debts().is_empty());

            store
                .save_insight_debt(&InsightDebt::new(TicketType::Help, "traits"))
                .unwrap();
            assert_eq!(store.load_insight_debts().len(), 1);
            assert!(fs::read_to_string(store.debts_path())
                .unwrap()
                .contains("old-debt"));
        }

        #[test]
        fn reads_files_written_by_the_desktop_tool() {
            let (_dir, store) = setup_store();
            fs::write(
                store.progress_path(),
                r#"{
  "xp": 230,
  "help_tickets": 1,
  "tutorial_tickets": 0,
  "last_ticket_reset": "2024-02-11T18:04:12.551203",
  "level": 3,
  "badges": []
}"#,
            )
            .unwrap();
            let progress = store.load_user_progress();
            assert_eq!(progress.xp, 230);
            assert_eq!(progress.level, 3);
            assert_eq!(progress.help_tickets, 1);
        }
    }

    mod debt_tests {
        use super::*;

        #[test]
        fn active_and_cleared_filters() {
            let (_dir, store) = setup_store();
            let open = InsightDebt::new(TicketType::Help, "closures");
            let mut paid = InsightDebt::new(TicketType::Tutorial, "generics");
            paid.clear("Monomorphization copies code per type").unwrap();
            store.save_insight_debt(&open).unwrap();
            store.save_insight_debt(&paid).unwrap();

            let active = store.active_debts();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].id, open.id);

            let cleared = store.cleared_debts();
            assert_eq!(cleared.len(), 1);
            assert_eq!(cleared[0].id, paid.id);
        }

        #[test]
        fn save_debt_upserts() {
            let (_dir, store) = setup_store();
            let mut debt = InsightDebt::new(TicketType::Help, "traits");
            store.save_insight_debt(&debt).unwrap();
            debt.clear("Object safety limits dyn").unwrap();
            store.save_insight_debt(&debt).unwrap();

            let debts = store.load_insight_debts();
            assert_eq!(debts.len(), 1);
            assert!(debts[0].cleared);
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn find_by_exact_id() {
            let (_dir, store) = setup_store();
            let m = mission("Exact");
            store.save_mission(&m).unwrap();
            assert_eq!(store.find_mission(&m.id).unwrap().id, m.id);
        }

        #[test]
        fn find_by_unique_prefix() {
            let (_dir, store) = setup_store();
            let m = mission("Prefixed");
            store.save_mission(&m).unwrap();
            assert_eq!(store.find_mission(&m.id[..8]).unwrap().id, m.id);
        }

        #[test]
        fn find_unknown_is_not_found() {
            let (_dir, store) = setup_store();
            assert!(matches!(
                store.find_mission("zzzz"),
                Err(SoloCraftError::MissionNotFound(_))
            ));
            assert!(matches!(
                store.find_insight_debt("zzzz"),
                Err(SoloCraftError::DebtNotFound(_))
            ));
        }

        #[test]
        fn ambiguous_prefix_is_rejected() {
            let mut a = mission("A");
            a.id = "abc-1".to_string();
            let mut b = mission("B");
            b.id = "abc-2".to_string();

            let result = resolve(vec![a, b], "abc");
            assert!(matches!(result, Err(SoloCraftError::AmbiguousId(_))));
        }

        #[test]
        fn exact_match_beats_longer_prefix_match() {
            let mut a = mission("A");
            a.id = "abc".to_string();
            let mut b = mission("B");
            b.id = "abcdef".to_string();

            let found = resolve(vec![b, a], "abc").unwrap().unwrap();
            assert_eq!(found.title, "A");
        }

        #[test]
        fn blank_id_matches_nothing() {
            let found = resolve(vec![mission("A")], "  ").unwrap();
            assert!(found.is_none());
        }
    }
}
