use std::fs;
use std::path::PathBuf;

use chrono::Local;
use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};

use super::event::CalendarEvent;
use super::plan::LearningPlan;
use super::task::Task;

/// On-disk document holding all three record collections.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    events: Vec<CalendarEvent>,
    #[serde(default)]
    plans: Vec<LearningPlan>,
}

pub struct Store {
    path: PathBuf,
    doc: Document,
}

impl Store {
    pub fn new() -> Result<Self> {
        let path = default_path().ok_or_else(|| eyre!("Could not locate a data directory"))?;
        Self::open(path)
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = if path.exists() {
            let content = fs::read_to_string(&path)
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse {}", path.display()))?
        } else {
            Document::default()
        };
        Ok(Self { path, doc })
    }

    /// Write the document back, via a temp file so a crash mid-write never
    /// truncates the existing data.
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&self.doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .wrap_err_with(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .wrap_err_with(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.doc.tasks
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.doc.events
    }

    pub fn plans(&self) -> &[LearningPlan] {
        &self.doc.plans
    }

    pub fn add_task(&mut self, task: Task) -> Result<()> {
        self.doc.tasks.push(task);
        self.persist()
    }

    /// Flip a task's completed flag. Returns the new state.
    pub fn toggle_task(&mut self, id: &str) -> Result<bool> {
        let task = self
            .doc
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| eyre!("No task with id {id}"))?;
        task.completed = !task.completed;
        task.updated = Local::now();
        let completed = task.completed;
        self.persist()?;
        Ok(completed)
    }

    /// Replace the task with the same id, touching `updated`.
    pub fn update_task(&mut self, mut task: Task) -> Result<()> {
        let slot = self
            .doc
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| eyre!("No task with id {}", task.id))?;
        task.updated = Local::now();
        *slot = task;
        self.persist()
    }

    pub fn remove_task(&mut self, id: &str) -> Result<()> {
        self.doc.tasks.retain(|t| t.id != id);
        self.persist()
    }

    pub fn add_event(&mut self, event: CalendarEvent) -> Result<()> {
        self.doc.events.push(event);
        self.persist()
    }

    pub fn update_event(&mut self, event: CalendarEvent) -> Result<()> {
        let slot = self
            .doc
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| eyre!("No event with id {}", event.id))?;
        *slot = event;
        self.persist()
    }

    pub fn remove_event(&mut self, id: &str) -> Result<()> {
        self.doc.events.retain(|e| e.id != id);
        self.persist()
    }

    pub fn add_plan(&mut self, plan: LearningPlan) -> Result<()> {
        self.doc.plans.push(plan);
        self.persist()
    }

    pub fn update_plan(&mut self, plan: LearningPlan) -> Result<()> {
        let slot = self
            .doc
            .plans
            .iter_mut()
            .find(|p| p.id == plan.id)
            .ok_or_else(|| eyre!("No plan with id {}", plan.id))?;
        *slot = plan;
        self.persist()
    }

    pub fn remove_plan(&mut self, id: &str) -> Result<()> {
        self.doc.plans.retain(|p| p.id != id);
        self.persist()
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

fn default_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("planner-tui").join("planner.json"))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::store::Priority;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn scratch_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("planner.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn roundtrips_all_record_types() {
        let (dir, mut store) = scratch_store();

        let task = Task::new("Read chapter 3".into(), local(2026, 3, 10, 18, 0), Priority::High);
        let task_id = task.id.clone();
        store.add_task(task).unwrap();
        store
            .add_event(CalendarEvent::new(
                "Rust lecture".into(),
                "programming".into(),
                local(2026, 3, 11, 10, 0),
                local(2026, 3, 11, 12, 0),
            ))
            .unwrap();
        store
            .add_plan(LearningPlan::new(
                "Learn Rust".into(),
                "programming".into(),
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
                Priority::Medium,
            ))
            .unwrap();

        let reopened = Store::open(dir.path().join("planner.json")).unwrap();
        assert_eq!(reopened.tasks().len(), 1);
        assert_eq!(reopened.tasks()[0].id, task_id);
        assert_eq!(reopened.events().len(), 1);
        assert_eq!(reopened.events()[0].title, "Rust lecture");
        assert_eq!(reopened.plans().len(), 1);
        assert_eq!(reopened.plans()[0].priority, Priority::Medium);
    }

    #[test]
    fn opens_empty_when_file_is_missing() {
        let (_dir, store) = scratch_store();
        assert!(store.tasks().is_empty());
        assert!(store.events().is_empty());
        assert!(store.plans().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn toggle_task_flips_and_touches_updated() {
        let (_dir, mut store) = scratch_store();
        let task = Task::new("Flashcards".into(), local(2026, 3, 10, 9, 0), Priority::Low);
        let id = task.id.clone();
        let created = task.created;
        store.add_task(task).unwrap();

        assert!(store.toggle_task(&id).unwrap());
        assert!(store.tasks()[0].completed);
        assert!(store.tasks()[0].updated >= created);

        assert!(!store.toggle_task(&id).unwrap());
        assert!(!store.tasks()[0].completed);

        assert!(store.toggle_task("missing").is_err());
    }

    #[test]
    fn remove_operations_drop_matching_ids() {
        let (_dir, mut store) = scratch_store();
        let event = CalendarEvent::new(
            "Algebra".into(),
            "math".into(),
            local(2026, 3, 12, 14, 0),
            local(2026, 3, 12, 16, 0),
        );
        let id = event.id.clone();
        store.add_event(event).unwrap();
        store.remove_event(&id).unwrap();
        assert!(store.events().is_empty());
    }

    #[test]
    fn update_replaces_by_id_and_touches_updated() {
        let (_dir, mut store) = scratch_store();
        let task = Task::new("Draft".into(), local(2026, 3, 10, 9, 0), Priority::Low);
        let before = task.updated;
        store.add_task(task).unwrap();

        let mut edited = store.tasks()[0].clone();
        edited.title = "Final draft".to_string();
        edited.priority = Priority::High;
        store.update_task(edited).unwrap();

        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].title, "Final draft");
        assert_eq!(store.tasks()[0].priority, Priority::High);
        assert!(store.tasks()[0].updated >= before);

        let mut missing = store.tasks()[0].clone();
        missing.id = "missing".to_string();
        assert!(store.update_task(missing).is_err());
    }

    #[test]
    fn update_event_and_plan_replace_in_place() {
        let (_dir, mut store) = scratch_store();
        let event = CalendarEvent::new(
            "Lecture".into(),
            "math".into(),
            local(2026, 3, 12, 14, 0),
            local(2026, 3, 12, 16, 0),
        );
        store.add_event(event).unwrap();
        let mut moved = store.events()[0].clone();
        moved.start = local(2026, 3, 13, 14, 0);
        moved.end = local(2026, 3, 13, 16, 0);
        store.update_event(moved).unwrap();
        assert_eq!(store.events().len(), 1);
        assert_eq!(store.events()[0].start, local(2026, 3, 13, 14, 0));

        let plan = LearningPlan::new(
            "Learn Rust".into(),
            "programming".into(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
            Priority::Medium,
        );
        store.add_plan(plan).unwrap();
        let mut bumped = store.plans()[0].clone();
        bumped.progress = 60;
        store.update_plan(bumped).unwrap();
        assert_eq!(store.plans().len(), 1);
        assert_eq!(store.plans()[0].progress, 60);
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Store::open(&path).is_err());
    }
}
