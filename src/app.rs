use std::collections::HashSet;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};
use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::components::forms::{FormKind, FormState};
use crate::schedule::{self, ProgressSummary, ScheduleItem};
use crate::store::{CalendarEvent, LearningPlan, Store, Task};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    Month,
    Week,
    Day,
    Tasks,
    Plans,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
}

pub struct App {
    pub running: bool,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    /// Items of the selected day, refreshed on every date change.
    pub day_items: Vec<ScheduleItem>,
    /// Items of the whole selected week.
    pub week_items: Vec<ScheduleItem>,
    /// Days of the selected month carrying at least one item.
    pub month_marks: HashSet<u32>,
    pub day_selected: usize,
    pub task_selected: usize,
    pub plan_selected: usize,
    pub form: Option<FormState>,
    pub detail_open: bool,
    pub show_help: bool,
    pub status_message: Option<String>,
    store: Store,
}

impl App {
    pub fn new() -> Result<Self> {
        Ok(Self::with_store(Store::new()?))
    }

    pub fn with_store(store: Store) -> Self {
        let today = Local::now().date_naive();
        let mut app = Self {
            running: true,
            view_mode: ViewMode::Month,
            input_mode: InputMode::Normal,
            selected_date: today,
            today,
            day_items: Vec::new(),
            week_items: Vec::new(),
            month_marks: HashSet::new(),
            day_selected: 0,
            task_selected: 0,
            plan_selected: 0,
            form: None,
            detail_open: false,
            show_help: false,
            status_message: None,
            store,
        };
        app.refresh();
        app
    }

    /// Recompute all derived buckets from the store.
    pub fn refresh(&mut self) {
        let events = self.store.events();
        let tasks = self.store.tasks();

        self.day_items = schedule::items_for_date(events, tasks, self.selected_date);
        self.week_items = schedule::week_of(self.selected_date)
            .iter()
            .flat_map(|date| schedule::items_for_date(events, tasks, *date))
            .collect();
        self.month_marks = schedule::days_with_items(
            events,
            tasks,
            self.selected_date.year(),
            self.selected_date.month(),
        );
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        self.day_selected = self.day_selected.min(self.day_items.len().saturating_sub(1));
        self.task_selected = self
            .task_selected
            .min(self.store.tasks().len().saturating_sub(1));
        self.plan_selected = self
            .plan_selected
            .min(self.store.plans().len().saturating_sub(1));
    }

    pub fn week_start(&self) -> NaiveDate {
        schedule::week_of(self.selected_date)[0]
    }

    /// Tasks in display order: grouped by category, soonest due first.
    pub fn sorted_tasks(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.store.tasks().iter().collect();
        tasks.sort_by(|a, b| a.category.cmp(&b.category).then(a.due.cmp(&b.due)));
        tasks
    }

    pub fn progress_summary(&self) -> ProgressSummary {
        schedule::overall_progress(self.store.tasks())
    }

    /// Plans paired with their derived progress percentage.
    pub fn plans_with_progress(&self) -> Vec<(&LearningPlan, u8)> {
        self.store
            .plans()
            .iter()
            .map(|p| (p, schedule::plan_progress(p, self.store.tasks())))
            .collect()
    }

    /// The next few open tasks, shown on the month dashboard.
    pub fn upcoming(&self) -> Vec<&Task> {
        schedule::upcoming_tasks(self.store.tasks(), 3)
    }

    // ── navigation ──

    pub fn next_day(&mut self) {
        self.selected_date = self.selected_date.succ_opt().unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn prev_day(&mut self) {
        self.selected_date = self.selected_date.pred_opt().unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn next_week(&mut self) {
        self.selected_date += chrono::Duration::weeks(1);
        self.on_date_changed();
    }

    pub fn prev_week(&mut self) {
        self.selected_date -= chrono::Duration::weeks(1);
        self.on_date_changed();
    }

    pub fn next_month(&mut self) {
        let month = self.selected_date.month();
        let year = self.selected_date.year();
        let (new_year, new_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        self.jump_to_month(new_year, new_month);
    }

    pub fn prev_month(&mut self) {
        let month = self.selected_date.month();
        let year = self.selected_date.year();
        let (new_year, new_month) = if month == 1 {
            (year - 1, 12)
        } else {
            (year, month - 1)
        };
        self.jump_to_month(new_year, new_month);
    }

    fn jump_to_month(&mut self, year: i32, month: u32) {
        let day = self
            .selected_date
            .day()
            .min(schedule::days_in_month(year, month));
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            self.selected_date = date;
        }
        self.on_date_changed();
    }

    pub fn go_to_today(&mut self) {
        self.today = Local::now().date_naive();
        self.selected_date = self.today;
        self.on_date_changed();
    }

    fn on_date_changed(&mut self) {
        self.day_selected = 0;
        self.refresh();
    }

    // ── selection ──

    fn selection_len(&self) -> usize {
        match self.view_mode {
            ViewMode::Month | ViewMode::Day => self.day_items.len(),
            ViewMode::Week => 0,
            ViewMode::Tasks => self.store.tasks().len(),
            ViewMode::Plans => self.store.plans().len(),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.view_mode {
            ViewMode::Month | ViewMode::Week | ViewMode::Day => &mut self.day_selected,
            ViewMode::Tasks => &mut self.task_selected,
            ViewMode::Plans => &mut self.plan_selected,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.selection_len();
        let sel = self.selection_mut();
        if len > 0 && *sel + 1 < len {
            *sel += 1;
        }
    }

    pub fn select_prev(&mut self) {
        let sel = self.selection_mut();
        *sel = sel.saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&ScheduleItem> {
        self.day_items.get(self.day_selected)
    }

    pub fn selected_plan(&self) -> Option<&LearningPlan> {
        self.store.plans().get(self.plan_selected)
    }

    // ── mutations ──

    /// Toggle the completed flag of whichever task is under the cursor.
    pub fn toggle_selected_task(&mut self) {
        let id = match self.view_mode {
            ViewMode::Tasks => self
                .sorted_tasks()
                .get(self.task_selected)
                .map(|t| t.id.clone()),
            _ => self
                .selected_item()
                .filter(|i| i.is_task)
                .map(|i| i.id.clone()),
        };
        let Some(id) = id else { return };

        match self.store.toggle_task(&id) {
            Ok(completed) => {
                self.status_message = Some(if completed {
                    "Task completed".to_string()
                } else {
                    "Task reopened".to_string()
                });
                self.refresh();
            }
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    /// Delete whichever record is under the cursor in the current view.
    pub fn delete_selected(&mut self) {
        let result = match self.view_mode {
            ViewMode::Month | ViewMode::Week | ViewMode::Day => {
                match self.selected_item().map(|i| (i.id.clone(), i.is_task)) {
                    Some((id, true)) => self.store.remove_task(&id).map(|_| "Task deleted"),
                    Some((id, false)) => self.store.remove_event(&id).map(|_| "Event deleted"),
                    None => return,
                }
            }
            ViewMode::Tasks => {
                match self
                    .sorted_tasks()
                    .get(self.task_selected)
                    .map(|t| t.id.clone())
                {
                    Some(id) => self.store.remove_task(&id).map(|_| "Task deleted"),
                    None => return,
                }
            }
            ViewMode::Plans => match self.selected_plan().map(|p| p.id.clone()) {
                Some(id) => self.store.remove_plan(&id).map(|_| "Plan deleted"),
                None => return,
            },
        };

        match result {
            Ok(msg) => {
                self.status_message = Some(msg.to_string());
                self.refresh();
            }
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    // ── forms ──

    /// Open the create-form matching the current view.
    pub fn open_form(&mut self) {
        self.form = Some(match self.view_mode {
            ViewMode::Tasks => FormState::new_task(self.selected_date),
            ViewMode::Plans => FormState::new_plan(self.selected_date),
            _ => FormState::new_event(self.selected_date),
        });
        self.input_mode = InputMode::Form;
    }

    pub fn open_task_form(&mut self) {
        self.form = Some(FormState::new_task(self.selected_date));
        self.input_mode = InputMode::Form;
    }

    /// Open a prefilled form for the record under the cursor.
    pub fn open_edit_form(&mut self) {
        let form = match self.view_mode {
            ViewMode::Plans => self.selected_plan().map(FormState::edit_plan),
            ViewMode::Tasks => self
                .sorted_tasks()
                .get(self.task_selected)
                .copied()
                .map(FormState::edit_task),
            _ => self.selected_item().and_then(|item| {
                if item.is_task {
                    self.store
                        .tasks()
                        .iter()
                        .find(|t| t.id == item.id)
                        .map(FormState::edit_task)
                } else {
                    self.store
                        .events()
                        .iter()
                        .find(|e| e.id == item.id)
                        .map(FormState::edit_event)
                }
            }),
        };
        if let Some(form) = form {
            self.form = Some(form);
            self.input_mode = InputMode::Form;
        }
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn submit_form(&mut self) {
        let Some(form) = self.form.clone() else { return };
        if !form.is_valid() {
            self.status_message = Some("Form is incomplete".to_string());
            return;
        }

        let result = match form.kind {
            FormKind::Event => self.save_event(&form),
            FormKind::Task => self.save_task(&form),
            FormKind::Plan => self.save_plan(&form),
        };

        match result {
            Ok(msg) => {
                self.status_message = Some(msg.to_string());
                self.close_form();
                self.refresh();
            }
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    fn save_event(&mut self, form: &FormState) -> Result<&'static str> {
        let date = form.parsed_date().ok_or_else(|| eyre!("Invalid date"))?;
        let start_time = form.parsed_start_time().ok_or_else(|| eyre!("Invalid start time"))?;
        let end_time = form.parsed_end_time().ok_or_else(|| eyre!("Invalid end time"))?;
        let start = local_datetime(date, start_time)?;
        let end = local_datetime(date, end_time)?;

        match form.editing_id() {
            Some(id) => {
                let mut event = self
                    .store
                    .events()
                    .iter()
                    .find(|e| e.id == id)
                    .cloned()
                    .ok_or_else(|| eyre!("No event with id {id}"))?;
                event.title = form.title.clone();
                event.category = form.category.clone();
                event.start = start;
                event.end = end;
                self.store.update_event(event)?;
                Ok("Event updated")
            }
            None => {
                let event =
                    CalendarEvent::new(form.title.clone(), form.category.clone(), start, end);
                self.store.add_event(event)?;
                Ok("Event created")
            }
        }
    }

    fn save_task(&mut self, form: &FormState) -> Result<&'static str> {
        let date = form.parsed_date().ok_or_else(|| eyre!("Invalid date"))?;
        let due_time = form.parsed_start_time().ok_or_else(|| eyre!("Invalid due time"))?;
        let due = local_datetime(date, due_time)?;

        match form.editing_id() {
            Some(id) => {
                let mut task = self
                    .store
                    .tasks()
                    .iter()
                    .find(|t| t.id == id)
                    .cloned()
                    .ok_or_else(|| eyre!("No task with id {id}"))?;
                task.title = form.title.clone();
                task.category = form.category.clone();
                task.due = due;
                task.priority = form.priority;
                task.estimated_minutes = form.parsed_estimate();
                self.store.update_task(task)?;
                Ok("Task updated")
            }
            None => {
                let mut task = Task::new(form.title.clone(), due, form.priority);
                task.category = form.category.clone();
                task.estimated_minutes = form.parsed_estimate();
                self.store.add_task(task)?;
                Ok("Task created")
            }
        }
    }

    fn save_plan(&mut self, form: &FormState) -> Result<&'static str> {
        let start_date = form.parsed_date().ok_or_else(|| eyre!("Invalid start date"))?;
        let end_date = form.parsed_end_date().ok_or_else(|| eyre!("Invalid end date"))?;

        match form.editing_id() {
            Some(id) => {
                let mut plan = self
                    .store
                    .plans()
                    .iter()
                    .find(|p| p.id == id)
                    .cloned()
                    .ok_or_else(|| eyre!("No plan with id {id}"))?;
                plan.title = form.title.clone();
                plan.category = form.category.clone();
                plan.start_date = start_date;
                plan.end_date = end_date;
                plan.priority = form.priority;
                plan.progress = form.parsed_progress();
                self.store.update_plan(plan)?;
                Ok("Plan updated")
            }
            None => {
                let mut plan = LearningPlan::new(
                    form.title.clone(),
                    form.category.clone(),
                    start_date,
                    end_date,
                    form.priority,
                );
                plan.progress = form.parsed_progress();
                self.store.add_plan(plan)?;
                Ok("Plan created")
            }
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &Store {
        &self.store
    }
}

fn local_datetime(
    date: NaiveDate,
    time: chrono::NaiveTime,
) -> Result<chrono::DateTime<Local>> {
    Local
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .earliest()
        .ok_or_else(|| eyre!("Time does not exist in the local timezone"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Priority;

    fn scratch_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("planner.json")).unwrap();
        (dir, App::with_store(store))
    }

    fn submit(app: &mut App, form: FormState) {
        app.form = Some(form);
        app.input_mode = InputMode::Form;
        app.submit_form();
    }

    #[test]
    fn month_navigation_clamps_day_of_month() {
        let (_dir, mut app) = scratch_app();
        app.selected_date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        app.next_month();
        assert_eq!(app.selected_date, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        app.prev_month();
        assert_eq!(app.selected_date, NaiveDate::from_ymd_opt(2026, 1, 28).unwrap());
    }

    #[test]
    fn year_boundaries_roll_over() {
        let (_dir, mut app) = scratch_app();
        app.selected_date = NaiveDate::from_ymd_opt(2026, 12, 15).unwrap();
        app.next_month();
        assert_eq!(app.selected_date, NaiveDate::from_ymd_opt(2027, 1, 15).unwrap());
        app.prev_month();
        assert_eq!(app.selected_date, NaiveDate::from_ymd_opt(2026, 12, 15).unwrap());
    }

    #[test]
    fn submitting_an_event_form_lands_in_the_day_bucket() {
        let (_dir, mut app) = scratch_app();
        app.selected_date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        let mut form = FormState::new_event(app.selected_date);
        form.title.push_str("Rust lecture");
        form.category.push_str("programming");
        submit(&mut app, form);

        assert_eq!(app.store().events().len(), 1);
        assert_eq!(app.day_items.len(), 1);
        assert_eq!(app.day_items[0].title, "Rust lecture");
        assert!(!app.day_items[0].is_task);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.month_marks.contains(&10));
    }

    #[test]
    fn invalid_form_stays_open() {
        let (_dir, mut app) = scratch_app();
        let form = FormState::new_event(app.selected_date); // no title
        submit(&mut app, form);
        assert!(app.form.is_some());
        assert_eq!(app.input_mode, InputMode::Form);
        assert!(app.store().events().is_empty());
    }

    #[test]
    fn toggling_a_task_removes_it_from_the_calendar() {
        let (_dir, mut app) = scratch_app();
        app.selected_date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        let mut form = FormState::new_task(app.selected_date);
        form.title.push_str("Homework");
        submit(&mut app, form);
        assert_eq!(app.day_items.len(), 1);

        app.view_mode = ViewMode::Day;
        app.toggle_selected_task();
        assert!(app.store().tasks()[0].completed);
        // Completed tasks drop out of the day bucket.
        assert!(app.day_items.is_empty());
        assert!(!app.month_marks.contains(&10));
    }

    #[test]
    fn delete_selected_respects_the_active_view() {
        let (_dir, mut app) = scratch_app();
        app.selected_date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        let mut form = FormState::new_plan(app.selected_date);
        form.title.push_str("Learn Rust");
        submit(&mut app, form);
        assert_eq!(app.store().plans().len(), 1);

        app.view_mode = ViewMode::Plans;
        app.delete_selected();
        assert!(app.store().plans().is_empty());
    }

    #[test]
    fn editing_a_task_replaces_it_in_place() {
        let (_dir, mut app) = scratch_app();
        app.selected_date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        let mut form = FormState::new_task(app.selected_date);
        form.title.push_str("Homework");
        submit(&mut app, form);
        let id = app.store().tasks()[0].id.clone();

        app.view_mode = ViewMode::Tasks;
        app.open_edit_form();
        let mut form = app.form.clone().unwrap();
        assert_eq!(form.editing_id(), Some(id.as_str()));
        assert_eq!(form.title, "Homework");

        form.title.push_str(" revised");
        form.start_time = "11:30".to_string();
        submit(&mut app, form);

        assert_eq!(app.store().tasks().len(), 1);
        assert_eq!(app.store().tasks()[0].id, id);
        assert_eq!(app.store().tasks()[0].title, "Homework revised");
        // The calendar bucket reflects the edit.
        assert_eq!(app.day_items[0].title, "Homework revised");
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn editing_a_plan_updates_stored_progress() {
        let (_dir, mut app) = scratch_app();

        // Nothing selected yet: no form opens.
        app.view_mode = ViewMode::Plans;
        app.open_edit_form();
        assert!(app.form.is_none());

        let mut form = FormState::new_plan(app.selected_date);
        form.title.push_str("Learn Rust");
        submit(&mut app, form);

        app.open_edit_form();
        let mut form = app.form.clone().unwrap();
        form.progress = "75".to_string();
        submit(&mut app, form);

        assert_eq!(app.store().plans().len(), 1);
        assert_eq!(app.store().plans()[0].progress, 75);
        // No linked tasks, so the derived percentage is the stored one.
        assert_eq!(app.plans_with_progress()[0].1, 75);
    }

    #[test]
    fn sorted_tasks_group_by_category_then_due() {
        let (_dir, mut app) = scratch_app();
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        for (title, category, hour) in [
            ("b-late", "math", "11:00"),
            ("a-task", "language", "09:00"),
            ("b-early", "math", "08:00"),
        ] {
            let mut form = FormState::new_task(date);
            form.title.push_str(title);
            form.category.push_str(category);
            form.start_time = hour.to_string();
            submit(&mut app, form);
        }

        let order: Vec<&str> = app.sorted_tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(order, vec!["a-task", "b-early", "b-late"]);
    }

    #[test]
    fn form_kind_follows_the_view() {
        let (_dir, mut app) = scratch_app();
        app.view_mode = ViewMode::Plans;
        app.open_form();
        assert_eq!(app.form.as_ref().unwrap().kind, FormKind::Plan);
        app.close_form();

        app.view_mode = ViewMode::Week;
        app.open_form();
        assert_eq!(app.form.as_ref().unwrap().kind, FormKind::Event);
        app.close_form();
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
