//! Derived schedule data: tasks and events merged into day/hour buckets,
//! month/week grids and progress percentages. Everything here is a pure
//! function over the store's record types.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Timelike};

use crate::store::{CalendarEvent, LearningPlan, Priority, Task};

/// Hour slots shown in the day view, 8 AM up to (not including) 8 PM.
pub const DAY_START_HOUR: u32 = 8;
pub const DAY_END_HOUR: u32 = 20;

/// An event, or an incomplete task projected into an event-shaped block.
#[derive(Debug, Clone)]
pub struct ScheduleItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    /// Set for tasks, None for plain events.
    pub priority: Option<Priority>,
    pub is_task: bool,
}

impl ScheduleItem {
    fn from_event(event: &CalendarEvent) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            description: event.description.clone(),
            category: event.category.clone(),
            start: event.start,
            end: event.end,
            priority: None,
            is_task: false,
        }
    }

    /// A task occupies its estimated duration starting at the due time;
    /// tasks without an estimate default to a one-hour block.
    fn from_task(task: &Task) -> Self {
        let minutes = if task.estimated_minutes == 0 {
            60
        } else {
            task.estimated_minutes
        };
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            category: task.category.clone(),
            start: task.due,
            end: task.due + Duration::minutes(minutes as i64),
            priority: Some(task.priority),
            is_task: true,
        }
    }

    pub fn duration_display(&self) -> String {
        format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// All schedule items starting on `date`: events first, then incomplete
/// tasks due that day, sorted by start time. Completed tasks never appear.
pub fn items_for_date(
    events: &[CalendarEvent],
    tasks: &[Task],
    date: NaiveDate,
) -> Vec<ScheduleItem> {
    let mut items: Vec<ScheduleItem> = events
        .iter()
        .filter(|e| e.start.date_naive() == date)
        .map(ScheduleItem::from_event)
        .collect();
    items.extend(
        tasks
            .iter()
            .filter(|t| !t.completed && t.due.date_naive() == date)
            .map(ScheduleItem::from_task),
    );
    items.sort_by_key(|i| i.start);
    items
}

/// The day bucket restricted to items starting within the given hour.
pub fn items_for_hour(items: &[ScheduleItem], hour: u32) -> Vec<&ScheduleItem> {
    items.iter().filter(|i| i.start.hour() == hour).collect()
}

/// Days of the focus month that have at least one schedule item.
pub fn days_with_items(
    events: &[CalendarEvent],
    tasks: &[Task],
    year: i32,
    month: u32,
) -> HashSet<u32> {
    let mut days = HashSet::new();
    for event in events {
        let d = event.start.date_naive();
        if d.year() == year && d.month() == month {
            days.insert(d.day());
        }
    }
    for task in tasks.iter().filter(|t| !t.completed) {
        let d = task.due.date_naive();
        if d.year() == year && d.month() == month {
            days.insert(d.day());
        }
    }
    days
}

/// A cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
}

/// Monday-first month grid: full weeks padded with the trailing days of the
/// previous month and the leading days of the next one.
pub fn month_grid(year: i32, month: u32) -> Vec<[DayCell; 7]> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month");
    let lead = first.weekday().num_days_from_monday();
    let grid_start = first - Duration::days(lead as i64);

    let total = lead + days_in_month(year, month);
    let rows = total.div_ceil(7);

    (0..rows)
        .map(|row| {
            std::array::from_fn(|col| {
                let date = grid_start + Duration::days((row * 7) as i64 + col as i64);
                DayCell {
                    date,
                    in_month: date.year() == year && date.month() == month,
                }
            })
        })
        .collect()
}

/// The Monday..Sunday week containing `date`.
pub fn week_of(date: NaiveDate) -> [NaiveDate; 7] {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid month")
    .signed_duration_since(NaiveDate::from_ymd_opt(year, month, 1).expect("valid month"))
    .num_days() as u32
}

pub fn month_title(date: NaiveDate) -> String {
    format!("{}", date.format("%B %Y"))
}

/// Week header, eliding the month name when the week stays inside one month.
pub fn week_title(date: NaiveDate) -> String {
    let week = week_of(date);
    let (start, end) = (week[0], week[6]);
    if start.month() == end.month() {
        format!("{} - {} {}", start.day(), end.day(), start.format("%B %Y"))
    } else {
        format!(
            "{} {} - {} {} {}",
            start.day(),
            start.format("%b"),
            end.day(),
            end.format("%b"),
            start.format("%Y")
        )
    }
}

pub fn day_title(date: NaiveDate) -> String {
    format!("{}", date.format("%A, %B %d, %Y"))
}

/// Dashboard numbers: completed vs. total tasks and the estimated minutes
/// already worked through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub minutes_done: u32,
}

pub fn overall_progress(tasks: &[Task]) -> ProgressSummary {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let minutes_done = tasks
        .iter()
        .filter(|t| t.completed)
        .map(|t| t.estimated_minutes)
        .sum();
    ProgressSummary {
        completed,
        total,
        percent: percentage(completed, total),
        minutes_done,
    }
}

/// Plan progress derived from the tasks referencing it; a plan with no
/// linked tasks keeps showing its stored percentage.
pub fn plan_progress(plan: &LearningPlan, tasks: &[Task]) -> u8 {
    let linked: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.plan_id.as_deref() == Some(plan.id.as_str()))
        .collect();
    if linked.is_empty() {
        return plan.progress;
    }
    let completed = linked.iter().filter(|t| t.completed).count();
    percentage(completed, linked.len())
}

/// The `limit` soonest-due incomplete tasks.
pub fn upcoming_tasks(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut upcoming: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
    upcoming.sort_by_key(|t| t.due);
    upcoming.truncate(limit);
    upcoming
}

fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        0
    } else {
        (part as f64 * 100.0 / whole as f64).round() as u8
    }
}
