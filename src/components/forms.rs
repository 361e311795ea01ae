use chrono::{NaiveDate, NaiveTime};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::store::{CalendarEvent, LearningPlan, Priority, Task};
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Event,
    Task,
    Plan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Category,
    Date,
    EndDate,
    StartTime,
    EndTime,
    Estimate,
    Priority,
    Progress,
}

impl FormField {
    fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title:",
            FormField::Category => "Cat:",
            FormField::Date => "Date:",
            FormField::EndDate => "End:",
            FormField::StartTime => "Start:",
            FormField::EndTime => "End:",
            FormField::Estimate => "Est:",
            FormField::Priority => "Prio:",
            FormField::Progress => "Prog:",
        }
    }
}

const EVENT_FIELDS: &[FormField] = &[
    FormField::Title,
    FormField::Category,
    FormField::Date,
    FormField::StartTime,
    FormField::EndTime,
];

const TASK_FIELDS: &[FormField] = &[
    FormField::Title,
    FormField::Category,
    FormField::Date,
    FormField::StartTime,
    FormField::Estimate,
    FormField::Priority,
];

const PLAN_FIELDS: &[FormField] = &[
    FormField::Title,
    FormField::Category,
    FormField::Date,
    FormField::EndDate,
    FormField::Progress,
    FormField::Priority,
];

/// State of the modal form. One struct serves all three record kinds; the
/// field list decides which buffers are in play. Editing an existing record
/// carries its id so submission replaces instead of creating.
#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub title: String,
    pub category: String,
    pub date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub estimate: String,
    pub progress: String,
    pub priority: Priority,
    editing: Option<String>,
    active: usize,
}

impl FormState {
    fn new(kind: FormKind, date: NaiveDate) -> Self {
        let date_str = date.format("%Y-%m-%d").to_string();
        Self {
            kind,
            title: String::new(),
            category: String::new(),
            date: date_str.clone(),
            end_date: date_str,
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            estimate: String::new(),
            progress: String::new(),
            priority: Priority::Medium,
            editing: None,
            active: 0,
        }
    }

    pub fn new_event(date: NaiveDate) -> Self {
        Self::new(FormKind::Event, date)
    }

    pub fn new_task(date: NaiveDate) -> Self {
        Self::new(FormKind::Task, date)
    }

    pub fn new_plan(date: NaiveDate) -> Self {
        Self::new(FormKind::Plan, date)
    }

    pub fn edit_event(event: &CalendarEvent) -> Self {
        Self {
            title: event.title.clone(),
            category: event.category.clone(),
            date: event.start.format("%Y-%m-%d").to_string(),
            start_time: event.start.format("%H:%M").to_string(),
            end_time: event.end.format("%H:%M").to_string(),
            editing: Some(event.id.clone()),
            ..Self::new(FormKind::Event, event.start.date_naive())
        }
    }

    pub fn edit_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            category: task.category.clone(),
            date: task.due.format("%Y-%m-%d").to_string(),
            start_time: task.due.format("%H:%M").to_string(),
            estimate: if task.estimated_minutes > 0 {
                task.estimated_minutes.to_string()
            } else {
                String::new()
            },
            priority: task.priority,
            editing: Some(task.id.clone()),
            ..Self::new(FormKind::Task, task.due.date_naive())
        }
    }

    pub fn edit_plan(plan: &LearningPlan) -> Self {
        Self {
            title: plan.title.clone(),
            category: plan.category.clone(),
            date: plan.start_date.format("%Y-%m-%d").to_string(),
            end_date: plan.end_date.format("%Y-%m-%d").to_string(),
            progress: plan.progress.to_string(),
            priority: plan.priority,
            editing: Some(plan.id.clone()),
            ..Self::new(FormKind::Plan, plan.start_date)
        }
    }

    /// Id of the record being edited; `None` on a create-form.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn fields(&self) -> &'static [FormField] {
        match self.kind {
            FormKind::Event => EVENT_FIELDS,
            FormKind::Task => TASK_FIELDS,
            FormKind::Plan => PLAN_FIELDS,
        }
    }

    pub fn active_field(&self) -> FormField {
        self.fields()[self.active]
    }

    pub fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields().len();
    }

    pub fn prev_field(&mut self) {
        let len = self.fields().len();
        self.active = (self.active + len - 1) % len;
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field() {
            FormField::Title => self.title.push(c),
            FormField::Category => self.category.push(c),
            FormField::Date => self.date.push(c),
            FormField::EndDate => self.end_date.push(c),
            FormField::StartTime => self.start_time.push(c),
            FormField::EndTime => self.end_time.push(c),
            FormField::Estimate => {
                if c.is_ascii_digit() {
                    self.estimate.push(c);
                }
            }
            FormField::Progress => {
                if c.is_ascii_digit() {
                    self.progress.push(c);
                }
            }
            FormField::Priority => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field() {
            FormField::Title => {
                self.title.pop();
            }
            FormField::Category => {
                self.category.pop();
            }
            FormField::Date => {
                self.date.pop();
            }
            FormField::EndDate => {
                self.end_date.pop();
            }
            FormField::StartTime => {
                self.start_time.pop();
            }
            FormField::EndTime => {
                self.end_time.pop();
            }
            FormField::Estimate => {
                self.estimate.pop();
            }
            FormField::Progress => {
                self.progress.pop();
            }
            FormField::Priority => {}
        }
    }

    pub fn cycle_priority(&mut self) {
        self.priority = self.priority.next();
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    pub fn parsed_end_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.end_date, "%Y-%m-%d").ok()
    }

    pub fn parsed_start_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.start_time, "%H:%M").ok()
    }

    pub fn parsed_end_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.end_time, "%H:%M").ok()
    }

    /// Estimated minutes; an empty buffer means "no estimate".
    pub fn parsed_estimate(&self) -> u32 {
        self.estimate.parse().unwrap_or(0)
    }

    /// Stored plan percentage, capped at 100.
    pub fn parsed_progress(&self) -> u8 {
        self.progress.parse::<u32>().unwrap_or(0).min(100) as u8
    }

    pub fn is_valid(&self) -> bool {
        if self.title.is_empty() || self.parsed_date().is_none() {
            return false;
        }
        match self.kind {
            FormKind::Event => {
                self.parsed_start_time().is_some() && self.parsed_end_time().is_some()
            }
            FormKind::Task => self.parsed_start_time().is_some(),
            FormKind::Plan => self.parsed_end_date().is_some(),
        }
    }

    fn popup_title(&self) -> &'static str {
        match (self.kind, self.editing.is_some()) {
            (FormKind::Event, false) => " New Event ",
            (FormKind::Task, false) => " New Task ",
            (FormKind::Plan, false) => " New Plan ",
            (FormKind::Event, true) => " Edit Event ",
            (FormKind::Task, true) => " Edit Task ",
            (FormKind::Plan, true) => " Edit Plan ",
        }
    }

    fn field_value(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.title.clone(),
            FormField::Category => self.category.clone(),
            FormField::Date => self.date.clone(),
            FormField::EndDate => self.end_date.clone(),
            FormField::StartTime => self.start_time.clone(),
            FormField::EndTime => self.end_time.clone(),
            FormField::Estimate => {
                if self.estimate.is_empty() {
                    "(none)".to_string()
                } else {
                    format!("{} min", self.estimate)
                }
            }
            FormField::Progress => format!("{}%", self.parsed_progress()),
            FormField::Priority => format!("< {} >", self.priority.label()),
        }
    }
}

pub struct Form;

impl Form {
    pub fn render(frame: &mut Frame, area: Rect, state: &FormState) {
        let fields = state.fields();

        // Center the form popup
        let form_w = area.width.min(50).max(30);
        let form_h = (fields.len() as u16 + 4).min(area.height);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h);

        frame.render_widget(Clear, form_area);

        let block = Block::default()
            .title(state.popup_title())
            .title_style(
                Style::default()
                    .fg(ratatui::style::Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ratatui::style::Color::Green));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(1)).collect();
        constraints.push(Constraint::Length(1)); // spacer
        constraints.push(Constraint::Length(1)); // help
        constraints.push(Constraint::Min(0));
        let rows = Layout::vertical(constraints).split(inner);

        for (i, field) in fields.iter().enumerate() {
            render_field(
                frame,
                rows[i],
                field.label(),
                &state.field_value(*field),
                state.active_field() == *field,
            );
        }

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", theme::current().dim),
            Span::styled("Space", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cycle ", theme::current().dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", theme::current().dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", theme::current().dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[fields.len() + 1]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let cursor = if active { "_" } else { "" };

    let style = if active {
        Style::default().fg(ratatui::style::Color::Cyan)
    } else {
        Style::default()
    };

    let spans = vec![
        Span::styled(format!("{:<7}", label), theme::current().dim),
        Span::styled(format!("{}{}", value, cursor), style),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march_tenth() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn event_form_needs_title_and_times() {
        let mut form = FormState::new_event(march_tenth());
        assert!(!form.is_valid());
        form.title.push_str("Lecture");
        assert!(form.is_valid());
        form.end_time = "25:99".to_string();
        assert!(!form.is_valid());
    }

    #[test]
    fn task_form_ignores_event_only_fields() {
        let mut form = FormState::new_task(march_tenth());
        form.title.push_str("Homework");
        form.end_time.clear(); // not part of the task field set
        assert!(form.is_valid());
        assert!(!form.fields().contains(&FormField::EndTime));
    }

    #[test]
    fn plan_form_needs_both_dates() {
        let mut form = FormState::new_plan(march_tenth());
        form.title.push_str("Learn Rust");
        assert!(form.is_valid());
        form.end_date = "soon".to_string();
        assert!(!form.is_valid());
    }

    #[test]
    fn field_cycling_wraps_both_ways() {
        let mut form = FormState::new_event(march_tenth());
        assert_eq!(form.active_field(), FormField::Title);
        form.prev_field();
        assert_eq!(form.active_field(), FormField::EndTime);
        form.next_field();
        assert_eq!(form.active_field(), FormField::Title);
    }

    #[test]
    fn estimate_takes_digits_only() {
        let mut form = FormState::new_task(march_tenth());
        while form.active_field() != FormField::Estimate {
            form.next_field();
        }
        form.input_char('4');
        form.input_char('x');
        form.input_char('5');
        assert_eq!(form.parsed_estimate(), 45);
    }

    #[test]
    fn edit_forms_prefill_from_the_record() {
        use chrono::{Local, TimeZone};

        let due = Local.with_ymd_and_hms(2026, 3, 10, 18, 30, 0).unwrap();
        let mut task = crate::store::Task::new("Essay".into(), due, Priority::High);
        task.category.push_str("language");
        task.estimated_minutes = 45;

        let form = FormState::edit_task(&task);
        assert_eq!(form.editing_id(), Some(task.id.as_str()));
        assert_eq!(form.title, "Essay");
        assert_eq!(form.date, "2026-03-10");
        assert_eq!(form.start_time, "18:30");
        assert_eq!(form.estimate, "45");
        assert_eq!(form.priority, Priority::High);
        assert!(form.is_valid());

        assert!(FormState::new_task(march_tenth()).editing_id().is_none());
    }

    #[test]
    fn plan_progress_is_digits_only_and_capped() {
        let mut plan = crate::store::LearningPlan::new(
            "Rust".into(),
            "programming".into(),
            march_tenth(),
            NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
            Priority::Medium,
        );
        plan.progress = 40;

        let mut form = FormState::edit_plan(&plan);
        assert_eq!(form.progress, "40");

        while form.active_field() != FormField::Progress {
            form.next_field();
        }
        form.input_char('0');
        form.input_char('x');
        assert_eq!(form.progress, "400");
        assert_eq!(form.parsed_progress(), 100);
    }

    #[test]
    fn priority_cycles_with_space() {
        let mut form = FormState::new_task(march_tenth());
        assert_eq!(form.priority, Priority::Medium);
        form.cycle_priority();
        assert_eq!(form.priority, Priority::Low);
        form.cycle_priority();
        assert_eq!(form.priority, Priority::High);
    }
}
