use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A scheduled time block independent of tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl CalendarEvent {
    pub fn new(
        title: String,
        category: String,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description: String::new(),
            category,
            start,
            end,
        }
    }
}
