use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::task::Priority;

/// A longer-horizon goal with a progress percentage, loosely associated
/// with tasks through their optional plan id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPlan {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Stored percentage, shown when no tasks reference the plan.
    #[serde(default)]
    pub progress: u8,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LearningPlan {
    pub fn new(
        title: String,
        category: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        priority: Priority,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description: String::new(),
            category,
            start_date,
            end_date,
            progress: 0,
            priority,
            notes: None,
        }
    }

    pub fn date_range_display(&self) -> String {
        format!(
            "{} - {}",
            self.start_date.format("%b %d, %Y"),
            self.end_date.format("%b %d, %Y")
        )
    }
}
