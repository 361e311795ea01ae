use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Task priority, lowest number = most urgent when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Cycle High -> Medium -> Low -> High (used by form fields).
    pub fn next(&self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::High,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub completed: bool,
    pub due: DateTime<Local>,
    pub created: DateTime<Local>,
    pub updated: DateTime<Local>,
    pub priority: Priority,
    #[serde(default)]
    pub estimated_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<DateTime<Local>>,
    /// Loose association to a learning plan; no referential integrity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
}

impl Task {
    pub fn new(title: String, due: DateTime<Local>, priority: Priority) -> Self {
        let now = Local::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description: String::new(),
            category: String::new(),
            completed: false,
            due,
            created: now,
            updated: now,
            priority,
            estimated_minutes: 0,
            notes: None,
            reminder: None,
            plan_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        let p: Priority = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(p, Priority::Medium);
    }

    #[test]
    fn priority_cycles_through_all_levels() {
        let p = Priority::High;
        assert_eq!(p.next(), Priority::Medium);
        assert_eq!(p.next().next(), Priority::Low);
        assert_eq!(p.next().next().next(), Priority::High);
    }
}
