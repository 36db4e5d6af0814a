use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Days reported for a task whose due date cannot be read, so it sorts last.
pub const MALFORMED_DUE_SENTINEL: i64 = 999;

pub const DEFAULT_CATEGORY: &str = "General";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Task {
    /// Sequential id, unique within the store
    pub id: u64,
    /// Title of the task
    pub title: String,
    /// Free text notes of the task
    pub description: String,
    /// How urgent the task is
    pub priority: Priority,
    /// Deadline as typed by the user, expected as YYYY-MM-DD
    pub due_date: String,
    /// Subject or area the task belongs to
    #[serde(default = "default_category")]
    pub category: String,
    /// Only ever goes from false to true, see [`Task::complete`]
    pub completed: bool,
    /// When the task was created
    pub created_at: Date,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DueDateError {
    #[error("Task has no due date")]
    Missing,

    #[error("Invalid due date '{0}', expected YYYY-MM-DD")]
    Malformed(String),
}

impl Task {
    pub fn new(
        id: u64,
        title: String,
        description: String,
        priority: Priority,
        due_date: String,
        category: Option<String>,
        created_at: Date,
    ) -> Task {
        let category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(default_category);

        Task {
            id,
            title,
            description,
            priority,
            due_date,
            category,
            completed: false,
            created_at,
        }
    }

    pub fn due(&self) -> Result<Date, DueDateError> {
        let raw = self.due_date.trim();
        if raw.is_empty() {
            return Err(DueDateError::Missing);
        }
        Date::strptime("%Y-%m-%d", raw).map_err(|_| DueDateError::Malformed(raw.to_string()))
    }

    /// Unreadable due dates are never overdue.
    pub fn is_overdue(&self, today: Date) -> bool {
        if self.completed {
            return false;
        }
        match self.due() {
            Ok(due) => due < today,
            Err(_) => false,
        }
    }

    /// Signed days from `today` to the due date, or [`MALFORMED_DUE_SENTINEL`].
    pub fn days_until_due(&self, today: Date) -> i64 {
        self.due()
            .ok()
            .and_then(|due| today.until(due).ok())
            .map(|span| i64::from(span.get_days()))
            .unwrap_or(MALFORMED_DUE_SENTINEL)
    }

    /// Returns false if the task was already completed.
    pub fn complete(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        true
    }
}

/// Stored as text. Labels that are not recognized are kept verbatim and
/// rank below every known priority.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    Medium,
    Low,
    Unrecognized(String),
}

impl Priority {
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
            Priority::Unrecognized(_) => 3,
        }
    }

    /// Base points for completing a task of this priority.
    pub fn points(&self) -> u64 {
        match self {
            Priority::High => 30,
            Priority::Medium => 20,
            Priority::Low => 10,
            Priority::Unrecognized(_) => 10,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Unrecognized(label) => label,
        }
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "high" | "alta" => Priority::High,
            "medium" | "media" => Priority::Medium,
            "low" | "baja" => Priority::Low,
            _ => Priority::Unrecognized(value.to_string()),
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Priority::from(value.as_str())
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
