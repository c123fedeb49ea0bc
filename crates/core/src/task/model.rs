//! Task model definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Task status. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Todo,
    Ongoing,
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::Ongoing, Self::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::Ongoing => "ONGOING",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| Error::validation("Invalid status. Allowed values: TODO, ONGOING, DONE"))
    }
}

/// A task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub assigned_user_id: Option<u64>,
}

impl Task {
    /// Create a new TODO task. Title and description are expected to be
    /// validated already.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            created_at: Utc::now(),
            assigned_user_id: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Case-insensitive substring match on title or description
    pub fn matches_keyword(&self, keyword_lower: &str) -> bool {
        self.title.to_lowercase().contains(keyword_lower)
            || self.description.to_lowercase().contains(keyword_lower)
    }
}

/// Trim and check a title
pub fn validate_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::validation("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(Error::validation(format!(
            "Title cannot exceed {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

/// Trim and check a description
pub fn validate_description(raw: &str) -> Result<String> {
    let description = raw.trim();
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(Error::validation(format!(
            "Description cannot exceed {MAX_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(description.to_string())
}

/// Parse a task id from raw request input
pub fn parse_task_id(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(Error::validation("Invalid ID format")),
    }
}

/// Seed tasks written when no task file exists yet
pub fn default_tasks() -> Vec<Task> {
    vec![
        Task::new(1, "First task").with_description("Description of the first task"),
        Task::new(2, "Second task")
            .with_description("Description of the second task")
            .with_status(TaskStatus::Done),
    ]
}
