//! Filtering, sorting and pagination over store listings
//!
//! Everything here is pure: callers take a snapshot from a store and run it
//! through these functions.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use crate::task::{Task, TaskStatus};
use crate::user::User;
use crate::{Error, Result};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// One page of results plus totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Slice `items` into the requested 1-based page.
///
/// A page past the end yields an empty `items` list rather than an error.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Result<Page<T>> {
    if page < 1 {
        return Err(Error::validation("Page must be >= 1"));
    }
    if page_size < 1 {
        return Err(Error::validation("Page size must be >= 1"));
    }

    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);

    let items = if start >= total_items {
        Vec::new()
    } else {
        items.into_iter().skip(start).take(page_size).collect()
    };

    Ok(Page {
        items,
        total_items,
        total_pages,
        page,
        page_size,
    })
}

/// Field tasks can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSortField {
    #[default]
    CreatedAt,
    Title,
    Status,
}

impl FromStr for TaskSortField {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "created_at" => Ok(Self::CreatedAt),
            "title" => Ok(Self::Title),
            "status" => Ok(Self::Status),
            _ => Err(Error::validation(
                "Invalid sort_by. Allowed values: created_at, title, status",
            )),
        }
    }
}

/// Filter and ordering applied to a task listing
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub sort_by: TaskSortField,
    pub ascending: bool,
}

impl TaskQuery {
    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = match self.sort_by {
            TaskSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            TaskSortField::Title => a.title.cmp(&b.title),
            TaskSortField::Status => a.status.cmp(&b.status),
        };
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }

    /// Filter then sort. The sort is stable so equal keys keep store order
    /// in both directions.
    pub fn apply(&self, tasks: Vec<Task>) -> Vec<Task> {
        let mut tasks: Vec<Task> = match self.status {
            Some(status) => tasks.into_iter().filter(|t| t.status == status).collect(),
            None => tasks,
        };
        tasks.sort_by(|a, b| self.compare(a, b));
        tasks
    }
}

/// Ascending, case-insensitive by name
pub fn sort_users_by_name(users: &mut [User]) {
    users.sort_by_cached_key(|u| u.name.to_lowercase());
}
