//! Task store
//!
//! Owns the ordered task collection. Every mutation holds the write lock
//! until the collection has been handed to the persistence adapter.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::model::{default_tasks, validate_description, validate_title, Task, TaskStatus};
use crate::persistence::{JsonFileAdapter, PersistenceAdapter};
use crate::user::UserStore;
use crate::{next_id, Error, Result};

struct TaskState {
    tasks: Vec<Task>,
    /// Highest id issued so far; ids are never handed out twice.
    last_id: u64,
}

impl TaskState {
    fn position(&self, id: u64) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::TaskNotFound(id))
    }
}

/// Thread-safe task store with file persistence
#[derive(Clone)]
pub struct TaskStore {
    state: Arc<RwLock<TaskState>>,
    adapter: Arc<dyn PersistenceAdapter<Task>>,
}

impl TaskStore {
    /// Load tasks through the given adapter
    pub async fn open(adapter: Arc<dyn PersistenceAdapter<Task>>) -> Self {
        let tasks = adapter.load().await;
        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        tracing::info!(count = tasks.len(), "Task store ready");

        Self {
            state: Arc::new(RwLock::new(TaskState { tasks, last_id })),
            adapter,
        }
    }

    /// Open a store backed by a JSON file, seeded with the default tasks
    pub async fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::open(Arc::new(JsonFileAdapter::new(path, default_tasks()))).await
    }

    /// All tasks in insertion order
    pub async fn list(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    /// Create a new task
    pub async fn add(&self, title: &str, description: &str) -> Result<Task> {
        let title = validate_title(title)?;
        let description = validate_description(description)?;

        let mut state = self.state.write().await;
        let id = next_id(state.last_id, state.tasks.iter().map(|t| t.id));
        let task = Task::new(id, title).with_description(description);
        state.last_id = id;
        state.tasks.push(task.clone());
        self.adapter.save(&state.tasks).await;

        tracing::info!(task_id = id, "Created task");
        Ok(task)
    }

    /// Get a task by ID
    pub async fn get_by_id(&self, id: u64) -> Result<Task> {
        let state = self.state.read().await;
        let index = state.position(id)?;
        Ok(state.tasks[index].clone())
    }

    /// Replace the title and/or description of a task
    pub async fn update(
        &self,
        id: u64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Task> {
        let mut state = self.state.write().await;
        let index = state.position(id)?;

        let title = title.map(validate_title).transpose()?;
        let description = description.map(validate_description).transpose()?;

        let task = &mut state.tasks[index];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = description {
            task.description = description;
        }
        let updated = task.clone();
        self.adapter.save(&state.tasks).await;

        tracing::info!(task_id = id, "Updated task");
        Ok(updated)
    }

    /// Move a task to another status
    pub async fn update_status(&self, id: u64, new_status: &str) -> Result<Task> {
        let mut state = self.state.write().await;
        let index = state.position(id)?;
        let status: TaskStatus = new_status.parse()?;

        state.tasks[index].status = status;
        let updated = state.tasks[index].clone();
        self.adapter.save(&state.tasks).await;

        tracing::info!(task_id = id, %status, "Changed task status");
        Ok(updated)
    }

    /// Assign a task to a user, or clear the assignment with `None`
    pub async fn assign(&self, id: u64, user_id: Option<u64>, users: &UserStore) -> Result<Task> {
        let mut state = self.state.write().await;
        let index = state.position(id)?;

        if let Some(user_id) = user_id {
            if !users.contains(user_id).await {
                return Err(Error::UserNotFound(user_id.to_string()));
            }
        }

        state.tasks[index].assigned_user_id = user_id;
        let updated = state.tasks[index].clone();
        self.adapter.save(&state.tasks).await;

        tracing::info!(task_id = id, ?user_id, "Changed task assignment");
        Ok(updated)
    }

    /// Delete a task by ID
    pub async fn delete(&self, id: u64) -> Result<()> {
        let mut state = self.state.write().await;
        let index = state.position(id)?;
        state.tasks.remove(index);
        self.adapter.save(&state.tasks).await;

        tracing::info!(task_id = id, "Deleted task");
        Ok(())
    }

    /// Tasks whose title or description contains `keyword`, ignoring case.
    /// An empty keyword matches every task.
    pub async fn search(&self, keyword: &str) -> Vec<Task> {
        let keyword = keyword.to_lowercase();
        let state = self.state.read().await;
        state
            .tasks
            .iter()
            .filter(|t| t.matches_keyword(&keyword))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{paginate, TaskQuery, TaskSortField};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    async fn create_test_store() -> (TaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        std::fs::write(&path, "[]").unwrap();
        let store = TaskStore::from_file(&path).await;
        (store, temp_dir)
    }

    async fn create_user_store(temp_dir: &TempDir) -> UserStore {
        UserStore::from_file(temp_dir.path().join("users.json")).await
    }

    #[tokio::test]
    async fn test_missing_file_is_seeded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let store = TaskStore::from_file(&path).await;

        let tasks = store.list().await;
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status, TaskStatus::Todo);
        assert_eq!(tasks[1].status, TaskStatus::Done);
        assert!(path.exists());

        let created = store.add("Third", "").await.unwrap();
        assert_eq!(created.id, 3);
    }

    #[tokio::test]
    async fn test_add_task_trims_and_defaults() {
        let (store, _temp) = create_test_store().await;

        let before = Utc::now();
        let task = store.add("  Hi  ", "").await.unwrap();
        assert_eq!(task.id, 1);
        assert_eq!(task.title, "Hi");
        assert_eq!(task.description, "");
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.created_at >= before - Duration::seconds(5));
        assert!(task.created_at <= Utc::now());

        assert_eq!(store.list().await, vec![task]);
    }

    #[tokio::test]
    async fn test_add_task_validation() {
        let (store, _temp) = create_test_store().await;

        assert!(store.add(&"a".repeat(100), "").await.is_ok());
        assert_eq!(
            store.add(&"a".repeat(101), "").await,
            Err(Error::validation("Title cannot exceed 100 characters"))
        );
        assert_eq!(
            store.add("     ", "").await,
            Err(Error::validation("Title is required"))
        );
        assert_eq!(
            store.add("Valid", &"d".repeat(501)).await,
            Err(Error::validation("Description cannot exceed 500 characters"))
        );
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_get_task() {
        let (store, _temp) = create_test_store().await;
        let task = store.add("Find me", "somewhere").await.unwrap();

        assert_eq!(store.get_by_id(task.id).await.unwrap(), task);
        assert_eq!(store.get_by_id(999).await, Err(Error::TaskNotFound(999)));
    }

    #[tokio::test]
    async fn test_update_task() {
        let (store, _temp) = create_test_store().await;
        let task = store.add("Original", "Original description").await.unwrap();

        let updated = store.update(task.id, Some(" New title "), None).await.unwrap();
        assert_eq!(updated.title, "New title");
        assert_eq!(updated.description, "Original description");

        let updated = store.update(task.id, None, Some("New description")).await.unwrap();
        assert_eq!(updated.title, "New title");
        assert_eq!(updated.description, "New description");
        assert_eq!(updated.id, task.id);
        assert_eq!(updated.status, task.status);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_task_unchanged() {
        let (store, _temp) = create_test_store().await;
        let task = store.add("Keep", "me").await.unwrap();

        let err = store
            .update(task.id, Some("Changed"), Some(&"d".repeat(501)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.update(task.id, Some(""), None).await, Err(Error::validation("Title is required")));
        assert_eq!(store.get_by_id(task.id).await.unwrap(), task);
    }

    #[tokio::test]
    async fn test_update_nonexistent_task() {
        let (store, _temp) = create_test_store().await;
        assert_eq!(
            store.update(42, Some("ok"), Some("ok")).await,
            Err(Error::TaskNotFound(42))
        );
    }

    #[tokio::test]
    async fn test_update_status() {
        let (store, _temp) = create_test_store().await;
        let task = store.add("Move me", "").await.unwrap();

        let updated = store.update_status(task.id, "ONGOING").await.unwrap();
        assert_eq!(updated.status, TaskStatus::Ongoing);

        assert!(matches!(
            store.update_status(task.id, "BLOCKED").await,
            Err(Error::Validation(_))
        ));
        assert_eq!(
            store.update_status(77, "BLOCKED").await,
            Err(Error::TaskNotFound(77))
        );
        assert_eq!(store.get_by_id(task.id).await.unwrap().status, TaskStatus::Ongoing);
    }

    #[tokio::test]
    async fn test_assign_and_unassign() {
        let (store, temp) = create_test_store().await;
        let users = create_user_store(&temp).await;
        let user = users.create("Alice", "alice@example.com").await.unwrap();
        let task = store.add("Assign me", "").await.unwrap();

        let assigned = store.assign(task.id, Some(user.id), &users).await.unwrap();
        assert_eq!(assigned.assigned_user_id, Some(user.id));

        let cleared = store.assign(task.id, None, &users).await.unwrap();
        assert_eq!(cleared.assigned_user_id, None);
    }

    #[tokio::test]
    async fn test_assign_errors() {
        let (store, temp) = create_test_store().await;
        let users = create_user_store(&temp).await;
        let task = store.add("Assign me", "").await.unwrap();

        assert_eq!(
            store.assign(task.id, Some(5), &users).await,
            Err(Error::UserNotFound("5".to_string()))
        );
        assert_eq!(
            store.assign(9, None, &users).await,
            Err(Error::TaskNotFound(9))
        );
        assert!(store.get_by_id(task.id).await.unwrap().assigned_user_id.is_none());
    }

    #[tokio::test]
    async fn test_delete_task() {
        let (store, _temp) = create_test_store().await;
        let task = store.add("Task to delete", "").await.unwrap();

        store.delete(task.id).await.unwrap();
        assert_eq!(store.get_by_id(task.id).await, Err(Error::TaskNotFound(task.id)));
        assert_eq!(store.delete(task.id).await, Err(Error::TaskNotFound(task.id)));
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let (store, _temp) = create_test_store().await;
        store.add("one", "").await.unwrap();
        let second = store.add("two", "").await.unwrap();

        store.delete(second.id).await.unwrap();
        let third = store.add("three", "").await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_search() {
        let (store, _temp) = create_test_store().await;
        store.add("Buy milk", "").await.unwrap();
        store.add("Write report", "quarterly MILK numbers").await.unwrap();
        store.add("Call mom", "").await.unwrap();

        let hits: Vec<String> = store.search("Milk").await.into_iter().map(|t| t.title).collect();
        assert_eq!(hits, ["Buy milk", "Write report"]);

        assert_eq!(store.search("").await.len(), 3);
        assert!(store.search("absent").await.is_empty());
    }

    #[tokio::test]
    async fn test_list_query_and_paginate() {
        let (store, _temp) = create_test_store().await;
        let first = store.add("first", "").await.unwrap();
        let second = store.add("second", "").await.unwrap();
        let third = store.add("third", "").await.unwrap();
        store.update_status(first.id, "DONE").await.unwrap();
        store.update_status(third.id, "ONGOING").await.unwrap();

        let query = TaskQuery {
            sort_by: TaskSortField::Status,
            ascending: true,
            ..Default::default()
        };
        let page = paginate(query.apply(store.list().await), 1, 2).unwrap();
        let ids: Vec<u64> = page.items.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.id, third.id]);
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_loads_records_with_naive_timestamps() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let raw = r#"[{"id":7,"title":"Mine","description":"","status":"TODO","created_at":"2025-06-30T22:00:00.123456"}]"#;
        std::fs::write(&path, raw).unwrap();

        let store = TaskStore::from_file(&path).await;
        let titles: Vec<String> = store.list().await.into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["Mine"]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), raw);

        let next = store.add("Another", "").await.unwrap();
        assert_eq!(next.id, 8);
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        std::fs::write(&path, "[]").unwrap();

        let users = create_user_store(&temp_dir).await;
        let user = users.create("Alice", "alice@example.com").await.unwrap();

        let task_id;
        {
            let store = TaskStore::from_file(&path).await;
            let task = store.add("Persistent task", "Survives a reload").await.unwrap();
            store.update_status(task.id, "ONGOING").await.unwrap();
            store.assign(task.id, Some(user.id), &users).await.unwrap();
            task_id = task.id;
        }

        let store = TaskStore::from_file(&path).await;
        let task = store.get_by_id(task_id).await.unwrap();
        assert_eq!(task.title, "Persistent task");
        assert_eq!(task.description, "Survives a reload");
        assert_eq!(task.status, TaskStatus::Ongoing);
        assert_eq!(task.assigned_user_id, Some(user.id));
    }

    #[tokio::test]
    async fn test_concurrent_adds_get_distinct_ids() {
        let (store, _temp) = create_test_store().await;

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.add(&format!("task {i}"), "").await.unwrap().id })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<u64>>());
    }
}
