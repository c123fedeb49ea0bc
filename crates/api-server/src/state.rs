//! Application state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use taskboard_core::task::TaskStore;
use taskboard_core::user::UserStore;

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    data_dir: PathBuf,
    task_store: TaskStore,
    user_store: UserStore,
}

impl AppState {
    /// Load both stores from the configured data directory
    pub async fn new(config: &ServerConfig) -> Self {
        let task_store = TaskStore::from_file(config.tasks_path()).await;
        let user_store = UserStore::from_file(config.users_path()).await;
        Self::with_stores(config.data_dir.clone(), task_store, user_store)
    }

    pub fn with_stores(data_dir: PathBuf, task_store: TaskStore, user_store: UserStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                data_dir,
                task_store,
                user_store,
            }),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &TaskStore {
        &self.inner.task_store
    }

    /// Get reference to the user store
    pub fn user_store(&self) -> &UserStore {
        &self.inner.user_store
    }
}
