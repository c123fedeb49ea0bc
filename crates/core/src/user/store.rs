//! User store
//!
//! In-memory user collection backed by a persistence adapter.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::model::{normalize_email, validate_name, User};
use crate::persistence::{JsonFileAdapter, PersistenceAdapter};
use crate::{next_id, Error, Result};

struct UserState {
    users: Vec<User>,
    last_id: u64,
}

/// Thread-safe user store with file persistence
#[derive(Clone)]
pub struct UserStore {
    state: Arc<RwLock<UserState>>,
    adapter: Arc<dyn PersistenceAdapter<User>>,
}

impl UserStore {
    /// Load users through the given adapter
    pub async fn open(adapter: Arc<dyn PersistenceAdapter<User>>) -> Self {
        let users = adapter.load().await;
        let last_id = users.iter().map(|u| u.id).max().unwrap_or(0);
        tracing::info!(count = users.len(), "User store ready");

        Self {
            state: Arc::new(RwLock::new(UserState { users, last_id })),
            adapter,
        }
    }

    /// Open a store backed by a JSON file, seeded with no users
    pub async fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::open(Arc::new(JsonFileAdapter::<User>::new(path, Vec::new()))).await
    }

    /// All users, unsorted
    pub async fn list(&self) -> Vec<User> {
        self.state.read().await.users.clone()
    }

    /// Create a new user
    pub async fn create(&self, name: &str, email: &str) -> Result<User> {
        let name = validate_name(name)?;
        let email = normalize_email(email)?;

        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email.to_lowercase() == email) {
            return Err(Error::validation("Email already in use"));
        }

        let id = next_id(state.last_id, state.users.iter().map(|u| u.id));
        let user = User::new(id, name, email);
        state.last_id = id;
        state.users.push(user.clone());
        self.adapter.save(&state.users).await;

        tracing::info!(user_id = id, "Created user");
        Ok(user)
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, id: u64) -> Result<User> {
        let state = self.state.read().await;
        state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| Error::UserNotFound(id.to_string()))
    }

    /// Whether a user with this id exists
    pub async fn contains(&self, id: u64) -> bool {
        self.state.read().await.users.iter().any(|u| u.id == id)
    }
}
