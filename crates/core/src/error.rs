//! Error types for the core library

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Task not found")]
    TaskNotFound(u64),

    #[error("User not found")]
    UserNotFound(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
