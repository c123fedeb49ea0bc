//! User model definitions

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const MAX_NAME_CHARS: usize = 50;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("Invalid email regex pattern"));

/// A user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }
}

/// Trim and check a user name
pub fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::validation("Name is required"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(Error::validation(format!(
            "Name cannot exceed {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

/// Trim, lower-case and check the shape of an email address
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(Error::validation("Invalid email format"));
    }
    Ok(email)
}

/// Parse a user id from raw request input. Anything unparseable cannot name
/// an existing user.
pub fn parse_user_id(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::UserNotFound(raw.to_string()))
}
