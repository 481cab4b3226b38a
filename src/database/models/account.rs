use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::whiskey::{FieldError, OwnerId};
use crate::types::Role;

/// A collector known to the service.
///
/// Accounts are provisioned the first time a valid token for their id is
/// seen; from then on the stored role is the one that counts.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Account {
    pub id: OwnerId,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(id: OwnerId, username: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.into(),
            email: None,
            first_name: None,
            last_name: None,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated profile change; empty strings clear a field
    pub fn apply_profile(&mut self, profile: ProfileUpdate) {
        if let Some(email) = profile.email {
            self.email = blank_to_none(email);
        }
        if let Some(first_name) = profile.first_name {
            self.first_name = blank_to_none(first_name);
        }
        if let Some(last_name) = profile.last_name {
            self.last_name = blank_to_none(last_name);
        }
        self.updated_at = Utc::now();
    }
}

/// Outcome of looking up the account behind a token
#[derive(Debug, Clone, PartialEq)]
pub enum AccountStatus {
    Active(Account),
    Removed,
}

/// Editable profile fields. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    #[serde(alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(alias = "lastName")]
    pub last_name: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), FieldError> {
        if let Some(email) = self.email.as_deref().map(str::trim) {
            let well_formed = match email.split_once('@') {
                Some((local, domain)) => !local.is_empty() && domain.contains('.'),
                None => false,
            };
            if !email.is_empty() && !well_formed {
                return Err(FieldError::new("email", "Invalid email address"));
            }
        }
        Ok(())
    }
}

fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
