//! Person records.
//!
//! A person is one registered user. The `user_id` is the only key the rest
//! of the system uses; `internal_id` is handed out by the graph store when
//! the person is inserted and never changes afterwards.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A user of the network, as stored on a graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Store-assigned identifier. Zero until the person is inserted.
    #[serde(default)]
    pub internal_id: u64,

    /// External, unique identifier used for all lookups.
    pub user_id: String,

    /// Display name.
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub company: Option<String>,

    /// Job title as printed on the card.
    #[serde(default)]
    pub position: Option<String>,
}

impl Person {
    /// Creates a person with only the required fields set.
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            internal_id: 0,
            user_id: user_id.into(),
            name: name.into(),
            email: None,
            company: None,
            position: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    /// Checks that the record can be used as a graph key.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        if self.user_id.chars().any(char::is_whitespace) {
            return Err(ValidationError::WhitespaceInUserId(self.user_id.clone()));
        }
        Ok(())
    }

    /// Applies an attribute update in place. Identity fields are untouched.
    pub fn apply(&mut self, update: PersonUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        if let Some(company) = update.company {
            self.company = Some(company);
        }
        if let Some(position) = update.position {
            self.position = Some(position);
        }
    }
}

/// A partial attribute change coming from the profile service.
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
}

impl PersonUpdate {
    /// True when the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.company.is_none()
            && self.position.is_none()
    }
}
