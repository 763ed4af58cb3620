use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::ServiceError;

/// A configured user allowed to call the gated routes.
#[derive(Debug, Clone, Deserialize)]
pub struct AppUser {
    pub id: String,
    pub password: String,
}

/// Immutable id → password table, built once at startup.
#[derive(Debug, Default)]
pub struct CredentialTable {
    users: HashMap<String, String>,
}

impl CredentialTable {
    /// Build the table. Two users with the same id abort startup.
    pub fn from_users(users: Vec<AppUser>) -> Result<Self, ServiceError> {
        let mut table = HashMap::with_capacity(users.len());

        for user in users {
            if table.contains_key(&user.id) {
                return Err(ServiceError::DuplicateCredential(user.id));
            }
            table.insert(user.id, user.password);
        }

        Ok(Self { users: table })
    }

    pub fn password_for(&self, id: &str) -> Option<&str> {
        self.users.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
