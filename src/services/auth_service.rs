use std::sync::Arc;

use crate::state::credentials::CredentialTable;

/// Checks `id:password` credential headers against the configured users.
///
/// This is not HTTP Basic auth: the header carries the pair as plain text,
/// split on `:`. Exactly two parts are required, so a password that itself
/// contains `:` can never authenticate.
///
/// Passwords are compared with plain string equality, which is not
/// constant-time.
#[derive(Debug, Clone)]
pub struct AuthGate {
    credentials: Arc<CredentialTable>,
}

impl AuthGate {
    pub fn new(credentials: Arc<CredentialTable>) -> Self {
        Self { credentials }
    }

    /// True only when the header names a known id with its exact password.
    /// Every failure looks the same to the caller.
    pub fn authenticate(&self, header_value: Option<&str>) -> bool {
        let Some(header_value) = header_value else {
            return false;
        };

        let mut parts = header_value.split(':');
        let (Some(id), Some(password), None) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };

        match self.credentials.password_for(id) {
            Some(expected) => expected == password,
            None => false,
        }
    }
}
