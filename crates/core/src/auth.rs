//! Admin credential checking.
//!
//! The admin panel only needs a yes/no answer for a username and password.
//! [`CredentialCheck`] is the seam; [`StaticCredentials`] is the single
//! configured account used today.

use crate::error::CoreError;

/// Decides whether a username/password pair may use the admin panel.
pub trait CredentialCheck: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// One fixed account, loaded from configuration.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl CredentialCheck for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        // Evaluate both comparisons so timing does not reveal which one failed.
        let user_ok = constant_time_eq(self.username.as_bytes(), username.trim().as_bytes());
        let pass_ok = constant_time_eq(self.password.as_bytes(), password.trim().as_bytes());
        user_ok & pass_ok
    }
}

/// Run `check` and turn a rejection into [`CoreError::Unauthorized`].
pub fn authenticate(
    check: &dyn CredentialCheck,
    username: &str,
    password: &str,
) -> Result<(), CoreError> {
    if check.verify(username, password) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(
            "Invalid username or password".into(),
        ))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
