use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, UserId};

/// A stored user account. `password_hash` is a PHC string and must never
/// leave the backend; response mapping strips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub time: DateTime<Utc>,
}

/// Registration input, password still in the clear.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("a valid email is required"));
        }
        if self.password.len() < 8 {
            return Err(DomainError::validation(
                "password must be at least 8 characters",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            name: "Ava".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_reasonable_input() {
        assert!(new_user("ava@example.com", "hunter2hunter2").validate().is_ok());
    }

    #[test]
    fn rejects_bad_email_and_short_password() {
        assert!(new_user("not-an-email", "hunter2hunter2").validate().is_err());
        assert!(new_user("ava@example.com", "short").validate().is_err());
    }
}
