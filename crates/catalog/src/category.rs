use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{CategoryId, DomainError};

/// A category referenced by stock records via `category_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let err = NewCategory { name: "  ".into() }.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
