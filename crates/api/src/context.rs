use depot_core::UserId;

/// Principal context for a request (authenticated identity).
///
/// Inserted by the auth middleware; handlers use the display name for
/// `createdBy` / `updatedBy` attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    name: String,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, name: String) -> Self {
        Self { user_id, name }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
