use thiserror::Error;

use depot_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Infrastructure-level error for persistence, files, and spreadsheets.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("not found")]
    NotFound,

    #[error("spreadsheet error: {0}")]
    Sheet(String),

    #[error("attachment error: {0}")]
    Attachment(#[from] std::io::Error),
}

impl StoreError {
    pub fn sheet(msg: impl Into<String>) -> Self {
        Self::Sheet(msg.into())
    }

    /// True for errors caused by the client's input rather than the system.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound | StoreError::Domain(_) | StoreError::Sheet(_)
        )
    }
}
