use mlkids_core::CoreError;

/// Error returned by every store operation.
///
/// Validation failures happen before any I/O; backend failures are passed
/// through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record failed validation (or a stored row failed to decode).
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),
}
