use crate::types::DbId;
use crate::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Field-level validation failures, keyed by input field name.
    #[error("Validation failed: {0}")]
    InvalidFields(FieldErrors),

    /// A workflow action was attempted from a status that does not permit it.
    #[error("Cannot {action} {entity} {id} while it is {from}")]
    InvalidTransition {
        entity: &'static str,
        id: DbId,
        from: String,
        action: &'static str,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
