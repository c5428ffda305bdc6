//! Domain errors shared by every crate in the workspace.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: DbId },

    /// Lookup by a public identifier (form short id, block uuid, session
    /// token) found nothing.
    #[error("{entity} '{key}' does not exist")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// [`CoreError::NotFoundByKey`] for `entity` looked up by `key`.
    pub fn missing(entity: &'static str, key: impl Into<String>) -> Self {
        CoreError::NotFoundByKey {
            entity,
            key: key.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_names_entity_and_key() {
        let err = CoreError::missing("Form", "aB3x");
        assert_eq!(err.to_string(), "Form 'aB3x' does not exist");
    }
}
