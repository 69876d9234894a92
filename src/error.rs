//! Error types for pm-onboard.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Document Store errors. Each variant maps to one HTTP status in the
/// route layer; the display string becomes the `detail` field.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Missing required: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("Onboarding for project {0} is already committed")]
    Committed(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl StoreError {
    /// HTTP status the route layer answers with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidInput(_) | Self::MissingRequired(_) => 400,
            Self::Committed(_) => 409,
            Self::Database(_) => 500,
        }
    }
}

/// Failure of an HTTP round trip, as seen by the client.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Non-2xx response. `message` is the server `detail`, the raw body, or
    /// `HTTP <status>`, in that order of preference.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl TransportError {
    /// HTTP status code, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors surfaced by wizard actions.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("No project selected")]
    NoProject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_lists_fields() {
        let err = StoreError::MissingRequired(vec![
            "identity.name".to_string(),
            "intent.problem_statement".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required: identity.name, intent.problem_statement"
        );
    }

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(StoreError::NotFound("x".into()).http_status(), 404);
        assert_eq!(StoreError::MissingRequired(vec![]).http_status(), 400);
        assert_eq!(StoreError::Committed("x".into()).http_status(), 409);
        assert_eq!(
            StoreError::Database(DatabaseError::Query("boom".into())).http_status(),
            500
        );
    }

    #[test]
    fn transport_status_displays_message_only() {
        let err = TransportError::Status {
            status: 404,
            message: "Project not found: x".to_string(),
        };
        assert_eq!(err.to_string(), "Project not found: x");
        assert_eq!(err.status(), Some(404));
        assert_eq!(TransportError::Network("refused".into()).status(), None);
    }

    #[test]
    fn wizard_error_wraps_transport_transparently() {
        let err: WizardError = TransportError::Status {
            status: 400,
            message: "bad".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "bad");
    }
}
