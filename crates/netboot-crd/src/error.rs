//! Error types for resource operations

use thiserror::Error;

/// Errors that can occur when working with Groups, Profiles and labels
#[derive(Debug, Error)]
pub enum CrdError {
    /// Invalid MAC address format
    #[error("Invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid field value
    #[error("Invalid value for field '{field}': {message}")]
    InvalidFieldValue { field: String, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for resource operations
pub type Result<T> = std::result::Result<T, CrdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CrdError::MissingField("profile".to_string());
        assert_eq!(err.to_string(), "Missing required field: profile");

        let err = CrdError::InvalidFieldValue {
            field: "id".to_string(),
            message: "must not contain '/'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for field 'id': must not contain '/'"
        );
    }
}
