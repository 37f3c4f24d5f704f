//! Error types for the directory client.

use thiserror::Error;

/// Result type alias for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Main error type for directory operations
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid directory response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("no active classroom selected")]
    NoActiveClassroom,

    #[error("user has no identifier")]
    MissingUserId,

    #[error("no email or mobile available to send password resets")]
    MissingResetDestination,

    #[error("selection contains protected accounts and cannot be removed")]
    ProtectedSelection,

    #[error("preference store error: {message}")]
    Preferences { message: String },

    #[error("invalid user data: {message}")]
    InvalidUserData { message: String },
}

impl DirectoryError {
    /// Create a preference store error
    pub fn preferences(message: impl Into<String>) -> Self {
        Self::Preferences {
            message: message.into(),
        }
    }

    /// Create an invalid user data error
    pub fn invalid_user_data(message: impl Into<String>) -> Self {
        Self::InvalidUserData {
            message: message.into(),
        }
    }

    /// True for errors raised by the transport layer rather than by local checks
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::InvalidResponse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DirectoryError::NoActiveClassroom.to_string(),
            "no active classroom selected"
        );
        assert_eq!(
            DirectoryError::preferences("disk full").to_string(),
            "preference store error: disk full"
        );
        assert!(!DirectoryError::ProtectedSelection.is_transport());
    }
}
