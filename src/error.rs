//! Custom error types and handling
//!
//! Only request-level failures are errors. Everything that can go wrong while
//! compiling or running a submission is recorded inside the verdict instead.

/// Engine-wide error type
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    // Request errors
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Host errors
    #[error("Workspace error: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("Docker error: {0}")]
    Docker(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl JudgeError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedLanguage(_) => "UNSUPPORTED_LANGUAGE",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Workspace(_) => "WORKSPACE_ERROR",
            Self::Docker(_) => "DOCKER_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Whether the caller can fix this by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnsupportedLanguage(_) | Self::InvalidRequest(_))
    }
}

impl From<bollard::errors::Error> for JudgeError {
    fn from(err: bollard::errors::Error) -> Self {
        JudgeError::Docker(err.to_string())
    }
}

impl From<validator::ValidationErrors> for JudgeError {
    fn from(err: validator::ValidationErrors) -> Self {
        JudgeError::InvalidRequest(err.to_string())
    }
}

impl From<crate::config::ConfigError> for JudgeError {
    fn from(err: crate::config::ConfigError) -> Self {
        JudgeError::Configuration(err.to_string())
    }
}

/// Result type alias using JudgeError
pub type JudgeResult<T> = Result<T, JudgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            JudgeError::UnsupportedLanguage("java".into()).error_code(),
            "UNSUPPORTED_LANGUAGE"
        );
        assert_eq!(
            JudgeError::Docker("socket".into()).error_code(),
            "DOCKER_ERROR"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(JudgeError::UnsupportedLanguage("java".into()).is_client_error());
        assert!(JudgeError::InvalidRequest("oversized code".into()).is_client_error());
        assert!(!JudgeError::Configuration("bad".into()).is_client_error());
    }
}
