use crate::api::error::ApiError;
use crate::binding::BindingError;
use crate::logging::LogLevel;

/// Maps failures to the level they are logged and reported at.
#[derive(Debug, Clone)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_api_error(&self, error: &ApiError) -> LogLevel {
        match error {
            // Rate limiting - low priority
            ApiError::Http { status, .. } if *status == 429 => LogLevel::Debug,

            // Server errors - temporary issues
            ApiError::Http { status, .. } if (500..=599).contains(status) => LogLevel::Warn,

            // Authentication errors - critical
            ApiError::Unauthorized => LogLevel::Error,
            ApiError::Http { status, .. } if *status == 403 => LogLevel::Error,

            // Backend answered with something that is not JSON
            ApiError::Decode(_) => LogLevel::Error,

            // Network issues - usually temporary
            _ => LogLevel::Warn,
        }
    }

    pub fn classify_binding_error(&self, error: &BindingError) -> LogLevel {
        match error {
            BindingError::Source { .. } => LogLevel::Warn,
            BindingError::Transform(_) => LogLevel::Warn,

            // Fixable only by editing the dashboard configuration
            BindingError::MissingComputation(_) => LogLevel::Error,
            BindingError::Config(_) => LogLevel::Error,
            BindingError::ModuleNotFound(_) => LogLevel::Error,
        }
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}
