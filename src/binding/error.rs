//! Errors raised by the binding pipeline

use thiserror::Error;

/// Binding errors are stored in module state and handed to several readers,
/// so they carry rendered messages instead of source errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// A data source could not produce a value and no fallback applied.
    #[error("Data source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    /// A computed data source was registered without its function.
    #[error("Computed data source '{0}' has no computation function")]
    MissingComputation(String),

    /// A transform stage failed.
    #[error("Transform failed: {0}")]
    Transform(String),

    /// No module is registered under the identifier.
    #[error("Module '{0}' not found")]
    ModuleNotFound(String),

    /// A descriptor or configuration file is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BindingError {
    pub fn transform(message: impl Into<String>) -> Self {
        BindingError::Transform(message.into())
    }

    /// Configuration problems are reported through module state even when
    /// other sources succeed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BindingError::MissingComputation(_) | BindingError::Config(_)
        )
    }
}
