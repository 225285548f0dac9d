//! Errors raised by termination policies

use thiserror::Error;

/// Failure returned by a value handler
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Anomalies a policy may choose to raise
#[derive(Debug, Error)]
pub enum TerminatorError {
    /// A placeholder key has no declaration
    #[error("unhandled placeholder '{key}' at {index}: {original}")]
    UnhandledPlaceholder {
        key: String,
        index: usize,
        original: String,
    },

    /// The handler for a placeholder failed to produce a value
    #[error("failed to process placeholder '{key}' at {index}: {source}")]
    Processing {
        key: String,
        index: usize,
        #[source]
        source: HandlerError,
    },

    /// A declared key never appeared in the template
    #[error("placeholder '{key}' is declared but never used")]
    SetupToNowhere { key: String },

    /// A key was declared a second time
    #[error("placeholder '{key}' is already declared")]
    Override { key: String },

    /// The template ended inside a placeholder
    #[error("template ends inside placeholder '{key}' opened at {index}: {original}")]
    UnexpectedEndOfInput {
        key: String,
        index: usize,
        original: String,
    },
}

impl TerminatorError {
    /// The placeholder key the anomaly is about
    pub fn key(&self) -> &str {
        match self {
            Self::UnhandledPlaceholder { key, .. }
            | Self::Processing { key, .. }
            | Self::SetupToNowhere { key }
            | Self::Override { key }
            | Self::UnexpectedEndOfInput { key, .. } => key,
        }
    }

    /// Short machine-friendly name of the anomaly
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnhandledPlaceholder { .. } => "unhandled_placeholder",
            Self::Processing { .. } => "processing",
            Self::SetupToNowhere { .. } => "setup_to_nowhere",
            Self::Override { .. } => "override",
            Self::UnexpectedEndOfInput { .. } => "unexpected_end_of_input",
        }
    }
}
