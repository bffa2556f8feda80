//! Application error type.
//!
//! Every failure that aborts a step ends up here. Row-level problems (bad dates,
//! unresolvable parents) never do: they are logged and skipped where they occur.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// A required credential or setting is absent or still a placeholder.
    #[error("configuration error: {0}")]
    Config(String),

    /// An external feed call failed or returned an undecodable payload.
    #[error("{source_name} request failed: {message}")]
    Fetch {
        source_name: &'static str,
        message: String,
    },

    #[error("storage error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("{0}")]
    Io(String),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn fetch(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::Fetch {
            source_name,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Process exit code for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Io(_) => 2,
            AppError::Fetch { .. } => 4,
            AppError::Store(_) => 5,
        }
    }
}
