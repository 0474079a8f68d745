use ghm_issues::CommandParseError;
use thiserror::Error;

use crate::platform::PlatformError;

/// Fatal conditions of one command run. The `Display` text is what the
/// requester reads in the failure comment, after redaction.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("{0}")]
    Parse(#[from] CommandParseError),
    #[error("{message}")]
    Authorization { message: String },
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}: {source}")]
    Remote {
        message: String,
        #[source]
        source: PlatformError,
    },
}

impl ManagerError {
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>, source: PlatformError) -> Self {
        Self::Remote {
            message: message.into(),
            source,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ManagerError::Parse(_) => "parse",
            ManagerError::Authorization { .. } => "authorization",
            ManagerError::NotFound { .. } => "not_found",
            ManagerError::Remote { .. } => "remote",
        }
    }
}
