use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::runner::ExitOutcome;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generate,
    Select,
    Dispatch,
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Generate => write!(f, "generate"),
            Stage::Select => write!(f, "select"),
            Stage::Dispatch => write!(f, "dispatch"),
        }
    }
}

/// Why an external program did not complete successfully
#[derive(Error, Debug)]
pub enum ProcessFailure {
    #[error("could not start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' {outcome}")]
    Exit { program: String, outcome: ExitOutcome },
}

/// Custom error types for the mailer pipeline
#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Generation failed: {0}")]
    GenerationFailed(#[source] ProcessFailure),

    #[error("Artifact not found: no file matching '{pattern}' in '{}'", .dir.display())]
    ArtifactNotFound {
        dir: PathBuf,
        pattern: String,
        #[source]
        source: Option<io::Error>,
    },

    #[error("Send failed: {0}")]
    DispatchFailed(#[source] ProcessFailure),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl MailerError {
    /// Stage that produced the error, `None` for errors raised before the pipeline starts
    pub fn stage(&self) -> Option<Stage> {
        match self {
            MailerError::GenerationFailed(_) => Some(Stage::Generate),
            MailerError::ArtifactNotFound { .. } => Some(Stage::Select),
            MailerError::DispatchFailed(_) => Some(Stage::Dispatch),
            MailerError::Config(_) => None,
        }
    }

    /// Process exit code for this error. Every failure is terminal and maps to 1.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid format in '{}': {reason}", .path.display())]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("unsupported config extension for '{}' (expected .toml or .json)", .path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("[{section}] {reason}")]
    ValidationFailed { section: String, reason: String },
}

/// Convenience Result type with MailerError
pub type Result<T> = std::result::Result<T, MailerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        let err = MailerError::GenerationFailed(ProcessFailure::Exit {
            program: "export".to_string(),
            outcome: ExitOutcome::from_code(2),
        });
        assert_eq!(err.stage(), Some(Stage::Generate));
        assert_eq!(err.exit_code(), 1);

        let err = MailerError::ArtifactNotFound {
            dir: PathBuf::from("."),
            pattern: "chat_ebook_*.pdf".to_string(),
            source: None,
        };
        assert_eq!(err.stage(), Some(Stage::Select));
        assert!(err.to_string().contains("not found"));

        let err = MailerError::Config(ConfigError::ValidationFailed {
            section: "mail".to_string(),
            reason: "recipient is empty".to_string(),
        });
        assert_eq!(err.stage(), None);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_dispatch_message() {
        let err = MailerError::DispatchFailed(ProcessFailure::Exit {
            program: "send-mail".to_string(),
            outcome: ExitOutcome::from_code(3),
        });
        let msg = err.to_string();
        assert!(msg.starts_with("Send failed"));
        assert!(msg.contains("send-mail"));
        assert!(msg.contains("3"));
    }
}
