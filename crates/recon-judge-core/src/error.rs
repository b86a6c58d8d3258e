//! Error types for judging runs.

use std::fmt;
use std::path::PathBuf;

/// Which upstream record a document input refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Claims,
    Reconstruction,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claims => f.write_str("claims"),
            Self::Reconstruction => f.write_str("reconstruction"),
        }
    }
}

/// Judge errors.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    /// Required credential missing or configuration unusable.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The judgment call failed after retries, or hit a non-retryable response.
    #[error("judgment invocation failed after {attempts} attempt(s): {message}")]
    Invocation {
        attempts: u32,
        status: Option<u16>,
        message: String,
    },

    /// Model output could not be parsed into the expected schema.
    #[error("malformed judgment output: {message}")]
    MalformedOutput { message: String },

    /// Claims or reconstruction file missing for a document.
    #[error("no {kind} input found for {doc_id} at {}", .path.display())]
    InputNotFound {
        doc_id: String,
        kind: InputKind,
        path: PathBuf,
    },

    /// Input file exists but could not be read or parsed.
    #[error("invalid {kind} input at {}: {message}", .path.display())]
    InvalidInput {
        kind: InputKind,
        path: PathBuf,
        message: String,
    },

    /// Model referenced a claim id not present in the input (reject policy only).
    #[error("judgment output references unknown claim: {claim_id}")]
    UnmatchedClaim { claim_id: String },

    /// Writing or listing output files failed.
    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JudgeError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedOutput {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error aborts the whole run rather than a single document.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Io { .. })
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Configuration and output problems abort the run
            Self::Configuration { .. } | Self::Io { .. } => 2,

            // Per-document failures
            Self::Invocation { .. }
            | Self::MalformedOutput { .. }
            | Self::InputNotFound { .. }
            | Self::InvalidInput { .. }
            | Self::UnmatchedClaim { .. } => 1,
        }
    }
}

/// Result type for judge operations.
pub type JudgeResult<T> = Result<T, JudgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(JudgeError::configuration("GEMINI_API_KEY is not set").is_fatal());
        assert!(JudgeError::io("out", std::io::Error::other("disk full")).is_fatal());
        assert!(!JudgeError::malformed("bad json").is_fatal());
        assert!(!JudgeError::Invocation {
            attempts: 4,
            status: Some(503),
            message: "unavailable".to_string(),
        }
        .is_fatal());
        assert!(!JudgeError::InputNotFound {
            doc_id: "d1".to_string(),
            kind: InputKind::Claims,
            path: PathBuf::from("claims/d1.json"),
        }
        .is_fatal());
    }

    #[test]
    fn messages_name_the_document_input() {
        let err = JudgeError::InputNotFound {
            doc_id: "1976SINGAP02176".to_string(),
            kind: InputKind::Reconstruction,
            path: PathBuf::from("recon/1976SINGAP02176.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("reconstruction"));
        assert!(msg.contains("1976SINGAP02176"));
        assert_eq!(err.exit_code(), 1);
    }
}
