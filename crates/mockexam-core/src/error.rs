//! Error types for the question pool, selector, progress store, and session.
//!
//! Each concern has its own enum so callers can match on exactly the failures
//! an operation can produce. `SessionError` wraps the others for the
//! orchestration layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::QuestionId;

/// Errors raised while building or mutating the question pool.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Two records in one load share the same id.
    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),

    /// A record has a blank topic label.
    #[error("question {0} has an empty topic")]
    EmptyTopic(QuestionId),

    /// A record has a blank id.
    #[error("question id must not be empty (topic '{topic}')")]
    EmptyId { topic: String },

    /// The referenced id is not part of the pool.
    #[error("question not found: {0}")]
    NotFound(QuestionId),
}

/// Errors raised by the selector.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    /// The requested count was zero.
    #[error("requested question count must be at least 1, got {0}")]
    InvalidCount(usize),

    /// Fewer unsolved questions exist than the request needs.
    #[error("requested {requested} questions, but only {available} unsolved available")]
    InsufficientQuestions { requested: usize, available: usize },
}

impl SelectError {
    /// Returns `true` for the recoverable shortfall case the session controller
    /// may answer with a reset.
    pub fn is_shortfall(&self) -> bool {
        matches!(self, SelectError::InsufficientQuestions { .. })
    }
}

/// Errors raised while reading or writing durable progress.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// Persisted state exists but cannot be interpreted.
    #[error("corrupt progress state at {}: {reason}", path.display())]
    CorruptState { path: PathBuf, reason: String },

    /// The underlying storage failed.
    #[error("progress I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be encoded.
    #[error("failed to serialize progress: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Raised by test stores configured to reject writes.
    #[error("progress store rejected the write: {0}")]
    Rejected(String),
}

/// Errors surfaced by the session controller.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    /// Even a fully reset pool cannot satisfy the request.
    #[error("not enough questions exist: requested {requested}, pool holds {pool_size}")]
    NotEnoughQuestions { requested: usize, pool_size: usize },

    /// A previous holder of the session lock panicked.
    #[error("session state lock poisoned")]
    Poisoned,
}

impl SessionError {
    /// Returns `true` when the error describes a condition the end user can
    /// act on (ask for fewer questions) rather than a defect or I/O failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            SessionError::NotEnoughQuestions { .. }
                | SessionError::Select(SelectError::InsufficientQuestions { .. })
                | SessionError::Select(SelectError::InvalidCount(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortfall_classification() {
        assert!(SelectError::InsufficientQuestions {
            requested: 5,
            available: 3
        }
        .is_shortfall());
        assert!(!SelectError::InvalidCount(0).is_shortfall());
    }

    #[test]
    fn user_facing_classification() {
        let err = SessionError::NotEnoughQuestions {
            requested: 5,
            pool_size: 3,
        };
        assert!(err.is_user_facing());
        assert!(err.to_string().contains("not enough questions exist"));

        let err = SessionError::Progress(ProgressError::Rejected("disk full".into()));
        assert!(!err.is_user_facing());
    }

    #[test]
    fn corrupt_state_message_names_path() {
        let err = ProgressError::CorruptState {
            path: PathBuf::from("progress.json"),
            reason: "expected value".into(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt progress state at progress.json: expected value"
        );
    }
}
