//! Error types for studydeck-core.

use thiserror::Error;

/// Result type alias using StudyError.
pub type Result<T> = std::result::Result<T, StudyError>;

/// Errors that can occur while parsing a deck file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing question at line {line}")]
    MissingQuestion { line: usize },

    #[error("missing answer at line {line}")]
    MissingAnswer { line: usize },

    #[error("invalid ID format at line {line}: {value}")]
    InvalidId { line: usize, value: String },

    #[error("duplicate ID {id} at line {line}")]
    DuplicateId { id: i64, line: usize },

    #[error("unknown card type at line {line}: {value}")]
    UnknownCardType { line: usize, value: String },

    #[error("multiple-choice card at line {line} has no options")]
    MissingOptions { line: usize },
}

/// Errors reported by a progress store or deck catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("stored progress is malformed: {0}")]
    Corrupt(String),
}

/// Errors raised by a study session.
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("answer must not be empty")]
    EmptyAnswer,

    #[error("no cards match the current filters")]
    NoCards,

    #[error("deck not found: {0}")]
    DeckNotFound(String),

    #[error("card {0} is not in this deck")]
    UnknownCard(i64),

    #[error("current card has not been answered yet")]
    NotAnswered,

    #[error("current card was already answered")]
    AlreadyAnswered,

    #[error("operation requires {0} mode")]
    WrongMode(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}
