//! Core study engine shared by the backend and any player front-end.
//!
//! Provides:
//! - Four-state card mastery machine
//! - Typed-answer grading with typo tolerance (normalized Levenshtein)
//! - Per-user deck progress documents and the store/catalog contracts
//! - Study session controller (shuffle, star filter, accuracy)
//! - Deck-file parser

pub mod error;
pub mod feed;
pub mod grading;
pub mod mastery;
pub mod parser;
pub mod progress;
pub mod session;
pub mod store;
pub mod types;

pub use error::{ParseError, Result, StoreError, StudyError};
pub use feed::{ProgressFeed, ProgressKey, Subscription};
pub use grading::{classify, classify_score, grade, DiffSegment, DiffType, GradeReport, Verdict, TYPO_THRESHOLD};
pub use mastery::next_status;
pub use parser::{assign_ids, parse};
pub use progress::{DeckProgress, MasterySummary};
pub use session::{AnswerState, GradeOutcome, SessionOptions, SessionStats, StudySession};
pub use store::{DeckCatalog, MemoryDeckCatalog, MemoryProgressStore, ProgressStore};
pub use types::{Card, CardKind, CardProgress, Deck, MasteryStatus, RawCard, StudyMode};
