//! Error taxonomy for the matching service
//!
//! Collaborator failures surface as [`StoreError`]; the two algorithmic
//! subsystems wrap them into [`CacheError`] and [`MatchError`] with the
//! context a caller needs to publish a structured failure result.

use thiserror::Error;

use crate::ids::{BoardId, PersonalityId, UserId};

/// Failure of an external collaborator (repository or key-value store).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store io failure: {0}")]
    Io(String),
}

/// Preference-cache maintenance errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("personality not found: {0}")]
    PersonalityNotFound(PersonalityId),

    #[error("no cached preference list for personality {0}")]
    MissingEntry(PersonalityId),

    #[error("undecodable preference list for personality {id}: {reason}")]
    Undecodable { id: PersonalityId, reason: String },

    #[error("cache read failed: {0}")]
    Read(#[source] StoreError),

    #[error("cache write failed: {0}")]
    Write(#[source] StoreError),

    #[error("repository error: {0}")]
    Repository(#[from] StoreError),

    #[error(
        "partial recompute floor {min_id} is ahead of the recorded watermark {watermark} for personality {id}"
    )]
    WatermarkRegression {
        id: PersonalityId,
        min_id: PersonalityId,
        watermark: PersonalityId,
    },
}

/// Matching-request errors. Any of these aborts the whole request; a
/// partial assignment without a required scoring input would be silently
/// wrong.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("requester {0} has no personality record")]
    RequesterNotFound(UserId),

    #[error("author of board {board_id} has no personality record")]
    BoardAuthorNotFound { board_id: BoardId },

    #[error("repository error during matching: {0}")]
    Store(#[from] StoreError),
}
