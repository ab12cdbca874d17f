//! Types library for the companion-matching service
//!
//! This library provides all core type definitions shared across the
//! matching system: entity identifiers, personality records and their
//! weighted feature vectors, trip boards, similarity candidates, and the
//! collaborator traits the service crates are built against.
//!
//! # Modules
//! - `ids`: Unique identifiers (PersonalityId, UserId, BoardId)
//! - `vector`: Fixed-length feature vectors and cosine similarity
//! - `personality`: Personality records and the weighting table
//! - `board`: Trip board profiles and derived matching vectors
//! - `candidate`: Scored candidates and bounded preference lists
//! - `repository`: Collaborator traits (repositories, key-value cache)
//! - `errors`: Error taxonomy

pub mod board;
pub mod candidate;
pub mod errors;
pub mod ids;
pub mod personality;
pub mod repository;
pub mod vector;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::board::*;
    pub use crate::candidate::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::personality::*;
    pub use crate::repository::*;
    pub use crate::vector::*;
}
