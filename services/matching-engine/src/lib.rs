//! Matching engine
//!
//! Assigns users to trip boards by mutual personality preference: a
//! deferred-acceptance (Gale-Shapley family) algorithm extended with
//! board-side capacity limits, bumping, and re-queuing.
//!
//! The engine recomputes its rankings directly from personality records
//! for every request; it never reads the preference cache. A match
//! running concurrently with a cache rebuild therefore cannot observe a
//! torn cache entry.
//!
//! # Modules
//! - `ranking`: per-request preference queues and rank-index lookups
//! - `engine`: quotas, the deferred-acceptance core, and the coordinator
//!   that wires repositories to it

pub mod engine;
pub mod ranking;

pub use engine::{MatchConfig, MatchCoordinator, MatchRequest, Quotas};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
