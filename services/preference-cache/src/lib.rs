//! Preference-cache engine
//!
//! Builds and incrementally maintains, per personality, a bounded top-K
//! list of most-similar other personalities, backed by an external
//! key-value store.
//!
//! # Architecture
//!
//! ```text
//! PersonalityRepository ──┐
//!                         ▼
//!              PreferenceCacheManager
//!                         │
//!                    CacheStore          ← key naming + JSON codec
//!                         │
//!                   KeyValueCache        ← external store
//! ```
//!
//! The manager carries no state of its own beyond the external store:
//! every operation reads the full current personality set through the
//! repository. Matching never reads this cache; it is a lookup
//! optimization for the rest of the platform and is rebuildable from the
//! source records at any time.

pub mod manager;
pub mod store;

pub use manager::{AddReport, CacheConfig, DeleteReport, PreferenceCacheManager, RebuildReport};
pub use store::CacheStore;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
