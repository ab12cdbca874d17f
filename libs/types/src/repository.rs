//! Collaborator traits consumed by the service crates
//!
//! Implementation-agnostic contracts for the relational repositories and
//! the key-value store backing the preference cache. Handles are expected
//! to be cheap to clone (pooled-connection style) so one process can hand
//! the same repository to both the cache manager and the match
//! coordinator.

use chrono::NaiveDate;

use crate::board::BoardProfile;
use crate::errors::StoreError;
use crate::ids::{PersonalityId, UserId};
use crate::personality::PersonalityRecord;

/// Read access to the personality records of all users.
pub trait PersonalityRepository {
    /// Every personality record currently known.
    fn find_all(&self) -> Result<Vec<PersonalityRecord>, StoreError>;

    /// Record by personality id, or `None` if absent.
    fn find_by_id(&self, id: PersonalityId) -> Result<Option<PersonalityRecord>, StoreError>;

    /// Record owned by the given platform user, or `None` if absent.
    fn find_by_user_id(&self, user_id: UserId) -> Result<Option<PersonalityRecord>, StoreError>;

    /// Records with id strictly greater than `min_id`, for
    /// watermark-bounded partial recomputation.
    fn find_by_id_greater_than(
        &self,
        min_id: PersonalityId,
    ) -> Result<Vec<PersonalityRecord>, StoreError>;
}

/// Read access to trip boards.
pub trait BoardRepository {
    /// Boards in the given country whose `[start_date, end_date]` overlaps
    /// the requested window (inclusive on both ends).
    fn find_by_country_and_date_overlap(
        &self,
        country_name: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<BoardProfile>, StoreError>;
}

/// The key-value store backing the preference cache.
///
/// No atomicity across keys is assumed; the cache manager tolerates
/// partially applied multi-key writes. Mutating methods take `&mut self`:
/// callers own the single-writer discipline over a user's entry.
pub trait KeyValueCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}
