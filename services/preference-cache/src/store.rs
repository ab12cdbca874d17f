//! Key layout and codec over the external key-value store
//!
//! Three keys per personality:
//!
//! - `userPreferences-{id}` — JSON array of candidates
//! - `deletedBit-{id}` — `0` or `1`; `1` means the list is stale and must
//!   be recomputed before trusted use
//! - `watermark-{id}` — greatest personality id folded into the cached
//!   list at the last full or partial recompute
//!
//! The three writes for one entry are logically one unit but the store
//! gives no multi-key atomicity; callers tolerate partial application.

use types::candidate::PreferenceList;
use types::errors::CacheError;
use types::ids::PersonalityId;
use types::repository::KeyValueCache;

/// Key prefix for a personality's cached preference list.
pub const USER_PREFERENCES_KEY: &str = "userPreferences-";
/// Key prefix for a personality's deletion marker.
pub const DELETED_BIT_KEY: &str = "deletedBit-";
/// Key prefix for a personality's recompute watermark.
pub const WATERMARK_KEY: &str = "watermark-";

/// Typed wrapper over the raw key-value store.
pub struct CacheStore<C> {
    cache: C,
}

impl<C: KeyValueCache> CacheStore<C> {
    pub fn new(cache: C) -> Self {
        Self { cache }
    }

    fn preferences_key(id: PersonalityId) -> String {
        format!("{USER_PREFERENCES_KEY}{id}")
    }

    fn deleted_bit_key(id: PersonalityId) -> String {
        format!("{DELETED_BIT_KEY}{id}")
    }

    fn watermark_key(id: PersonalityId) -> String {
        format!("{WATERMARK_KEY}{id}")
    }

    /// Read a cached preference list. `None` when no list is stored.
    pub fn read_preferences(
        &self,
        id: PersonalityId,
    ) -> Result<Option<PreferenceList>, CacheError> {
        let bytes = self
            .cache
            .get(&Self::preferences_key(id))
            .map_err(CacheError::Read)?;

        match bytes {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| CacheError::Undecodable {
                    id,
                    reason: e.to_string(),
                }),
        }
    }

    pub fn write_preferences(
        &mut self,
        id: PersonalityId,
        list: &PreferenceList,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(list).map_err(|e| CacheError::Undecodable {
            id,
            reason: e.to_string(),
        })?;
        self.cache
            .set(&Self::preferences_key(id), bytes)
            .map_err(CacheError::Write)
    }

    /// Read the deletion marker. Absent key reads as "not deleted": a
    /// freshly rebuilt store may not have written markers yet.
    pub fn read_deleted_bit(&self, id: PersonalityId) -> Result<bool, CacheError> {
        let bytes = self
            .cache
            .get(&Self::deleted_bit_key(id))
            .map_err(CacheError::Read)?;
        Ok(matches!(bytes.as_deref(), Some(b"1")))
    }

    pub fn write_deleted_bit(&mut self, id: PersonalityId, deleted: bool) -> Result<(), CacheError> {
        let value = if deleted { b"1".to_vec() } else { b"0".to_vec() };
        self.cache
            .set(&Self::deleted_bit_key(id), value)
            .map_err(CacheError::Write)
    }

    pub fn read_watermark(&self, id: PersonalityId) -> Result<Option<PersonalityId>, CacheError> {
        let bytes = self
            .cache
            .get(&Self::watermark_key(id))
            .map_err(CacheError::Read)?;

        match bytes {
            None => Ok(None),
            Some(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                text.parse::<i64>()
                    .map(|raw| Some(PersonalityId::new(raw)))
                    .map_err(|e| CacheError::Undecodable {
                        id,
                        reason: format!("watermark: {e}"),
                    })
            }
        }
    }

    pub fn write_watermark(
        &mut self,
        id: PersonalityId,
        watermark: PersonalityId,
    ) -> Result<(), CacheError> {
        self.cache
            .set(
                &Self::watermark_key(id),
                watermark.value().to_string().into_bytes(),
            )
            .map_err(CacheError::Write)
    }

    /// Write a full entry: list, watermark, and a cleared deletion bit.
    pub fn write_entry(
        &mut self,
        id: PersonalityId,
        list: &PreferenceList,
        watermark: PersonalityId,
    ) -> Result<(), CacheError> {
        self.write_preferences(id, list)?;
        self.write_watermark(id, watermark)?;
        self.write_deleted_bit(id, false)
    }

    /// Remove every key belonging to one personality.
    pub fn remove_entry(&mut self, id: PersonalityId) -> Result<(), CacheError> {
        self.cache
            .delete(&Self::preferences_key(id))
            .map_err(CacheError::Write)?;
        self.cache
            .delete(&Self::watermark_key(id))
            .map_err(CacheError::Write)?;
        self.cache
            .delete(&Self::deleted_bit_key(id))
            .map_err(CacheError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use types::candidate::{Candidate, MAX_PREFERENCES};
    use types::errors::StoreError;

    #[derive(Default)]
    struct MemoryCache {
        map: BTreeMap<String, Vec<u8>>,
    }

    impl KeyValueCache for MemoryCache {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(self.map.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
            self.map.insert(key.to_string(), value);
            Ok(())
        }

        fn delete(&mut self, key: &str) -> Result<(), StoreError> {
            self.map.remove(key);
            Ok(())
        }
    }

    fn sample_list() -> PreferenceList {
        PreferenceList::from_candidates(
            vec![
                Candidate::new(PersonalityId::new(2), 0.9),
                Candidate::new(PersonalityId::new(3), 0.1),
            ],
            MAX_PREFERENCES,
        )
    }

    #[test]
    fn test_preferences_round_trip() {
        let mut store = CacheStore::new(MemoryCache::default());
        let id = PersonalityId::new(1);
        let list = sample_list();

        store.write_preferences(id, &list).unwrap();
        assert_eq!(store.read_preferences(id).unwrap(), Some(list));
    }

    #[test]
    fn test_missing_preferences_read_as_none() {
        let store = CacheStore::new(MemoryCache::default());
        assert_eq!(store.read_preferences(PersonalityId::new(9)).unwrap(), None);
    }

    #[test]
    fn test_undecodable_preferences() {
        let mut cache = MemoryCache::default();
        cache
            .set("userPreferences-5", b"not json".to_vec())
            .unwrap();
        let store = CacheStore::new(cache);

        let err = store.read_preferences(PersonalityId::new(5)).unwrap_err();
        assert!(matches!(err, CacheError::Undecodable { .. }));
    }

    #[test]
    fn test_deleted_bit_defaults_to_false() {
        let store = CacheStore::new(MemoryCache::default());
        assert!(!store.read_deleted_bit(PersonalityId::new(1)).unwrap());
    }

    #[test]
    fn test_write_entry_sets_all_three_keys() {
        let mut store = CacheStore::new(MemoryCache::default());
        let id = PersonalityId::new(4);
        store
            .write_entry(id, &sample_list(), PersonalityId::new(3))
            .unwrap();

        assert!(store.read_preferences(id).unwrap().is_some());
        assert_eq!(store.read_watermark(id).unwrap(), Some(PersonalityId::new(3)));
        assert!(!store.read_deleted_bit(id).unwrap());
    }

    #[test]
    fn test_remove_entry_clears_all_keys() {
        let mut store = CacheStore::new(MemoryCache::default());
        let id = PersonalityId::new(4);
        store
            .write_entry(id, &sample_list(), PersonalityId::new(3))
            .unwrap();
        store.remove_entry(id).unwrap();

        assert_eq!(store.read_preferences(id).unwrap(), None);
        assert_eq!(store.read_watermark(id).unwrap(), None);
        assert!(!store.read_deleted_bit(id).unwrap());
    }
}
