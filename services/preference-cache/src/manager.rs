//! Preference-cache maintenance operations
//!
//! Orchestrates the repository, the similarity primitive, and the cache
//! store to rebuild, extend, recompute, and invalidate per-personality
//! preference lists. All operations read the full current personality set
//! through the repository at call time; the manager holds no state beyond
//! the external store.
//!
//! Concurrency contract: operations take `&mut self`. Two units of work
//! touching the same personality's entry must not interleave their
//! read-modify-write sequence, and exclusive access is how this crate
//! enforces that.

use tracing::{debug, info, warn};

use types::candidate::{Candidate, PreferenceList, MAX_PREFERENCES};
use types::errors::CacheError;
use types::ids::PersonalityId;
use types::personality::PersonalityRecord;
use types::repository::{KeyValueCache, PersonalityRepository};
use types::vector::FeatureVector;

use crate::store::CacheStore;

/// Cache maintenance configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum candidates kept per preference list.
    pub max_preferences: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_preferences: MAX_PREFERENCES,
        }
    }
}

/// Outcome of a full rebuild.
#[derive(Debug)]
pub struct RebuildReport {
    /// Entries written successfully.
    pub rebuilt: usize,
    /// Per-personality failures; the rebuild continued past each one.
    pub failures: Vec<(PersonalityId, CacheError)>,
}

/// Outcome of `add_one`.
#[derive(Debug)]
pub struct AddReport {
    /// Length of the new personality's own list.
    pub own_list_len: usize,
    /// Sibling entries the new candidate was merged into.
    pub updated: usize,
    /// Sibling entries that could not be updated; best-effort, the loop
    /// continued past each one.
    pub failures: Vec<(PersonalityId, CacheError)>,
}

/// Outcome of `delete_one`.
#[derive(Debug)]
pub struct DeleteReport {
    /// Entries whose deletion bit was set.
    pub marked: usize,
    pub failures: Vec<(PersonalityId, CacheError)>,
}

/// Orchestrator for all preference-cache maintenance.
pub struct PreferenceCacheManager<R, C> {
    repo: R,
    store: CacheStore<C>,
    config: CacheConfig,
}

impl<R: PersonalityRepository, C: KeyValueCache> PreferenceCacheManager<R, C> {
    pub fn new(repo: R, cache: C) -> Self {
        Self::with_config(repo, cache, CacheConfig::default())
    }

    pub fn with_config(repo: R, cache: C, config: CacheConfig) -> Self {
        Self {
            repo,
            store: CacheStore::new(cache),
            config,
        }
    }

    /// Access to the underlying store, for boundary code and tests.
    pub fn store(&self) -> &CacheStore<C> {
        &self.store
    }

    /// Rebuild every personality's preference list from scratch.
    ///
    /// O(n²) over the population; used at startup and as the recovery
    /// path. Clears every deletion bit it rewrites.
    pub fn rebuild_all(&mut self) -> Result<RebuildReport, CacheError> {
        let records = self.repo.find_all()?;
        let Some(watermark) = records.iter().map(|r| r.id).max() else {
            info!("rebuild_all: no personality records, nothing to do");
            return Ok(RebuildReport {
                rebuilt: 0,
                failures: Vec::new(),
            });
        };

        let vectors: Vec<(PersonalityId, FeatureVector)> = records
            .iter()
            .map(|r| (r.id, r.to_feature_vector()))
            .collect();

        let mut rebuilt = 0;
        let mut failures = Vec::new();
        for (id, vector) in &vectors {
            let list = rank_against(*id, vector, &vectors, self.config.max_preferences);
            match self.store.write_entry(*id, &list, watermark) {
                Ok(()) => rebuilt += 1,
                Err(e) => {
                    warn!(personality_id = %id, error = %e, "rebuild_all: entry write failed");
                    failures.push((*id, e));
                }
            }
        }

        info!(
            rebuilt,
            failed = failures.len(),
            %watermark,
            "rebuild_all complete"
        );
        Ok(RebuildReport { rebuilt, failures })
    }

    /// Fold one new personality into the cache.
    ///
    /// Merges the new candidate into every existing list
    /// (read-modify-truncate-write) and builds the new personality's own
    /// list against the full population in the same O(n) pass. A failure
    /// on one sibling entry is recorded and the loop continues.
    pub fn add_one(&mut self, new_id: PersonalityId) -> Result<AddReport, CacheError> {
        let new_record = self
            .repo
            .find_by_id(new_id)?
            .ok_or(CacheError::PersonalityNotFound(new_id))?;
        let new_vector = new_record.to_feature_vector();

        let records = self.repo.find_all()?;
        let watermark = records
            .iter()
            .map(|r| r.id)
            .max()
            .unwrap_or(new_id)
            .max(new_id);

        let mut own_candidates = Vec::new();
        let mut updated = 0;
        let mut failures = Vec::new();
        for other in records.iter().filter(|r| r.id != new_id) {
            let similarity = new_vector.cosine_similarity(&other.to_feature_vector());
            own_candidates.push(Candidate::new(other.id, similarity));

            match self.merge_into(other.id, Candidate::new(new_id, similarity)) {
                Ok(()) => updated += 1,
                Err(e) => {
                    warn!(
                        personality_id = %other.id,
                        new_id = %new_id,
                        error = %e,
                        "add_one: sibling update failed, continuing"
                    );
                    failures.push((other.id, e));
                }
            }
        }

        let own_list = PreferenceList::from_candidates(own_candidates, self.config.max_preferences);
        let own_list_len = own_list.len();
        self.store.write_entry(new_id, &own_list, watermark)?;

        info!(
            personality_id = %new_id,
            own_list_len,
            updated,
            failed = failures.len(),
            "add_one complete"
        );
        Ok(AddReport {
            own_list_len,
            updated,
            failures,
        })
    }

    /// Merge one candidate into one existing entry and advance its
    /// watermark. The entry must already exist; `add_one` never invents a
    /// list for a personality the rebuild has not covered.
    fn merge_into(&mut self, id: PersonalityId, candidate: Candidate) -> Result<(), CacheError> {
        let mut list = self
            .store
            .read_preferences(id)?
            .ok_or(CacheError::MissingEntry(id))?;
        list.merge_one(candidate, self.config.max_preferences);
        self.store.write_preferences(id, &list)?;

        let next = match self.store.read_watermark(id)? {
            Some(watermark) => watermark.max(candidate.id),
            None => candidate.id,
        };
        self.store.write_watermark(id, next)?;
        self.store.write_deleted_bit(id, false)
    }

    /// Recompute one personality's list from scratch against the full
    /// current population. Clears the deletion bit for that personality
    /// only.
    pub fn recalculate_one(&mut self, id: PersonalityId) -> Result<usize, CacheError> {
        let record = self
            .repo
            .find_by_id(id)?
            .ok_or(CacheError::PersonalityNotFound(id))?;
        let vector = record.to_feature_vector();

        let records = self.repo.find_all()?;
        let watermark = records.iter().map(|r| r.id).max().unwrap_or(id);

        let candidates: Vec<Candidate> = records
            .iter()
            .filter(|r| r.id != id)
            .map(|r| Candidate::new(r.id, vector.cosine_similarity(&r.to_feature_vector())))
            .collect();
        let list = PreferenceList::from_candidates(candidates, self.config.max_preferences);
        let len = list.len();
        self.store.write_entry(id, &list, watermark)?;

        info!(personality_id = %id, list_len = len, "recalculate_one complete");
        Ok(len)
    }

    /// Watermark-bounded partial recompute: score only records with id
    /// strictly greater than `min_id` and fold them into the cached list.
    ///
    /// Precondition: `min_id` must not exceed the watermark recorded at
    /// the previous full or partial recompute, or legitimate candidates
    /// would silently be skipped. A `min_id` ahead of the recorded
    /// watermark is rejected with `WatermarkRegression`.
    ///
    /// The deletion bit is left untouched: folding in newer records
    /// cannot heal staleness caused by a deletion elsewhere.
    pub fn recalculate_partial(
        &mut self,
        id: PersonalityId,
        min_id: PersonalityId,
    ) -> Result<usize, CacheError> {
        let existing = self
            .store
            .read_preferences(id)?
            .ok_or(CacheError::MissingEntry(id))?;

        let recorded = self.store.read_watermark(id)?;
        if let Some(watermark) = recorded {
            if min_id > watermark {
                return Err(CacheError::WatermarkRegression {
                    id,
                    min_id,
                    watermark,
                });
            }
        }

        let record = self
            .repo
            .find_by_id(id)?
            .ok_or(CacheError::PersonalityNotFound(id))?;
        let vector = record.to_feature_vector();
        let newer = self.repo.find_by_id_greater_than(min_id)?;

        debug!(
            personality_id = %id,
            %min_id,
            newer = newer.len(),
            "recalculate_partial: scoring records above floor"
        );

        // Entries above the floor are about to be rescored; drop the old
        // copies so a re-fold cannot duplicate them.
        let mut candidates = existing.into_inner();
        candidates.retain(|c| c.id <= min_id);
        for other in newer.iter().filter(|r| r.id != id) {
            candidates.push(Candidate::new(
                other.id,
                vector.cosine_similarity(&other.to_feature_vector()),
            ));
        }
        let list = PreferenceList::from_candidates(candidates, self.config.max_preferences);
        let len = list.len();

        let next = newer
            .iter()
            .map(|r| r.id)
            .max()
            .into_iter()
            .chain(recorded)
            .max()
            .unwrap_or(min_id);

        self.store.write_preferences(id, &list)?;
        self.store.write_watermark(id, next)?;

        info!(personality_id = %id, list_len = len, watermark = %next, "recalculate_partial complete");
        Ok(len)
    }

    /// Remove one personality's entry and mark every other entry stale.
    ///
    /// A cheap broad invalidation: other lists keep their payload but
    /// their deletion bit is set, and consumers must treat them as
    /// requiring recompute before trusted use.
    pub fn delete_one(&mut self, id: PersonalityId) -> Result<DeleteReport, CacheError> {
        self.store.remove_entry(id)?;

        let records = self.repo.find_all()?;
        let mut marked = 0;
        let mut failures = Vec::new();
        for other in records.iter().filter(|r| r.id != id) {
            match self.store.write_deleted_bit(other.id, true) {
                Ok(()) => marked += 1,
                Err(e) => {
                    warn!(personality_id = %other.id, error = %e, "delete_one: mark failed, continuing");
                    failures.push((other.id, e));
                }
            }
        }

        info!(personality_id = %id, marked, failed = failures.len(), "delete_one complete");
        Ok(DeleteReport { marked, failures })
    }
}

/// Score `vector` against every other entry in `vectors` and keep the top
/// `cap` candidates.
fn rank_against(
    owner: PersonalityId,
    vector: &FeatureVector,
    vectors: &[(PersonalityId, FeatureVector)],
    cap: usize,
) -> PreferenceList {
    let candidates: Vec<Candidate> = vectors
        .iter()
        .filter(|(id, _)| *id != owner)
        .map(|(id, other)| Candidate::new(*id, vector.cosine_similarity(other)))
        .collect();
    PreferenceList::from_candidates(candidates, cap)
}
