//! Scored candidates and bounded preference lists
//!
//! A candidate is a plain two-field record `(id, score)` with a standard
//! serde codec; the cached preference list is a bounded, sorted sequence
//! of candidates.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::ids::PersonalityId;

/// Maximum number of candidates kept in any cached preference list.
pub const MAX_PREFERENCES: usize = 50;

/// A scored neighbor: another personality and its similarity to the list
/// owner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: PersonalityId,
    pub score: f64,
}

impl Candidate {
    pub fn new(id: PersonalityId, score: f64) -> Self {
        Self { id, score }
    }

    /// Total ranking order: descending score, ties broken by ascending id
    /// for determinism. `total_cmp` keeps the order total even for NaN.
    pub fn ranking_cmp(&self, other: &Candidate) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// A bounded, sorted list of the most-similar other personalities.
///
/// Invariants: never contains the owner's own id, sorted by
/// [`Candidate::ranking_cmp`], length at most the cap it was built with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceList(Vec<Candidate>);

impl PreferenceList {
    /// Sort and truncate raw scores into a list.
    pub fn from_candidates(mut candidates: Vec<Candidate>, cap: usize) -> Self {
        candidates.sort_by(Candidate::ranking_cmp);
        candidates.truncate(cap);
        Self(candidates)
    }

    /// Merge a single new candidate: insert, re-sort, truncate.
    pub fn merge_one(&mut self, candidate: Candidate, cap: usize) {
        self.0.push(candidate);
        self.0.sort_by(Candidate::ranking_cmp);
        self.0.truncate(cap);
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_id(&self, id: PersonalityId) -> bool {
        self.0.iter().any(|c| c.id == id)
    }

    pub fn into_inner(self) -> Vec<Candidate> {
        self.0
    }
}
