//! Quotas, the deferred-acceptance core, and the match coordinator
//!
//! The coordinator resolves the requester and the candidate board set,
//! derives each board's matching vector once, runs capacitated deferred
//! acceptance over the full population, and returns only the requester's
//! board list.

use std::collections::{BinaryHeap, HashMap, VecDeque};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use types::errors::MatchError;
use types::ids::{BoardId, PersonalityId, UserId};
use types::repository::{BoardRepository, PersonalityRepository};
use types::vector::FeatureVector;

use crate::ranking::{self, CandidateBoard, Participant};

/// Matching configuration.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Hard cap on boards matched to one user in a single request.
    pub max_matches_per_user: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_matches_per_user: 5,
        }
    }
}

/// An inbound match request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub user_id: UserId,
    pub country_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Request-scoped capacity parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quotas {
    /// Boards one user may hold: `min(cap, number of boards)`.
    pub per_user: usize,
    /// Users one board may hold:
    /// `ceil(users * per_user / boards)`, rounding up so slots are never
    /// under-allocated when the division is uneven.
    pub per_board: usize,
}

impl Quotas {
    pub fn for_request(num_users: usize, num_boards: usize, max_per_user: usize) -> Self {
        let per_user = max_per_user.min(num_boards);
        // Zero-boards guard: treat the denominator as 1.
        let denominator = num_boards.max(1);
        let per_board = (num_users * per_user).div_ceil(denominator);
        Self {
            per_user,
            per_board,
        }
    }
}

/// Capacitated deferred acceptance over prepared participants and boards.
///
/// Each board's accepted set is a max-heap keyed by rank index, worst
/// occupant on top, so the eviction candidate is an O(1) peek. A user
/// never proposes to their own board; it sits at the bottom of their
/// queue but is skipped outright, keeping the no-self-match invariant
/// even when the per-user quota covers every candidate board.
///
/// Terminates because each (user, board) pairing is proposed at most
/// once and every queue strictly shrinks.
pub fn deferred_acceptance(
    participants: &[Participant],
    boards: &[CandidateBoard],
    quotas: Quotas,
) -> HashMap<PersonalityId, Vec<BoardId>> {
    let mut queues: HashMap<PersonalityId, VecDeque<BoardId>> = participants
        .iter()
        .map(|p| (p.personality_id, ranking::board_preference_queue(p, boards)))
        .collect();

    let ranks: HashMap<BoardId, HashMap<PersonalityId, usize>> = boards
        .iter()
        .map(|b| (b.board_id, ranking::participant_rank_index(b, participants)))
        .collect();

    let authors: HashMap<BoardId, UserId> = boards
        .iter()
        .map(|b| (b.board_id, b.author_user_id))
        .collect();
    let owners: HashMap<PersonalityId, UserId> = participants
        .iter()
        .map(|p| (p.personality_id, p.user_id))
        .collect();

    let mut matches: HashMap<PersonalityId, Vec<BoardId>> = participants
        .iter()
        .map(|p| (p.personality_id, Vec::new()))
        .collect();
    let mut seats: HashMap<BoardId, BinaryHeap<(usize, PersonalityId)>> = HashMap::new();

    // Deterministic start order: ascending personality id.
    let mut free: VecDeque<PersonalityId> = {
        let mut ids: Vec<PersonalityId> = participants.iter().map(|p| p.personality_id).collect();
        ids.sort_unstable();
        ids.into()
    };

    while let Some(user) = free.pop_front() {
        let Some(queue) = queues.get_mut(&user) else {
            continue;
        };

        while matches[&user].len() < quotas.per_user {
            let Some(board_id) = queue.pop_front() else {
                break;
            };

            if authors[&board_id] == owners[&user] {
                // Own board: never proposed to.
                continue;
            }

            let rank_index = ranks[&board_id][&user];
            let seat_heap = seats.entry(board_id).or_default();

            if seat_heap.len() < quotas.per_board {
                seat_heap.push((rank_index, user));
                matches.entry(user).or_default().push(board_id);
                break;
            }

            if let Some(&(worst_index, worst_user)) = seat_heap.peek() {
                if rank_index < worst_index {
                    // Bump the least-preferred occupant and re-queue them.
                    seat_heap.pop();
                    seat_heap.push((rank_index, user));
                    if let Some(worst_matches) = matches.get_mut(&worst_user) {
                        worst_matches.retain(|b| *b != board_id);
                    }
                    matches.entry(user).or_default().push(board_id);
                    free.push_back(worst_user);
                    break;
                }
            }
            // Not better than the worst occupant: keep walking own queue.
        }

        if matches[&user].len() < quotas.per_user && !queue.is_empty() {
            free.push_back(user);
        }
    }

    matches
}

/// Resolves repositories into engine inputs and runs the match.
pub struct MatchCoordinator<P, B> {
    personalities: P,
    boards: B,
    config: MatchConfig,
}

impl<P: PersonalityRepository, B: BoardRepository> MatchCoordinator<P, B> {
    pub fn new(personalities: P, boards: B) -> Self {
        Self::with_config(personalities, boards, MatchConfig::default())
    }

    pub fn with_config(personalities: P, boards: B, config: MatchConfig) -> Self {
        Self {
            personalities,
            boards,
            config,
        }
    }

    /// Run one match request and return the requester's ordered board
    /// list.
    ///
    /// Fails if the requester has no personality record, or if any
    /// candidate board's author has none; a board's matching vector is
    /// required input, so that failure aborts the whole request. Zero
    /// candidate boards is not an error: the result is an empty list.
    pub fn match_user(&self, request: &MatchRequest) -> Result<Vec<BoardId>, MatchError> {
        let requester = self
            .personalities
            .find_by_user_id(request.user_id)?
            .ok_or(MatchError::RequesterNotFound(request.user_id))?;

        let boards = self.boards.find_by_country_and_date_overlap(
            &request.country_name,
            request.start_date,
            request.end_date,
        )?;
        if boards.is_empty() {
            info!(user_id = %request.user_id, country = %request.country_name, "no candidate boards");
            return Ok(Vec::new());
        }

        let records = self.personalities.find_all()?;
        let vectors_by_user: HashMap<UserId, FeatureVector> = records
            .iter()
            .map(|r| (r.user_id, r.to_feature_vector()))
            .collect();

        // Each board's matching vector is derived exactly once per request.
        let candidate_boards: Vec<CandidateBoard> = boards
            .iter()
            .map(|board| {
                let author = vectors_by_user.get(&board.author_user_id).ok_or(
                    MatchError::BoardAuthorNotFound {
                        board_id: board.board_id,
                    },
                )?;
                Ok(CandidateBoard {
                    board_id: board.board_id,
                    author_user_id: board.author_user_id,
                    vector: board.matching_vector(author),
                })
            })
            .collect::<Result<_, MatchError>>()?;

        let mut participants: Vec<Participant> = records
            .iter()
            .map(|r| Participant {
                personality_id: r.id,
                user_id: r.user_id,
                vector: r.to_feature_vector(),
            })
            .collect();
        participants.sort_by_key(|p| p.personality_id);

        let quotas = Quotas::for_request(
            participants.len(),
            candidate_boards.len(),
            self.config.max_matches_per_user,
        );
        debug!(
            users = participants.len(),
            boards = candidate_boards.len(),
            per_user = quotas.per_user,
            per_board = quotas.per_board,
            "running deferred acceptance"
        );

        let mut assignment = deferred_acceptance(&participants, &candidate_boards, quotas);
        let result = assignment.remove(&requester.id).unwrap_or_default();

        info!(
            user_id = %request.user_id,
            personality_id = %requester.id,
            matched = result.len(),
            "match request complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use types::board::BoardProfile;
    use types::errors::StoreError;
    use types::personality::PersonalityRecord;

    // ── Fixtures ──

    #[derive(Clone, Default)]
    struct MemoryRepo {
        records: Vec<PersonalityRecord>,
    }

    impl PersonalityRepository for MemoryRepo {
        fn find_all(&self) -> Result<Vec<PersonalityRecord>, StoreError> {
            Ok(self.records.clone())
        }

        fn find_by_id(&self, id: PersonalityId) -> Result<Option<PersonalityRecord>, StoreError> {
            Ok(self.records.iter().find(|r| r.id == id).cloned())
        }

        fn find_by_user_id(
            &self,
            user_id: UserId,
        ) -> Result<Option<PersonalityRecord>, StoreError> {
            Ok(self.records.iter().find(|r| r.user_id == user_id).cloned())
        }

        fn find_by_id_greater_than(
            &self,
            min_id: PersonalityId,
        ) -> Result<Vec<PersonalityRecord>, StoreError> {
            Ok(self
                .records
                .iter()
                .filter(|r| r.id > min_id)
                .cloned()
                .collect())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryBoards {
        boards: Vec<BoardProfile>,
    }

    impl BoardRepository for MemoryBoards {
        fn find_by_country_and_date_overlap(
            &self,
            country_name: &str,
            window_start: NaiveDate,
            window_end: NaiveDate,
        ) -> Result<Vec<BoardProfile>, StoreError> {
            Ok(self
                .boards
                .iter()
                .filter(|b| b.country_name == country_name && b.overlaps(window_start, window_end))
                .cloned()
                .collect())
        }
    }

    fn record(id: i64, user_id: i64, ratings: [f64; 3]) -> PersonalityRecord {
        PersonalityRecord {
            id: PersonalityId::new(id),
            user_id: UserId::new(user_id),
            gender: ratings[0],
            vegan: 3.0,
            islam: 3.0,
            hindu: 3.0,
            smoking: ratings[1],
            budget: 3.0,
            accommodation_flexibility: 3.0,
            food_flexibility: 3.0,
            activity: 3.0,
            photo: 3.0,
            food_exploration: 3.0,
            adventure: 3.0,
            personality: 3.0,
            schedule: 3.0,
            drink: ratings[2],
            age_range: 3.0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn board(board_id: i64, author_user_id: i64, country: &str) -> BoardProfile {
        BoardProfile {
            board_id: BoardId::new(board_id),
            author_user_id: UserId::new(author_user_id),
            country_name: country.to_string(),
            start_date: date(2024, 7, 1),
            end_date: date(2024, 7, 14),
            prefer_gender: 3.0,
            prefer_smoking: 3.0,
            prefer_instagram_picture: 3.0,
            prefer_shopping: 3.0,
            prefer_drink: 3.0,
            current_count: 1,
            max_count: 4,
        }
    }

    fn request(user_id: i64) -> MatchRequest {
        MatchRequest {
            user_id: UserId::new(user_id),
            country_name: "FR".to_string(),
            start_date: date(2024, 7, 5),
            end_date: date(2024, 7, 10),
        }
    }

    /// Three users whose similarities form a cycle (A closest to B, B to
    /// C, C to A), one board each.
    fn cycle_world() -> (MemoryRepo, MemoryBoards) {
        let repo = MemoryRepo {
            records: vec![
                record(1, 10, [5.0, 1.0, 3.0]),
                record(2, 20, [4.5, 1.5, 3.5]),
                record(3, 30, [4.0, 2.0, 4.5]),
            ],
        };
        let boards = MemoryBoards {
            boards: vec![board(100, 10, "FR"), board(200, 20, "FR"), board(300, 30, "FR")],
        };
        (repo, boards)
    }

    // ── Quotas ──

    #[test]
    fn test_quota_caps_at_board_count() {
        let q = Quotas::for_request(10, 3, 5);
        assert_eq!(q.per_user, 3);
    }

    #[test]
    fn test_board_capacity_rounds_up() {
        // 7 users * quota 2 = 14 over 3 boards → ceil = 5, never 4.
        let q = Quotas::for_request(7, 3, 2);
        assert_eq!(q.per_board, 5);
    }

    #[test]
    fn test_zero_boards_guard() {
        let q = Quotas::for_request(4, 0, 5);
        assert_eq!(q.per_user, 0);
        assert_eq!(q.per_board, 0);
    }

    // ── Coordinator ──

    #[test]
    fn test_requester_without_personality_fails() {
        let (repo, boards) = cycle_world();
        let coordinator = MatchCoordinator::new(repo, boards);
        let err = coordinator.match_user(&request(99)).unwrap_err();
        assert!(matches!(err, MatchError::RequesterNotFound(_)));
    }

    #[test]
    fn test_zero_candidate_boards_is_empty_success() {
        let (repo, boards) = cycle_world();
        let coordinator = MatchCoordinator::new(repo, boards);
        let mut req = request(10);
        req.country_name = "JP".to_string();

        assert_eq!(coordinator.match_user(&req).unwrap(), Vec::new());
    }

    #[test]
    fn test_board_author_without_personality_aborts() {
        let (repo, mut boards) = cycle_world();
        boards.boards.push(board(400, 99, "FR"));
        let coordinator = MatchCoordinator::new(repo, boards);

        let err = coordinator.match_user(&request(10)).unwrap_err();
        assert!(matches!(err, MatchError::BoardAuthorNotFound { .. }));
    }

    #[test]
    fn test_cycle_scenario_matches_and_excludes_own_board() {
        let (repo, boards) = cycle_world();
        let coordinator = MatchCoordinator::new(repo, boards);

        let result = coordinator.match_user(&request(10)).unwrap();
        assert!(!result.is_empty());
        assert!(!result.contains(&BoardId::new(100)), "never own board");
    }

    #[test]
    fn test_matching_is_idempotent_on_unchanged_data() {
        let (repo, boards) = cycle_world();
        let coordinator = MatchCoordinator::new(repo, boards);

        let first = coordinator.match_user(&request(20)).unwrap();
        let second = coordinator.match_user(&request(20)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_date_window_filters_boards() {
        let (repo, mut boards) = cycle_world();
        // Board 300 moves outside the requested window.
        boards.boards[2].start_date = date(2024, 8, 1);
        boards.boards[2].end_date = date(2024, 8, 10);
        let coordinator = MatchCoordinator::new(repo, boards);

        let result = coordinator.match_user(&request(10)).unwrap();
        assert!(!result.contains(&BoardId::new(300)));
        assert!(!result.is_empty());
    }

    // ── Deferred acceptance invariants ──

    fn world_from(
        ratings: &[[f64; 3]],
        boards_of: &[usize],
    ) -> (Vec<Participant>, Vec<CandidateBoard>) {
        let participants: Vec<Participant> = ratings
            .iter()
            .enumerate()
            .map(|(i, r)| Participant {
                personality_id: PersonalityId::new(i as i64 + 1),
                user_id: UserId::new((i as i64 + 1) * 10),
                vector: record(i as i64 + 1, (i as i64 + 1) * 10, *r).to_feature_vector(),
            })
            .collect();

        let candidate_boards: Vec<CandidateBoard> = boards_of
            .iter()
            .enumerate()
            .map(|(i, owner)| CandidateBoard {
                board_id: BoardId::new(i as i64 + 100),
                author_user_id: participants[*owner].user_id,
                vector: participants[*owner].vector.clone(),
            })
            .collect();

        (participants, candidate_boards)
    }

    #[test]
    fn test_eviction_bumps_less_preferred_user() {
        // One single-seat board authored by user 3. User 1 proposes
        // first and is accepted, then user 2 (whom the board prefers)
        // proposes, evicts user 1, and user 1's re-proposal is rejected.
        let (participants, boards) = world_from(
            &[[5.0, 1.0, 3.0], [1.5, 4.5, 3.2], [1.0, 5.0, 3.0]],
            &[2],
        );
        let quotas = Quotas {
            per_user: 1,
            per_board: 1,
        };

        let assignment = deferred_acceptance(&participants, &boards, quotas);
        assert_eq!(assignment[&PersonalityId::new(2)], vec![BoardId::new(100)]);
        assert!(assignment[&PersonalityId::new(1)].is_empty());
        assert!(assignment[&PersonalityId::new(3)].is_empty(), "author never holds own board");
    }

    proptest! {
        #[test]
        fn prop_capacity_and_self_match_invariants(
            ratings in proptest::collection::vec(
                [1.0f64..=5.0, 1.0f64..=5.0, 1.0f64..=5.0],
                1..8,
            ),
            board_seeds in proptest::collection::vec(0usize..8, 0..5),
        ) {
            let boards_of: Vec<usize> = board_seeds
                .iter()
                .map(|s| s % ratings.len())
                .collect();
            let (participants, boards) = world_from(&ratings, &boards_of);
            let quotas = Quotas::for_request(
                participants.len(),
                boards.len(),
                MatchConfig::default().max_matches_per_user,
            );

            let assignment = deferred_acceptance(&participants, &boards, quotas);

            let mut seats_taken: HashMap<BoardId, usize> = HashMap::new();
            for participant in &participants {
                let matched = &assignment[&participant.personality_id];
                prop_assert!(matched.len() <= quotas.per_user);

                for board_id in matched {
                    *seats_taken.entry(*board_id).or_default() += 1;
                    let author = boards
                        .iter()
                        .find(|b| b.board_id == *board_id)
                        .map(|b| b.author_user_id)
                        .unwrap();
                    prop_assert!(author != participant.user_id, "self-match");
                }
            }
            for (_, taken) in seats_taken {
                prop_assert!(taken <= quotas.per_board);
            }
        }
    }
}
