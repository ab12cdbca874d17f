//! Per-request preference rankings
//!
//! For one match request, every participant gets a descending-similarity
//! queue over all candidate boards, and every board gets a rank-index
//! lookup (`personality id → 0-based position`) over all participants.
//! Lower index means more preferred.
//!
//! A board authored by the participant being ranked is forced to the
//! bottom with a sentinel score far below the cosine range, so
//! self-matching cannot occur.

use std::collections::{HashMap, VecDeque};

use types::ids::{BoardId, PersonalityId, UserId};
use types::vector::FeatureVector;

/// Score assigned where a participant meets their own board. Cosine
/// similarity lives in `[-1, 1]`, so this always ranks last.
pub const SELF_MATCH_SENTINEL: f64 = -100.0;

/// One participant of the matching computation.
#[derive(Debug, Clone)]
pub struct Participant {
    pub personality_id: PersonalityId,
    pub user_id: UserId,
    pub vector: FeatureVector,
}

/// One candidate board with its derived matching vector.
#[derive(Debug, Clone)]
pub struct CandidateBoard {
    pub board_id: BoardId,
    pub author_user_id: UserId,
    pub vector: FeatureVector,
}

/// The participant's board queue: all candidate boards, most similar
/// first, own board last.
pub fn board_preference_queue(
    participant: &Participant,
    boards: &[CandidateBoard],
) -> VecDeque<BoardId> {
    let mut scored: Vec<(BoardId, f64)> = boards
        .iter()
        .map(|board| {
            let score = if board.author_user_id == participant.user_id {
                SELF_MATCH_SENTINEL
            } else {
                participant.vector.cosine_similarity(&board.vector)
            };
            (board.board_id, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.into_iter().map(|(board_id, _)| board_id).collect()
}

/// The board's ranking over all participants, as a rank-index lookup.
/// The board's own author is forced last.
pub fn participant_rank_index(
    board: &CandidateBoard,
    participants: &[Participant],
) -> HashMap<PersonalityId, usize> {
    let mut scored: Vec<(PersonalityId, f64)> = participants
        .iter()
        .map(|participant| {
            let score = if board.author_user_id == participant.user_id {
                SELF_MATCH_SENTINEL
            } else {
                board.vector.cosine_similarity(&participant.vector)
            };
            (participant.personality_id, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored
        .into_iter()
        .enumerate()
        .map(|(index, (id, _))| (id, index))
        .collect()
}
