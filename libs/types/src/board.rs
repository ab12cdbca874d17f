//! Trip board profiles and derived matching vectors
//!
//! A board is a trip-companion post with its own preference ratings and a
//! date range. A board has no stored vector of its own: for the duration
//! of a match request its vector is derived from the author's personal
//! vector with five dimensions perturbed by the board's stated
//! preferences, at weights stronger than the personal ones.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::{BoardId, UserId};
use crate::personality::RATING_MIDPOINT;
use crate::vector::FeatureVector;

/// The five board-influenced dimensions: vector index, and the weight the
/// board's rating carries there. Stronger than the personal weights so an
/// explicit board preference dominates the author's baseline.
const BOARD_OVERRIDES: [(usize, f64); 5] = [
    (0, 24.0),  // gender
    (4, 16.0),  // smoking
    (9, 9.0),   // instagram picture
    (14, 10.0), // shopping
    (15, 24.0), // drink
];

/// A trip-companion board as seen by the matching engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardProfile {
    pub board_id: BoardId,
    pub author_user_id: UserId,
    pub country_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub prefer_gender: f64,
    pub prefer_smoking: f64,
    pub prefer_instagram_picture: f64,
    pub prefer_shopping: f64,
    pub prefer_drink: f64,
    /// Companions already on the trip.
    pub current_count: u32,
    /// Head-count limit stated on the post.
    pub max_count: u32,
}

impl BoardProfile {
    /// Derive this board's matching vector from its author's personal
    /// vector.
    ///
    /// Works on a copy; the author's vector is never mutated. Only the
    /// five board-influenced components change, each by
    /// `(board_rating - 3.0) * board_weight`.
    pub fn matching_vector(&self, author: &FeatureVector) -> FeatureVector {
        let ratings = [
            self.prefer_gender,
            self.prefer_smoking,
            self.prefer_instagram_picture,
            self.prefer_shopping,
            self.prefer_drink,
        ];

        let mut vector = author.clone();
        for (rating, (index, weight)) in ratings.iter().zip(BOARD_OVERRIDES) {
            vector.add_at(index, (rating - RATING_MIDPOINT) * weight);
        }
        vector
    }

    /// Whether this board's trip dates overlap the given window.
    ///
    /// Overlap is inclusive on both ends, matching the repository query
    /// `start_date <= window_end AND end_date >= window_start`.
    pub fn overlaps(&self, window_start: NaiveDate, window_end: NaiveDate) -> bool {
        self.start_date <= window_end && self.end_date >= window_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::VECTOR_LEN;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn board(prefers: [f64; 5]) -> BoardProfile {
        BoardProfile {
            board_id: BoardId::new(1),
            author_user_id: UserId::new(1),
            country_name: "FR".to_string(),
            start_date: date(2024, 7, 1),
            end_date: date(2024, 7, 10),
            prefer_gender: prefers[0],
            prefer_smoking: prefers[1],
            prefer_instagram_picture: prefers[2],
            prefer_shopping: prefers[3],
            prefer_drink: prefers[4],
            current_count: 1,
            max_count: 4,
        }
    }

    #[test]
    fn test_matching_vector_does_not_mutate_author() {
        let author = FeatureVector::new([1.0; VECTOR_LEN]);
        let before = author.clone();
        let _ = board([5.0; 5]).matching_vector(&author);
        assert_eq!(author, before);
    }

    #[test]
    fn test_matching_vector_perturbs_exactly_five_indices() {
        let author = FeatureVector::new([0.0; VECTOR_LEN]);
        let derived = board([5.0, 5.0, 5.0, 5.0, 5.0]).matching_vector(&author);

        assert_eq!(derived.components()[0], 2.0 * 24.0);
        assert_eq!(derived.components()[4], 2.0 * 16.0);
        assert_eq!(derived.components()[9], 2.0 * 9.0);
        assert_eq!(derived.components()[14], 2.0 * 10.0);
        assert_eq!(derived.components()[15], 2.0 * 24.0);

        for (i, component) in derived.components().iter().enumerate() {
            if ![0, 4, 9, 14, 15].contains(&i) {
                assert_eq!(*component, 0.0, "index {i} should be untouched");
            }
        }
    }

    #[test]
    fn test_midpoint_board_ratings_leave_vector_unchanged() {
        let author = FeatureVector::new([2.0; VECTOR_LEN]);
        let derived = board([3.0; 5]).matching_vector(&author);
        assert_eq!(derived, author);
    }

    #[test]
    fn test_date_overlap() {
        let b = board([3.0; 5]);
        assert!(b.overlaps(date(2024, 7, 5), date(2024, 7, 20)));
        assert!(b.overlaps(date(2024, 6, 1), date(2024, 7, 1)), "inclusive boundary");
        assert!(!b.overlaps(date(2024, 7, 11), date(2024, 7, 20)));
        assert!(!b.overlaps(date(2024, 6, 1), date(2024, 6, 30)));
    }
}
