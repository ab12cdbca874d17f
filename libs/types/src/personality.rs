//! Personality records and the fixed weighting table
//!
//! A personality record holds a user's self-reported 1-5 ratings over the
//! 16 matching dimensions. [`PersonalityRecord::to_feature_vector`] is the
//! only way those ratings enter the scoring pipeline.

use serde::{Deserialize, Serialize};

use crate::ids::{PersonalityId, UserId};
use crate::vector::{FeatureVector, VECTOR_LEN};

/// Per-dimension weights applied when building a personal feature vector.
///
/// Order matches the field order of [`PersonalityRecord`]: gender, vegan,
/// islam, hindu, smoking, budget, accommodation flexibility, food
/// flexibility, activity, photo, food exploration, adventure, personality,
/// schedule, drink, age range.
pub const FEATURE_WEIGHTS: [f64; VECTOR_LEN] = [
    12.0, 12.0, 12.0, 12.0, 8.0, 10.0, 7.0, 7.0, 9.0, 9.0, 9.0, 9.0, 9.0, 7.0, 12.0, 12.0,
];

/// Rating midpoint; ratings are centered on it before weighting.
pub const RATING_MIDPOINT: f64 = 3.0;

/// A user's self-reported personality ratings.
///
/// Each rating is a Likert-style value in `[1, 5]`. `id` is the cache and
/// matching key; `user_id` links the record to its owning platform user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityRecord {
    pub id: PersonalityId,
    pub user_id: UserId,
    pub gender: f64,
    pub vegan: f64,
    pub islam: f64,
    pub hindu: f64,
    pub smoking: f64,
    pub budget: f64,
    pub accommodation_flexibility: f64,
    pub food_flexibility: f64,
    pub activity: f64,
    pub photo: f64,
    pub food_exploration: f64,
    pub adventure: f64,
    pub personality: f64,
    pub schedule: f64,
    pub drink: f64,
    pub age_range: f64,
}

impl PersonalityRecord {
    fn ratings(&self) -> [f64; VECTOR_LEN] {
        [
            self.gender,
            self.vegan,
            self.islam,
            self.hindu,
            self.smoking,
            self.budget,
            self.accommodation_flexibility,
            self.food_flexibility,
            self.activity,
            self.photo,
            self.food_exploration,
            self.adventure,
            self.personality,
            self.schedule,
            self.drink,
            self.age_range,
        ]
    }

    /// Build the weighted feature vector for this record.
    ///
    /// Total and pure: identical ratings always yield an identical vector.
    /// Component `i` is `(rating_i - 3.0) * FEATURE_WEIGHTS[i]`.
    pub fn to_feature_vector(&self) -> FeatureVector {
        let ratings = self.ratings();
        let mut components = [0.0; VECTOR_LEN];
        for i in 0..VECTOR_LEN {
            components[i] = (ratings[i] - RATING_MIDPOINT) * FEATURE_WEIGHTS[i];
        }
        FeatureVector::new(components)
    }
}
