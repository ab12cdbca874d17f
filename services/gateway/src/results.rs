//! Outbound result topics, message strings, and payload shapes
//!
//! Every executed command yields exactly one result message on its topic,
//! carrying the human-readable outcome string, the correlation id of the
//! request, and (for matches) the matched board ids.

use serde::{Deserialize, Serialize};

use types::errors::StoreError;
use types::ids::{BoardId, PersonalityId};

/// Outbound bus topics, one per command kind.
pub mod topics {
    pub const ADD_USER_RES: &str = "pubsub:addUserRes";
    pub const RECALCULATE_USER_RES: &str = "pubsub:reCalculateUserRes";
    pub const DELETE_USER_RES: &str = "pubsub:deleteUserRes";
    pub const MATCHING_RES: &str = "pubsub:matching";
}

/// Outcome strings carried in the `message` field.
pub mod messages {
    pub const ADD_SUCCESS: &str = "add user personality success";
    pub const ADD_FAILURE: &str = "fail to add user personality";
    pub const RECALCULATE_SUCCESS: &str = "recalculate user personality success";
    pub const RECALCULATE_FAILURE: &str = "fail to recalculate user personality";
    pub const DELETE_SUCCESS: &str = "delete user personality success";
    pub const DELETE_FAILURE: &str = "fail to delete user personality";
    pub const MATCHING_SUCCESS: &str = "matching success";
    pub const MATCHING_FAILURE: &str = "fail to matching";
}

/// Result of an add / recalculate / delete command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceResult {
    pub message: String,
    pub message_id: String,
    pub user_personality_id: PersonalityId,
}

/// Result of a match command. `board_id` is empty on failure and on the
/// legitimate zero-candidate-boards success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingResult {
    pub message: String,
    pub message_id: String,
    pub board_id: Vec<BoardId>,
}

/// Outbound side of the bus. Implementations serialize nothing: they
/// receive the encoded payload and deliver it to the topic.
pub trait ResultPublisher {
    fn publish(&mut self, topic: &str, payload: String) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maintenance_result_wire_shape() {
        let result = MaintenanceResult {
            message: messages::ADD_SUCCESS.to_string(),
            message_id: "m-5".to_string(),
            user_personality_id: PersonalityId::new(8),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"message":"add user personality success","messageId":"m-5","userPersonalityId":8}"#
        );
    }

    #[test]
    fn test_matching_result_wire_shape() {
        let result = MatchingResult {
            message: messages::MATCHING_SUCCESS.to_string(),
            message_id: "m-9".to_string(),
            board_id: vec![BoardId::new(3), BoardId::new(1)],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"message":"matching success","messageId":"m-9","boardId":[3,1]}"#
        );
    }
}
