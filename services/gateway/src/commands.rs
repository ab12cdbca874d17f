//! Inbound command wire shapes
//!
//! The four command kinds arrive as JSON with a `command` tag and a
//! `messageId` correlation id. Decoding into a closed enum keeps the
//! dispatch exhaustive; an unknown tag is a deserialization error handled
//! at the transport boundary, before any engine runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use types::ids::{PersonalityId, UserId};

/// The closed set of commands this service executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// A personality record was created; fold it into the cache.
    #[serde(rename_all = "camelCase")]
    AddUser { user_personality_id: PersonalityId },

    /// A personality record changed; recompute its list from scratch.
    #[serde(rename_all = "camelCase")]
    RecalculateUser { user_personality_id: PersonalityId },

    /// A personality record was removed; drop its entry and mark the
    /// rest stale.
    #[serde(rename_all = "camelCase")]
    DeleteUser { user_personality_id: PersonalityId },

    /// Run a capacitated match for one user over boards in a country and
    /// date window.
    #[serde(rename_all = "camelCase")]
    MatchBoards {
        user_id: UserId,
        country_name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

/// An inbound bus message: a command plus the correlation id every
/// outbound result must echo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "messageId")]
    pub correlation_id: String,
    #[serde(flatten)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_user() {
        let json = r#"{"command":"addUser","messageId":"m-17","userPersonalityId":4}"#;
        let message: InboundMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.correlation_id, "m-17");
        assert_eq!(
            message.command,
            Command::AddUser {
                user_personality_id: PersonalityId::new(4)
            }
        );
    }

    #[test]
    fn test_parse_match_boards() {
        let json = r#"{
            "command": "matchBoards",
            "messageId": "m-201",
            "userId": 7,
            "countryName": "FR",
            "startDate": "2024-07-05",
            "endDate": "2024-07-10"
        }"#;
        let message: InboundMessage = serde_json::from_str(json).unwrap();
        match message.command {
            Command::MatchBoards {
                user_id,
                country_name,
                start_date,
                end_date,
            } => {
                assert_eq!(user_id, UserId::new(7));
                assert_eq!(country_name, "FR");
                assert_eq!(start_date.to_string(), "2024-07-05");
                assert_eq!(end_date.to_string(), "2024-07-10");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_command_tag_is_rejected() {
        let json = r#"{"command":"dropAllUsers","messageId":"m-1"}"#;
        assert!(serde_json::from_str::<InboundMessage>(json).is_err());
    }

    #[test]
    fn test_round_trip() {
        let message = InboundMessage {
            correlation_id: "m-3".to_string(),
            command: Command::DeleteUser {
                user_personality_id: PersonalityId::new(11),
            },
        };
        let json = serde_json::to_string(&message).unwrap();
        let back: InboundMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }
}
