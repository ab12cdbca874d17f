//! Command execution and result publication
//!
//! One inbound command runs to completion synchronously and yields
//! exactly one outbound result on the corresponding topic — never zero,
//! never more than one, success or failure. Partial failures inside an
//! add (sibling entries that could not be updated) are logged and folded
//! into that single result.

use tracing::{error, info, warn};

use matching_engine::{MatchCoordinator, MatchRequest};
use preference_cache::PreferenceCacheManager;
use types::errors::{CacheError, StoreError};
use types::ids::{BoardId, PersonalityId};
use types::repository::{BoardRepository, KeyValueCache, PersonalityRepository};

use crate::commands::{Command, InboundMessage};
use crate::results::{
    messages, topics, MaintenanceResult, MatchingResult, ResultPublisher,
};

/// Owns both engines and the outbound publisher.
///
/// The personality repository handle is cloned into both engines;
/// handles are pool-style and cheap to clone. `handle` takes `&mut self`:
/// one dispatcher instance processes one command at a time, which is the
/// single-writer discipline the cache requires.
pub struct Dispatcher<R, B, C, P> {
    cache: PreferenceCacheManager<R, C>,
    matcher: MatchCoordinator<R, B>,
    publisher: P,
}

impl<R, B, C, P> Dispatcher<R, B, C, P>
where
    R: PersonalityRepository + Clone,
    B: BoardRepository,
    C: KeyValueCache,
    P: ResultPublisher,
{
    pub fn new(personalities: R, boards: B, cache: C, publisher: P) -> Self {
        Self {
            cache: PreferenceCacheManager::new(personalities.clone(), cache),
            matcher: MatchCoordinator::new(personalities, boards),
            publisher,
        }
    }

    /// Access to the cache manager, for boundary code and tests.
    pub fn cache(&self) -> &PreferenceCacheManager<R, C> {
        &self.cache
    }

    /// Startup path: full cache rebuild from the source records.
    pub fn bootstrap(&mut self) -> Result<(), CacheError> {
        let report = self.cache.rebuild_all()?;
        info!(
            rebuilt = report.rebuilt,
            failed = report.failures.len(),
            "preference cache rebuilt at startup"
        );
        Ok(())
    }

    /// Execute one inbound command and publish its single result.
    ///
    /// Only a publish failure propagates; engine failures become the
    /// failure result for this correlation id.
    pub fn handle(&mut self, inbound: InboundMessage) -> Result<(), StoreError> {
        let correlation_id = inbound.correlation_id;
        match inbound.command {
            Command::AddUser {
                user_personality_id,
            } => match self.cache.add_one(user_personality_id) {
                Ok(report) => {
                    if !report.failures.is_empty() {
                        warn!(
                            personality_id = %user_personality_id,
                            failed = report.failures.len(),
                            updated = report.updated,
                            "add_one finished with sibling failures"
                        );
                    }
                    self.publish_maintenance(
                        topics::ADD_USER_RES,
                        messages::ADD_SUCCESS,
                        &correlation_id,
                        user_personality_id,
                    )
                }
                Err(e) => {
                    error!(personality_id = %user_personality_id, error = %e, "add_one failed");
                    self.publish_maintenance(
                        topics::ADD_USER_RES,
                        messages::ADD_FAILURE,
                        &correlation_id,
                        user_personality_id,
                    )
                }
            },

            Command::RecalculateUser {
                user_personality_id,
            } => match self.cache.recalculate_one(user_personality_id) {
                Ok(_) => self.publish_maintenance(
                    topics::RECALCULATE_USER_RES,
                    messages::RECALCULATE_SUCCESS,
                    &correlation_id,
                    user_personality_id,
                ),
                Err(e) => {
                    error!(personality_id = %user_personality_id, error = %e, "recalculate_one failed");
                    self.publish_maintenance(
                        topics::RECALCULATE_USER_RES,
                        messages::RECALCULATE_FAILURE,
                        &correlation_id,
                        user_personality_id,
                    )
                }
            },

            Command::DeleteUser {
                user_personality_id,
            } => match self.cache.delete_one(user_personality_id) {
                Ok(report) => {
                    if !report.failures.is_empty() {
                        warn!(
                            personality_id = %user_personality_id,
                            failed = report.failures.len(),
                            "delete_one finished with mark failures"
                        );
                    }
                    self.publish_maintenance(
                        topics::DELETE_USER_RES,
                        messages::DELETE_SUCCESS,
                        &correlation_id,
                        user_personality_id,
                    )
                }
                Err(e) => {
                    error!(personality_id = %user_personality_id, error = %e, "delete_one failed");
                    self.publish_maintenance(
                        topics::DELETE_USER_RES,
                        messages::DELETE_FAILURE,
                        &correlation_id,
                        user_personality_id,
                    )
                }
            },

            Command::MatchBoards {
                user_id,
                country_name,
                start_date,
                end_date,
            } => {
                let request = MatchRequest {
                    user_id,
                    country_name,
                    start_date,
                    end_date,
                };
                match self.matcher.match_user(&request) {
                    Ok(board_ids) => self.publish_matching(
                        messages::MATCHING_SUCCESS,
                        &correlation_id,
                        board_ids,
                    ),
                    Err(e) => {
                        error!(user_id = %request.user_id, error = %e, "match request failed");
                        self.publish_matching(
                            messages::MATCHING_FAILURE,
                            &correlation_id,
                            Vec::new(),
                        )
                    }
                }
            }
        }
    }

    fn publish_maintenance(
        &mut self,
        topic: &str,
        message: &str,
        correlation_id: &str,
        user_personality_id: PersonalityId,
    ) -> Result<(), StoreError> {
        let payload = MaintenanceResult {
            message: message.to_string(),
            message_id: correlation_id.to_string(),
            user_personality_id,
        };
        let json = serde_json::to_string(&payload)
            .map_err(|e| StoreError::Io(format!("result encoding: {e}")))?;
        self.publisher.publish(topic, json)
    }

    fn publish_matching(
        &mut self,
        message: &str,
        correlation_id: &str,
        board_id: Vec<BoardId>,
    ) -> Result<(), StoreError> {
        let payload = MatchingResult {
            message: message.to_string(),
            message_id: correlation_id.to_string(),
            board_id,
        };
        let json = serde_json::to_string(&payload)
            .map_err(|e| StoreError::Io(format!("result encoding: {e}")))?;
        self.publisher.publish(topics::MATCHING_RES, json)
    }
}
