use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{TopicId, UserId};

/// Completion record for one (user, topic) pair.
///
/// The store keeps at most one record per pair; finishing an assessment
/// again overwrites the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: UserId,
    pub topic_id: TopicId,
    pub completed: bool,
    /// Percentage score, 0 to 100.
    pub score: u8,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub completed_at: Option<OffsetDateTime>,
}
