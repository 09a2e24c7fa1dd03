//! Session summary - snapshot of one session's aggregate state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ActorId, SessionId, SpeakerId};

/// Snapshot of a session's aggregate state
///
/// Sessions are ephemeral; this summary is what the orchestration layer
/// reports to clients asking for session info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// The session
    pub session_id: SessionId,
    /// Speakers identified in this session
    pub speakers: Vec<SpeakerId>,
    /// Actors resolved in this session
    pub actors: Vec<ActorId>,
    /// Languages recognition has detected
    pub languages_detected: Vec<String>,
    /// Number of chunks processed
    pub chunk_count: u64,
    /// When the session saw its first chunk
    pub created_at: DateTime<Utc>,
    /// When the session last processed a chunk
    pub last_activity: DateTime<Utc>,
}
