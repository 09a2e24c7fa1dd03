//! Value objects - Strongly-typed identifiers and immutable values

mod actor_id;
mod content_id;
mod fingerprint;
mod session_id;
mod speaker_id;
mod voice_id;

pub use actor_id::ActorId;
pub use content_id::ContentId;
pub use fingerprint::{EMBEDDING_DIM, VoiceFingerprint};
pub use session_id::SessionId;
pub use speaker_id::SpeakerId;
pub use voice_id::VoiceId;
