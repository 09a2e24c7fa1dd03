//! Actor directory - cross-content identity on top of the speaker registry

use std::fmt;
use std::sync::Arc;

use domain::entities::{ActorProfile, VoiceCharacteristics};
use domain::value_objects::{ActorId, ContentId, SessionId, SpeakerId, VoiceFingerprint, VoiceId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::ports::{ActorDirectoryDocument, ActorStore};
use crate::services::SpeakerRegistry;

/// Configuration for actor resolution
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Subtracted from the registry's global threshold when matching a new
    /// speaker against the speakers of actors already tracked in the same
    /// content item
    #[serde(default = "default_content_match_relaxation")]
    pub content_match_relaxation: f32,
}

const fn default_content_match_relaxation() -> f32 {
    0.05
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            content_match_relaxation: default_content_match_relaxation(),
        }
    }
}

struct DirectoryState {
    document: ActorDirectoryDocument,
    next_index: usize,
}

/// Directory of human-level identities spanning speakers and content items
pub struct ActorDirectory {
    config: DirectoryConfig,
    registry: Arc<SpeakerRegistry>,
    store: Arc<dyn ActorStore>,
    state: Mutex<DirectoryState>,
}

impl fmt::Debug for ActorDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorDirectory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ActorDirectory {
    /// Create a directory, hydrating from the store
    ///
    /// A store that fails to load is treated as empty.
    pub async fn new(
        config: DirectoryConfig,
        registry: Arc<SpeakerRegistry>,
        store: Arc<dyn ActorStore>,
    ) -> Self {
        let document = match store.load().await {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "actor store load failed; starting with empty directory");
                ActorDirectoryDocument::default()
            },
        };
        let next_index = document
            .actors
            .keys()
            .filter_map(actor_index)
            .max()
            .map_or(1, |max| max + 1);
        info!(actors = document.actors.len(), "actor directory ready");

        Self {
            config,
            registry,
            store,
            state: Mutex::new(DirectoryState {
                document,
                next_index,
            }),
        }
    }

    /// Create an actor grouping the given speakers
    #[instrument(skip(self, speaker_ids))]
    pub async fn create_actor(&self, name: &str, speaker_ids: Vec<SpeakerId>) -> ActorId {
        let mut state = self.state.lock().await;
        let actor_id = ActorId::from_index(state.next_index);
        state.next_index += 1;

        let profile = ActorProfile::new(actor_id.clone(), name, speaker_ids);
        for speaker_id in &profile.speaker_ids {
            state
                .document
                .speaker_actors
                .insert(speaker_id.clone(), actor_id.clone());
        }
        state.document.actors.insert(actor_id.clone(), profile);
        info!(actor = %actor_id, name, "actor created");

        self.persist(&state.document).await;
        actor_id
    }

    /// Link a speaker to an actor
    ///
    /// Returns false if the actor does not exist or the registry does not
    /// know the speaker. Re-associating a speaker moves it: the
    /// speaker-to-actor mapping is overwritten. The speaker's current
    /// voice clone, if any, is pulled into the actor.
    #[instrument(skip(self), fields(speaker = %speaker_id, actor = %actor_id))]
    pub async fn associate_speaker(&self, speaker_id: &SpeakerId, actor_id: &ActorId) -> bool {
        let Some(speaker) = self.registry.get_speaker_profile(speaker_id).await else {
            debug!("speaker unknown to the registry");
            return false;
        };

        let mut state = self.state.lock().await;
        let Some(actor) = state.document.actors.get_mut(actor_id) else {
            debug!("actor does not exist");
            return false;
        };
        actor.add_speaker(speaker_id.clone());
        if let Some(voice_id) = speaker.voice_clone_id {
            actor.add_voice(voice_id);
        }
        state
            .document
            .speaker_actors
            .insert(speaker_id.clone(), actor_id.clone());

        self.persist(&state.document).await;
        true
    }

    /// Identify the speaker and resolve it to an actor if possible
    ///
    /// The registry identifies (or mints) the speaker first. A speaker
    /// already mapped to an actor wins immediately. Otherwise, when a
    /// content id is given, the fingerprint is compared against every
    /// speaker of every actor tracked in that content at a relaxed
    /// threshold; the best match above the bar associates the new speaker
    /// with that actor as a side effect.
    #[instrument(skip(self, fingerprint, characteristics), fields(session = %session_id))]
    pub async fn resolve(
        &self,
        fingerprint: &VoiceFingerprint,
        characteristics: VoiceCharacteristics,
        session_id: &SessionId,
        content_id: Option<&ContentId>,
    ) -> (SpeakerId, Option<ActorId>) {
        let speaker_id = self
            .registry
            .observe(fingerprint, characteristics, session_id)
            .await;

        if let Some(actor_id) = self.actor_for_speaker(&speaker_id).await {
            return (speaker_id, Some(actor_id));
        }
        let Some(content_id) = content_id else {
            return (speaker_id, None);
        };

        let candidates: Vec<(ActorId, SpeakerId)> = {
            let state = self.state.lock().await;
            state
                .document
                .content_actors
                .get(content_id)
                .map(|actor_ids| {
                    actor_ids
                        .iter()
                        .filter_map(|id| state.document.actors.get(id))
                        .flat_map(|actor| {
                            actor
                                .speaker_ids
                                .iter()
                                .map(|s| (actor.actor_id.clone(), s.clone()))
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        let relaxed_threshold =
            self.registry.similarity_threshold() - self.config.content_match_relaxation;
        let mut best: Option<(ActorId, f32)> = None;
        for (actor_id, candidate_speaker) in candidates {
            let Some(profile) = self.registry.get_speaker_profile(&candidate_speaker).await
            else {
                continue;
            };
            let similarity = fingerprint.similarity(&profile.embedding);
            if similarity >= relaxed_threshold
                && best.as_ref().is_none_or(|(_, b)| similarity > *b)
            {
                best = Some((actor_id, similarity));
            }
        }

        if let Some((actor_id, similarity)) = best {
            debug!(
                actor = %actor_id,
                similarity,
                "relaxed content match; associating speaker"
            );
            self.associate_speaker(&speaker_id, &actor_id).await;
            return (speaker_id, Some(actor_id));
        }
        (speaker_id, None)
    }

    /// Record that an actor appears in a content item
    ///
    /// Idempotent; returns false only for unknown actors.
    pub async fn track_in_content(&self, content_id: &ContentId, actor_id: &ActorId) -> bool {
        let mut state = self.state.lock().await;
        let Some(actor) = state.document.actors.get_mut(actor_id) else {
            return false;
        };
        let newly_tracked = actor.record_appearance(content_id.clone());

        let members = state
            .document
            .content_actors
            .entry(content_id.clone())
            .or_default();
        if !members.contains(actor_id) {
            members.push(actor_id.clone());
        }

        if newly_tracked {
            self.persist(&state.document).await;
        }
        true
    }

    /// Add a synthesis voice to an actor
    ///
    /// Returns false for unknown actors.
    pub async fn add_voice_to_actor(&self, actor_id: &ActorId, voice_id: VoiceId) -> bool {
        let mut state = self.state.lock().await;
        let Some(actor) = state.document.actors.get_mut(actor_id) else {
            return false;
        };
        if actor.add_voice(voice_id) {
            self.persist(&state.document).await;
        }
        true
    }

    /// Rename an actor
    ///
    /// Returns false for unknown actors.
    pub async fn update_actor_name(&self, actor_id: &ActorId, name: &str) -> bool {
        let mut state = self.state.lock().await;
        let Some(actor) = state.document.actors.get_mut(actor_id) else {
            return false;
        };
        actor.name = name.to_string();
        actor.updated_at = chrono::Utc::now();
        self.persist(&state.document).await;
        true
    }

    /// Every actor, ordered by id
    pub async fn all_actors(&self) -> Vec<ActorProfile> {
        let state = self.state.lock().await;
        let mut actors: Vec<ActorProfile> = state.document.actors.values().cloned().collect();
        actors.sort_by(|a, b| a.actor_id.cmp(&b.actor_id));
        actors
    }

    /// Actors tracked in a content item, in tracking order
    pub async fn actors_in_content(&self, content_id: &ContentId) -> Vec<ActorProfile> {
        let state = self.state.lock().await;
        state
            .document
            .content_actors
            .get(content_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.document.actors.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The actor a speaker currently resolves to
    pub async fn actor_for_speaker(&self, speaker_id: &SpeakerId) -> Option<ActorId> {
        let state = self.state.lock().await;
        state.document.speaker_actors.get(speaker_id).cloned()
    }

    /// Snapshot of one actor profile
    pub async fn get_actor(&self, actor_id: &ActorId) -> Option<ActorProfile> {
        self.state.lock().await.document.actors.get(actor_id).cloned()
    }

    /// Voices owned by an actor, in insertion order
    pub async fn voices_of_actor(&self, actor_id: &ActorId) -> Vec<VoiceId> {
        let state = self.state.lock().await;
        state
            .document
            .actors
            .get(actor_id)
            .map(|actor| actor.voice_ids.clone())
            .unwrap_or_default()
    }

    async fn persist(&self, document: &ActorDirectoryDocument) {
        if let Err(e) = self.store.save(document.clone()).await {
            warn!(error = %e, "actor directory save failed; continuing in memory");
        }
    }
}

fn actor_index(id: &ActorId) -> Option<usize> {
    id.as_str().strip_prefix("actor_")?.parse().ok()
}
