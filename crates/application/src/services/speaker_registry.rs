//! Speaker registry - session-aware identification of recurring voices

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use domain::entities::{SpeakerProfile, VoiceCharacteristics};
use domain::value_objects::{SessionId, SpeakerId, VoiceFingerprint, VoiceId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::ports::SpeakerStore;

/// Configuration for speaker matching
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Cosine similarity at or above which a fingerprint matches a profile
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    /// Scale applied to the threshold for speakers already heard in the
    /// same session; below 1.0 makes within-session re-matching easier
    #[serde(default = "default_session_threshold_scale")]
    pub session_threshold_scale: f32,
}

const fn default_similarity_threshold() -> f32 {
    0.8
}

const fn default_session_threshold_scale() -> f32 {
    0.95
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            session_threshold_scale: default_session_threshold_scale(),
        }
    }
}

/// Serializable snapshot of the whole registry
#[derive(Debug, Clone, Serialize)]
pub struct RegistryExport {
    /// Number of speakers ever minted
    pub total_speakers: usize,
    /// Every speaker profile, ordered by id
    pub speakers: Vec<SpeakerProfile>,
}

struct RegistryState {
    /// Profiles in mint order; matching iterates in this order so ties go
    /// to the earliest speaker
    profiles: Vec<SpeakerProfile>,
    /// Speakers heard per session, in first-heard order; in-memory only
    session_speakers: HashMap<SessionId, Vec<SpeakerId>>,
    /// Next 1-based mint index
    next_index: usize,
}

/// Registry of recurring voices
///
/// All matching and minting happens under one async lock, so concurrent
/// `identify` calls are atomic: two simultaneous first sightings of the
/// same voice cannot both mint a speaker.
pub struct SpeakerRegistry {
    config: RegistryConfig,
    store: Arc<dyn SpeakerStore>,
    state: Mutex<RegistryState>,
}

impl fmt::Debug for SpeakerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeakerRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SpeakerRegistry {
    /// Create a registry, hydrating known speakers from the store
    ///
    /// A store that fails to load is treated as empty; identification
    /// continues in memory.
    pub async fn new(config: RegistryConfig, store: Arc<dyn SpeakerStore>) -> Self {
        let mut profiles = match store.load_all().await {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!(error = %e, "speaker store load failed; starting with empty registry");
                Vec::new()
            },
        };
        profiles.sort_by_key(|p| speaker_index(&p.speaker_id));
        let next_index = profiles
            .iter()
            .filter_map(|p| speaker_index(&p.speaker_id))
            .max()
            .map_or(1, |max| max + 1);
        info!(speakers = profiles.len(), "speaker registry ready");

        Self {
            config,
            store,
            state: Mutex::new(RegistryState {
                profiles,
                session_speakers: HashMap::new(),
                next_index,
            }),
        }
    }

    /// The configured global similarity threshold
    #[must_use]
    pub const fn similarity_threshold(&self) -> f32 {
        self.config.similarity_threshold
    }

    /// Identify the speaker behind a fingerprint
    ///
    /// Equivalent to [`Self::observe`] with no characteristics; a profile
    /// minted through this path has all acoustic metrics absent.
    pub async fn identify(
        &self,
        fingerprint: &VoiceFingerprint,
        session_id: &SessionId,
    ) -> SpeakerId {
        self.observe(fingerprint, VoiceCharacteristics::default(), session_id)
            .await
    }

    /// Identify the speaker behind a fingerprint, capturing characteristics
    /// if a new profile is minted
    ///
    /// Speakers already heard in this session are tried first at a relaxed
    /// threshold; then all speakers at the global threshold; a fingerprint
    /// matching nothing mints the next sequential speaker id. Matched
    /// profiles absorb the observation (confidence-scaled moving average).
    #[instrument(skip(self, fingerprint, characteristics), fields(session = %session_id))]
    pub async fn observe(
        &self,
        fingerprint: &VoiceFingerprint,
        characteristics: VoiceCharacteristics,
        session_id: &SessionId,
    ) -> SpeakerId {
        let mut state = self.state.lock().await;

        let session_ids = state
            .session_speakers
            .get(session_id)
            .cloned()
            .unwrap_or_default();
        let session_threshold =
            self.config.similarity_threshold * self.config.session_threshold_scale;

        let matched = best_match(&state.profiles, fingerprint, Some(&session_ids))
            .filter(|&(_, similarity)| similarity >= session_threshold)
            .or_else(|| {
                best_match(&state.profiles, fingerprint, None)
                    .filter(|&(_, similarity)| similarity >= self.config.similarity_threshold)
            });

        let speaker_id = if let Some((index, similarity)) = matched {
            let profile = &mut state.profiles[index];
            profile.absorb(fingerprint);
            debug!(
                speaker = %profile.speaker_id,
                similarity,
                confidence = profile.confidence,
                "matched existing speaker"
            );
            profile.speaker_id.clone()
        } else {
            let speaker_id = SpeakerId::from_index(state.next_index);
            state.next_index += 1;
            info!(speaker = %speaker_id, "minted new speaker");
            state.profiles.push(SpeakerProfile::new(
                speaker_id.clone(),
                fingerprint.clone(),
                characteristics,
            ));
            speaker_id
        };

        let heard = state
            .session_speakers
            .entry(session_id.clone())
            .or_default();
        if !heard.contains(&speaker_id) {
            heard.push(speaker_id.clone());
        }

        if let Some(profile) = state
            .profiles
            .iter()
            .find(|p| p.speaker_id == speaker_id)
            .cloned()
            && let Err(e) = self.store.save(profile).await
        {
            warn!(error = %e, speaker = %speaker_id, "speaker save failed; continuing in memory");
        }

        speaker_id
    }

    /// Associate a synthesis voice clone with a speaker
    ///
    /// Returns false if the speaker is unknown.
    pub async fn set_voice_clone_id(&self, speaker_id: &SpeakerId, voice_id: VoiceId) -> bool {
        let mut state = self.state.lock().await;
        let Some(profile) = state
            .profiles
            .iter_mut()
            .find(|p| &p.speaker_id == speaker_id)
        else {
            return false;
        };
        profile.set_voice_clone(voice_id);
        let snapshot = profile.clone();
        drop(state);

        if let Err(e) = self.store.save(snapshot).await {
            warn!(error = %e, speaker = %speaker_id, "speaker save failed; continuing in memory");
        }
        true
    }

    /// Snapshot of one speaker's profile
    pub async fn get_speaker_profile(&self, speaker_id: &SpeakerId) -> Option<SpeakerProfile> {
        let state = self.state.lock().await;
        state
            .profiles
            .iter()
            .find(|p| &p.speaker_id == speaker_id)
            .cloned()
    }

    /// Snapshot of every known speaker, in mint order
    pub async fn get_all_speakers(&self) -> Vec<SpeakerProfile> {
        self.state.lock().await.profiles.clone()
    }

    /// Speakers heard in a session so far, in first-heard order
    pub async fn get_session_speakers(&self, session_id: &SessionId) -> Vec<SpeakerId> {
        let state = self.state.lock().await;
        state
            .session_speakers
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Forget which speakers were heard in a session
    ///
    /// Profiles themselves are untouched; only the session-local matching
    /// preference disappears.
    pub async fn reset_session(&self, session_id: &SessionId) {
        self.state.lock().await.session_speakers.remove(session_id);
    }

    /// Serializable snapshot of the whole registry
    pub async fn export(&self) -> RegistryExport {
        let speakers = self.get_all_speakers().await;
        RegistryExport {
            total_speakers: speakers.len(),
            speakers,
        }
    }
}

/// Index of the most similar profile, restricted to `within` when given
///
/// Strict comparison keeps the first-encountered profile on ties.
fn best_match(
    profiles: &[SpeakerProfile],
    fingerprint: &VoiceFingerprint,
    within: Option<&[SpeakerId]>,
) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, profile) in profiles.iter().enumerate() {
        if let Some(ids) = within
            && !ids.contains(&profile.speaker_id)
        {
            continue;
        }
        let similarity = fingerprint.similarity(&profile.embedding);
        if best.is_none_or(|(_, b)| similarity > b) {
            best = Some((index, similarity));
        }
    }
    best
}

fn speaker_index(id: &SpeakerId) -> Option<usize> {
    id.as_str().strip_prefix("speaker_")?.parse().ok()
}
