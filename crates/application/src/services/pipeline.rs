//! Session pipeline - per-chunk dubbing orchestration

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use domain::entities::{ProcessingRequest, ProcessingResponse, ProcessingStatus, SessionSummary};
use domain::value_objects::{ActorId, SessionId, SpeakerId, VoiceId};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use voice_analysis::{CharacteristicsAnalyzer, EmbeddingExtractor};

use crate::error::ApplicationError;
use crate::ports::{RecognitionPort, TranslationPort};
use crate::services::{ActorDirectory, SpeakerRegistry, VoiceIdentityBank};

/// Configuration for the pipeline orchestrator
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Deadline for each external call (recognition, translation,
    /// synthesis) in seconds
    #[serde(default = "default_port_timeout_secs")]
    pub port_timeout_secs: u64,
}

const fn default_port_timeout_secs() -> u64 {
    30
}

impl PipelineConfig {
    const fn port_timeout(&self) -> Duration {
        Duration::from_secs(self.port_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            port_timeout_secs: default_port_timeout_secs(),
        }
    }
}

struct SessionEntry {
    /// Serializes chunk processing within one session
    gate: tokio::sync::Mutex<()>,
    summary: parking_lot::Mutex<SessionSummary>,
}

impl SessionEntry {
    fn new(session_id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            gate: tokio::sync::Mutex::new(()),
            summary: parking_lot::Mutex::new(SessionSummary {
                session_id,
                speakers: Vec::new(),
                actors: Vec::new(),
                languages_detected: Vec::new(),
                chunk_count: 0,
                created_at: now,
                last_activity: now,
            }),
        }
    }
}

/// Orchestrates the full dubbing flow for audio chunks
///
/// One chunk goes through identify, recognize, translate, and synthesize;
/// the result is always a well-formed [`ProcessingResponse`]. Chunks of the
/// same session are processed strictly in submission order; different
/// sessions run in parallel.
pub struct DubbingPipeline {
    config: PipelineConfig,
    extractor: Arc<EmbeddingExtractor>,
    analyzer: Arc<CharacteristicsAnalyzer>,
    registry: Arc<SpeakerRegistry>,
    voice_bank: Arc<VoiceIdentityBank>,
    actor_directory: Arc<ActorDirectory>,
    recognition: Arc<dyn RecognitionPort>,
    translation: Arc<dyn TranslationPort>,
    sessions: parking_lot::Mutex<HashMap<SessionId, Arc<SessionEntry>>>,
}

impl fmt::Debug for DubbingPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DubbingPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DubbingPipeline {
    /// Wire up a pipeline from its collaborators
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: PipelineConfig,
        extractor: Arc<EmbeddingExtractor>,
        analyzer: Arc<CharacteristicsAnalyzer>,
        registry: Arc<SpeakerRegistry>,
        voice_bank: Arc<VoiceIdentityBank>,
        actor_directory: Arc<ActorDirectory>,
        recognition: Arc<dyn RecognitionPort>,
        translation: Arc<dyn TranslationPort>,
    ) -> Self {
        Self {
            config,
            extractor,
            analyzer,
            registry,
            voice_bank,
            actor_directory,
            recognition,
            translation,
            sessions: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Process one audio chunk end to end
    ///
    /// Never returns an error: every internal failure becomes a `Failed`
    /// response carrying the reason and the elapsed time.
    #[instrument(skip(self, request), fields(session = %request.session_id, chunk = %request.audio.chunk_id))]
    pub async fn process_chunk(&self, request: ProcessingRequest) -> ProcessingResponse {
        let started = Instant::now();
        let entry = self.session_entry(&request.session_id);
        let _in_order = entry.gate.lock().await;

        match self.run_chunk(&request, &entry, started).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "chunk processing failed");
                ProcessingResponse::failed(e.to_string(), elapsed_ms(started))
            },
        }
    }

    async fn run_chunk(
        &self,
        request: &ProcessingRequest,
        entry: &SessionEntry,
        started: Instant,
    ) -> Result<ProcessingResponse, ApplicationError> {
        // Acoustic analysis is CPU-bound; keep it off the async workers
        let samples = request.audio.samples.clone();
        let sample_rate = request.audio.sample_rate;
        let extractor = Arc::clone(&self.extractor);
        let analyzer = Arc::clone(&self.analyzer);
        let (fingerprint, characteristics) = tokio::task::spawn_blocking(move || {
            let fingerprint = extractor.extract(&samples, sample_rate);
            let characteristics = analyzer.analyze(&samples, sample_rate);
            (fingerprint, characteristics)
        })
        .await
        .map_err(|e| ApplicationError::Internal(format!("analysis task failed: {e}")))?;

        let (speaker_id, actor_id) = if request.actor_aware {
            self.actor_directory
                .resolve(
                    &fingerprint,
                    characteristics,
                    &request.session_id,
                    request.content_id.as_ref(),
                )
                .await
        } else {
            (
                self.registry
                    .observe(&fingerprint, characteristics, &request.session_id)
                    .await,
                None,
            )
        };
        if let (Some(actor_id), Some(content_id)) = (&actor_id, &request.content_id) {
            self.actor_directory
                .track_in_content(content_id, actor_id)
                .await;
        }

        let recognition = self
            .with_deadline(
                "recognition",
                self.recognition.recognize(
                    request.audio.samples.clone(),
                    sample_rate,
                    request.source_language.clone(),
                ),
            )
            .await?;

        if recognition.text.trim().is_empty() {
            self.record_activity(
                entry,
                &speaker_id,
                actor_id.as_ref(),
                recognition.detected_language.as_deref(),
            );
            return Ok(ProcessingResponse::no_content(
                Some(speaker_id),
                actor_id,
                elapsed_ms(started),
            ));
        }

        let translation = self
            .with_deadline(
                "translation",
                self.translation.translate(
                    recognition.text.clone(),
                    request.target_language.clone(),
                    recognition
                        .detected_language
                        .clone()
                        .or_else(|| request.source_language.clone()),
                ),
            )
            .await?;

        let voice_hint = self.actor_voice_hint(actor_id.as_ref()).await;
        let profile = if voice_hint.is_some() || request.preserve_voice {
            self.registry.get_speaker_profile(&speaker_id).await
        } else {
            None
        };
        let outcome = self
            .with_deadline(
                "synthesis",
                self.voice_bank.synthesize(
                    &translation.translated_text,
                    voice_hint.as_ref(),
                    profile.as_ref(),
                ),
            )
            .await?;

        self.record_activity(
            entry,
            &speaker_id,
            actor_id.as_ref(),
            recognition.detected_language.as_deref(),
        );

        Ok(ProcessingResponse {
            request_id: Uuid::new_v4(),
            status: ProcessingStatus::Completed,
            original_text: Some(recognition.text),
            translated_text: Some(translation.translated_text),
            dubbed_audio: Some(outcome.audio),
            speaker_id: Some(speaker_id),
            actor_id,
            voice_id: Some(outcome.voice_id),
            detected_language: recognition.detected_language,
            error_message: None,
            processing_time_ms: elapsed_ms(started),
        })
    }

    /// Clone a speaker's voice and wire it into the speaker profile
    ///
    /// Optionally also registers the voice with an actor. The display name
    /// defaults to one derived from the speaker id.
    #[instrument(skip(self, samples), fields(speaker = %speaker_id))]
    pub async fn create_voice_clone(
        &self,
        speaker_id: &SpeakerId,
        samples: Vec<Vec<u8>>,
        display_name: Option<String>,
        actor_id: Option<&ActorId>,
    ) -> Result<VoiceId, ApplicationError> {
        let name = display_name.unwrap_or_else(|| format!("{speaker_id} voice"));
        let voice_id = self
            .voice_bank
            .clone_speaker_voice(speaker_id, &name, samples)
            .await?;

        if !self
            .registry
            .set_voice_clone_id(speaker_id, voice_id.clone())
            .await
        {
            warn!(voice = %voice_id, "clone created for a speaker the registry does not know");
        }
        if let Some(actor_id) = actor_id {
            self.actor_directory
                .add_voice_to_actor(actor_id, voice_id.clone())
                .await;
        }
        Ok(voice_id)
    }

    /// Aggregate state of a session, if it has processed anything
    pub fn get_session_info(&self, session_id: &SessionId) -> Option<SessionSummary> {
        self.sessions
            .lock()
            .get(session_id)
            .map(|entry| entry.summary.lock().clone())
    }

    /// Profiles of every speaker heard in a session so far
    pub async fn get_speaker_profiles(
        &self,
        session_id: &SessionId,
    ) -> Vec<domain::entities::SpeakerProfile> {
        let speaker_ids = self.registry.get_session_speakers(session_id).await;
        let mut profiles = Vec::with_capacity(speaker_ids.len());
        for speaker_id in &speaker_ids {
            if let Some(profile) = self.registry.get_speaker_profile(speaker_id).await {
                profiles.push(profile);
            }
        }
        profiles
    }

    /// Tear down a session, returning its final summary
    ///
    /// Speaker profiles survive; only session-scoped state disappears.
    pub async fn end_session(&self, session_id: &SessionId) -> Option<SessionSummary> {
        let entry = self.sessions.lock().remove(session_id);
        self.registry.reset_session(session_id).await;
        let summary = entry.map(|entry| entry.summary.lock().clone());
        if let Some(summary) = &summary {
            info!(
                session = %session_id,
                chunks = summary.chunk_count,
                speakers = summary.speakers.len(),
                "session ended"
            );
        }
        summary
    }

    fn session_entry(&self, session_id: &SessionId) -> Arc<SessionEntry> {
        Arc::clone(
            self.sessions
                .lock()
                .entry(session_id.clone())
                .or_insert_with(|| Arc::new(SessionEntry::new(session_id.clone()))),
        )
    }

    async fn actor_voice_hint(&self, actor_id: Option<&ActorId>) -> Option<VoiceId> {
        let actor_id = actor_id?;
        let voices = self.actor_directory.voices_of_actor(actor_id).await;
        self.voice_bank.best_voice_for_clones(&voices).await
    }

    fn record_activity(
        &self,
        entry: &SessionEntry,
        speaker_id: &SpeakerId,
        actor_id: Option<&ActorId>,
        detected_language: Option<&str>,
    ) {
        let mut summary = entry.summary.lock();
        if !summary.speakers.contains(speaker_id) {
            summary.speakers.push(speaker_id.clone());
        }
        if let Some(actor_id) = actor_id
            && !summary.actors.contains(actor_id)
        {
            summary.actors.push(actor_id.clone());
        }
        if let Some(language) = detected_language
            && !summary.languages_detected.iter().any(|l| l == language)
        {
            summary.languages_detected.push(language.to_string());
        }
        summary.chunk_count += 1;
        summary.last_activity = Utc::now();
    }

    async fn with_deadline<T>(
        &self,
        stage: &str,
        call: impl Future<Output = Result<T, ApplicationError>>,
    ) -> Result<T, ApplicationError> {
        match tokio::time::timeout(self.config.port_timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(ApplicationError::Timeout(stage.to_string())),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
