//! End-to-end pipeline flow over in-memory adapters
//!
//! Exercises the real extractor and services together: only the external
//! model calls (recognition, translation, synthesis) and the stores are
//! replaced with in-memory fakes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use application::{
    ActorDirectory, ActorDirectoryDocument, ActorStore, ApplicationError, DirectoryConfig,
    DubbingPipeline, PipelineConfig, RecognitionPort, RecognitionResult, RegistryConfig,
    SpeakerRegistry, SpeakerStore, SynthesisPort, SynthesizedAudio, TranslationPort,
    TranslationResult, VoiceBankConfig, VoiceIdentityBank, VoiceLibraryDocument,
    VoiceLibraryStore,
};
use async_trait::async_trait;
use domain::entities::{AudioChunk, ProcessingRequest, ProcessingStatus, SpeakerProfile};
use domain::value_objects::{ContentId, SessionId, SpeakerId, VoiceId};

struct FixedRecognition {
    text: &'static str,
}

#[async_trait]
impl RecognitionPort for FixedRecognition {
    async fn recognize(
        &self,
        _samples: Vec<f32>,
        _sample_rate: u32,
        _language_hint: Option<String>,
    ) -> Result<RecognitionResult, ApplicationError> {
        Ok(RecognitionResult {
            text: self.text.to_string(),
            detected_language: Some("en".to_string()),
            confidence: Some(0.94),
        })
    }
}

struct TaggingTranslation;

#[async_trait]
impl TranslationPort for TaggingTranslation {
    async fn translate(
        &self,
        text: String,
        target_language: String,
        _source_language: Option<String>,
    ) -> Result<TranslationResult, ApplicationError> {
        Ok(TranslationResult {
            translated_text: format!("[{target_language}] {text}"),
            source_language: Some("en".to_string()),
            confidence: Some(0.9),
        })
    }
}

#[derive(Default)]
struct CountingSynthesis {
    clones: AtomicU32,
}

#[async_trait]
impl SynthesisPort for CountingSynthesis {
    async fn synthesize(
        &self,
        text: String,
        _voice_id: VoiceId,
        _settings: domain::entities::SynthesisSettings,
    ) -> Result<SynthesizedAudio, ApplicationError> {
        Ok(SynthesizedAudio {
            audio: text.into_bytes(),
            duration_ms: Some(700),
        })
    }

    async fn clone_voice(
        &self,
        _display_name: String,
        _description: Option<String>,
        _samples: Vec<Vec<u8>>,
    ) -> Result<VoiceId, ApplicationError> {
        let n = self.clones.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(VoiceId::new(format!("voice_{n}")))
    }
}

#[derive(Default)]
struct MemorySpeakerStore {
    profiles: parking_lot::Mutex<HashMap<SpeakerId, SpeakerProfile>>,
}

#[async_trait]
impl SpeakerStore for MemorySpeakerStore {
    async fn load_all(&self) -> Result<Vec<SpeakerProfile>, ApplicationError> {
        Ok(self.profiles.lock().values().cloned().collect())
    }

    async fn save(&self, profile: SpeakerProfile) -> Result<(), ApplicationError> {
        self.profiles
            .lock()
            .insert(profile.speaker_id.clone(), profile);
        Ok(())
    }
}

#[derive(Default)]
struct MemoryLibraryStore {
    document: parking_lot::Mutex<Option<VoiceLibraryDocument>>,
}

#[async_trait]
impl VoiceLibraryStore for MemoryLibraryStore {
    async fn load(&self) -> Result<VoiceLibraryDocument, ApplicationError> {
        Ok(self.document.lock().clone().unwrap_or_default())
    }

    async fn save(&self, document: VoiceLibraryDocument) -> Result<(), ApplicationError> {
        *self.document.lock() = Some(document);
        Ok(())
    }
}

#[derive(Default)]
struct MemoryActorStore {
    document: parking_lot::Mutex<Option<ActorDirectoryDocument>>,
}

#[async_trait]
impl ActorStore for MemoryActorStore {
    async fn load(&self) -> Result<ActorDirectoryDocument, ApplicationError> {
        Ok(self.document.lock().clone().unwrap_or_default())
    }

    async fn save(&self, document: ActorDirectoryDocument) -> Result<(), ApplicationError> {
        *self.document.lock() = Some(document);
        Ok(())
    }
}

struct Harness {
    pipeline: DubbingPipeline,
    registry: Arc<SpeakerRegistry>,
    directory: Arc<ActorDirectory>,
    speaker_store: Arc<MemorySpeakerStore>,
}

async fn harness() -> Harness {
    harness_with_text("good evening everyone").await
}

async fn harness_with_text(text: &'static str) -> Harness {
    let speaker_store = Arc::new(MemorySpeakerStore::default());
    let registry = Arc::new(
        SpeakerRegistry::new(
            RegistryConfig::default(),
            Arc::clone(&speaker_store) as Arc<dyn SpeakerStore>,
        )
        .await,
    );
    let voice_bank = Arc::new(
        VoiceIdentityBank::new(
            VoiceBankConfig::default(),
            Arc::new(CountingSynthesis::default()),
            Arc::new(MemoryLibraryStore::default()),
        )
        .await,
    );
    let directory = Arc::new(
        ActorDirectory::new(
            DirectoryConfig::default(),
            Arc::clone(&registry),
            Arc::new(MemoryActorStore::default()),
        )
        .await,
    );
    let pipeline = DubbingPipeline::new(
        PipelineConfig::default(),
        Arc::new(voice_analysis::EmbeddingExtractor::default()),
        Arc::new(voice_analysis::CharacteristicsAnalyzer::default()),
        Arc::clone(&registry),
        voice_bank,
        Arc::clone(&directory),
        Arc::new(FixedRecognition { text }),
        Arc::new(TaggingTranslation),
    );
    Harness {
        pipeline,
        registry,
        directory,
        speaker_store,
    }
}

/// A harmonic voice-like signal at the given fundamental
fn voice(fundamental: f32, secs: f32) -> Vec<f32> {
    let sample_rate = 16_000.0f32;
    (0..(secs * sample_rate) as usize)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let mut s = 0.0;
            for (h, amp) in [(1.0, 1.0), (2.0, 0.5), (3.0, 0.25)] {
                s += amp * (std::f32::consts::TAU * fundamental * h * t).sin();
            }
            s * 0.3
        })
        .collect()
}

fn request(session: &str, samples: Vec<f32>) -> ProcessingRequest {
    ProcessingRequest::new(
        SessionId::from(session),
        AudioChunk::new(samples, 16_000),
        "de",
    )
}

#[tokio::test]
async fn distinct_voices_get_sequential_speakers() {
    let h = harness().await;

    let low = h.pipeline.process_chunk(request("s1", voice(120.0, 1.0))).await;
    let high = h.pipeline.process_chunk(request("s1", voice(300.0, 1.0))).await;

    assert_eq!(low.status, ProcessingStatus::Completed);
    assert_eq!(high.status, ProcessingStatus::Completed);
    assert_eq!(
        low.speaker_id.as_ref().map(SpeakerId::as_str),
        Some("speaker_001")
    );
    assert_eq!(
        high.speaker_id.as_ref().map(SpeakerId::as_str),
        Some("speaker_002")
    );
}

#[tokio::test]
async fn same_voice_keeps_its_speaker_across_chunks() {
    let h = harness().await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let response = h
            .pipeline
            .process_chunk(request("s1", voice(150.0, 1.0)))
            .await;
        ids.push(response.speaker_id.unwrap());
    }

    assert!(ids.iter().all(|id| id == &ids[0]));
    assert_eq!(h.registry.get_all_speakers().await.len(), 1);
}

#[tokio::test]
async fn dubbed_audio_carries_the_translation() {
    let h = harness_with_text("hello world").await;
    let response = h.pipeline.process_chunk(request("s1", voice(150.0, 1.0))).await;

    assert_eq!(response.original_text.as_deref(), Some("hello world"));
    assert_eq!(response.translated_text.as_deref(), Some("[de] hello world"));
    assert_eq!(
        response.dubbed_audio.as_deref(),
        Some("[de] hello world".as_bytes())
    );
    assert!(response.voice_id.is_some());
}

#[tokio::test]
async fn cloned_voice_is_used_when_preserving() {
    let h = harness().await;
    let first = h.pipeline.process_chunk(request("s1", voice(150.0, 1.0))).await;
    let speaker = first.speaker_id.unwrap();

    // A minute of 16-bit PCM at 16 kHz
    let cloned = h
        .pipeline
        .create_voice_clone(&speaker, vec![vec![0u8; 2 * 16_000 * 60]], None, None)
        .await
        .unwrap();

    let dubbed = h.pipeline.process_chunk(request("s1", voice(150.0, 1.0))).await;
    assert_eq!(dubbed.voice_id, Some(cloned));
}

#[tokio::test]
async fn actor_aware_processing_resolves_and_tracks() {
    let h = harness().await;

    // First sighting mints the speaker
    let first = h.pipeline.process_chunk(request("s1", voice(150.0, 1.0))).await;
    let speaker = first.speaker_id.unwrap();
    assert!(first.actor_id.is_none());

    let actor = h.directory.create_actor("Lead", vec![speaker]).await;

    let episode = ContentId::from("episode_01");
    let aware = h
        .pipeline
        .process_chunk(request("s1", voice(150.0, 1.0)).with_content(episode.clone()))
        .await;
    assert_eq!(aware.actor_id, Some(actor.clone()));

    let in_content = h.directory.actors_in_content(&episode).await;
    assert_eq!(in_content.len(), 1);
    assert_eq!(in_content[0].actor_id, actor);
}

#[tokio::test]
async fn sessions_are_isolated() {
    let h = harness().await;

    h.pipeline.process_chunk(request("s1", voice(120.0, 1.0))).await;
    h.pipeline.process_chunk(request("s2", voice(300.0, 1.0))).await;

    let s1 = h.registry.get_session_speakers(&SessionId::from("s1")).await;
    let s2 = h.registry.get_session_speakers(&SessionId::from("s2")).await;
    assert_eq!(s1.len(), 1);
    assert_eq!(s2.len(), 1);
    assert_ne!(s1[0], s2[0]);

    let info = h.pipeline.get_session_info(&SessionId::from("s1")).unwrap();
    assert_eq!(info.chunk_count, 1);
}

#[tokio::test]
async fn profiles_survive_a_registry_restart() {
    let h = harness().await;
    h.pipeline.process_chunk(request("s1", voice(150.0, 1.0))).await;
    h.pipeline.process_chunk(request("s1", voice(300.0, 1.0))).await;

    let reloaded = SpeakerRegistry::new(
        RegistryConfig::default(),
        Arc::clone(&h.speaker_store) as Arc<dyn SpeakerStore>,
    )
    .await;
    assert_eq!(reloaded.get_all_speakers().await.len(), 2);

    // The sequence continues after the known speakers
    let fresh = reloaded
        .identify(
            &domain::value_objects::VoiceFingerprint::zero(),
            &SessionId::from("s9"),
        )
        .await;
    assert_eq!(fresh.as_str(), "speaker_003");
}

#[tokio::test]
async fn silent_chunk_still_completes() {
    let h = harness_with_text("").await;
    let response = h
        .pipeline
        .process_chunk(request("s1", vec![0.0; 16_000]))
        .await;

    // Silence extracts the zero fingerprint, which mints a speaker, and
    // the empty recognition short-circuits before translation
    assert_eq!(response.status, ProcessingStatus::Completed);
    assert!(response.translated_text.is_none());
    assert!(response.dubbed_audio.is_none());
    assert!(response.speaker_id.is_some());
}
