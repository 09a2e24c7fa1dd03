//! Voice identity bank - clone library and synthesis voice resolution

use std::fmt;
use std::sync::Arc;

use domain::entities::{SpeakerProfile, SynthesisSettings, VoiceCharacteristics, VoiceClone};
use domain::value_objects::{SpeakerId, VoiceId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{SynthesisPort, SynthesizedAudio, VoiceLibraryDocument, VoiceLibraryStore};

/// Stock provider voice for low-pitched speakers without a clone
pub const PRESET_MALE: &str = "preset_male";
/// Stock provider voice for high-pitched speakers without a clone
pub const PRESET_FEMALE: &str = "preset_female";
/// Stock provider voice when nothing better is known
pub const PRESET_DEFAULT: &str = "preset_default";

/// Configuration for the voice identity bank
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VoiceBankConfig {
    /// Sample rate assumed when estimating clone-sample durations from
    /// raw 16-bit PCM byte counts
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

const fn default_sample_rate() -> u32 {
    16_000
}

impl Default for VoiceBankConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
        }
    }
}

/// Result of resolving a voice and synthesizing with it
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    /// The voice actually used
    pub voice_id: VoiceId,
    /// Synthesized audio bytes
    pub audio: Vec<u8>,
    /// Duration of the audio in milliseconds (if known)
    pub duration_ms: Option<u64>,
}

/// Quality measurements for a batch of raw audio
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AudioQualityReport {
    /// Signal-to-noise estimate in dB
    pub snr_db: f64,
    /// Fraction of samples at or near full scale
    pub clipping_ratio: f64,
    /// Fraction of near-silent samples
    pub silence_ratio: f64,
    /// Peak-to-floor dynamic range in dB
    pub dynamic_range_db: f64,
    /// Weighted overall score in [0, 1]
    pub overall: f64,
}

/// Library of cloned voices and the logic choosing a voice per utterance
pub struct VoiceIdentityBank {
    config: VoiceBankConfig,
    synthesis: Arc<dyn SynthesisPort>,
    store: Arc<dyn VoiceLibraryStore>,
    state: Mutex<VoiceLibraryDocument>,
}

impl fmt::Debug for VoiceIdentityBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceIdentityBank")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl VoiceIdentityBank {
    /// Create a bank, hydrating the clone library from the store
    ///
    /// A store that fails to load is treated as empty.
    pub async fn new(
        config: VoiceBankConfig,
        synthesis: Arc<dyn SynthesisPort>,
        store: Arc<dyn VoiceLibraryStore>,
    ) -> Self {
        let document = match store.load().await {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "voice library load failed; starting with empty library");
                VoiceLibraryDocument::default()
            },
        };
        info!(clones = document.clones.len(), "voice library ready");

        Self {
            config,
            synthesis,
            store,
            state: Mutex::new(document),
        }
    }

    /// Create a provider-side clone of a speaker's voice
    ///
    /// Sample durations are estimated from byte counts assuming 16-bit PCM
    /// at the configured sample rate; the total drives the quality
    /// estimate. The new clone becomes the speaker's default voice; older
    /// clones stay in the library.
    #[instrument(skip(self, samples), fields(speaker = %speaker_id))]
    pub async fn clone_speaker_voice(
        &self,
        speaker_id: &SpeakerId,
        display_name: &str,
        samples: Vec<Vec<u8>>,
    ) -> Result<VoiceId, ApplicationError> {
        if samples.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "voice cloning needs at least one audio sample".to_string(),
            ));
        }

        let sample_count = samples.len();
        let total_bytes: usize = samples.iter().map(Vec::len).sum();
        let total_secs = total_bytes as f64 / 2.0 / f64::from(self.config.sample_rate);

        let voice_id = self
            .synthesis
            .clone_voice(
                display_name.to_string(),
                Some(format!("Cloned from {speaker_id}")),
                samples,
            )
            .await?;

        let clone = VoiceClone::new(
            voice_id.clone(),
            speaker_id.clone(),
            display_name,
            total_secs,
            sample_count,
        );
        info!(
            voice = %voice_id,
            quality = clone.quality.estimated_quality,
            secs = total_secs,
            "voice clone created"
        );

        let mut document = self.state.lock().await;
        document.clones.insert(voice_id.clone(), clone);
        document
            .speaker_voices
            .insert(speaker_id.clone(), voice_id.clone());
        self.persist(&document).await;

        Ok(voice_id)
    }

    /// Synthesize text, resolving the voice from what is known
    ///
    /// Resolution priority: explicit hint, then the profile's associated
    /// clone, then the speaker's default clone in the library, then a
    /// stock preset picked from the profile's gender likelihood.
    #[instrument(skip_all)]
    pub async fn synthesize(
        &self,
        text: &str,
        voice_hint: Option<&VoiceId>,
        profile: Option<&SpeakerProfile>,
    ) -> Result<SynthesisOutcome, ApplicationError> {
        let (voice_id, mut settings) = {
            let document = self.state.lock().await;
            resolve_voice(&document, voice_hint, profile)
        };
        if let Some(profile) = profile {
            optimize_settings(&mut settings, &profile.characteristics);
        }
        debug!(voice = %voice_id, "voice resolved");

        let SynthesizedAudio { audio, duration_ms } = self
            .synthesis
            .synthesize(text.to_string(), voice_id.clone(), settings)
            .await?;

        let mut document = self.state.lock().await;
        if let Some(clone) = document.clones.get_mut(&voice_id) {
            clone.touch();
            self.persist(&document).await;
        }

        Ok(SynthesisOutcome {
            voice_id,
            audio,
            duration_ms,
        })
    }

    /// The highest-quality voice among the given clones
    ///
    /// Voices absent from the library are ignored; `None` when nothing
    /// usable remains.
    pub async fn best_voice_for_clones(&self, voice_ids: &[VoiceId]) -> Option<VoiceId> {
        let document = self.state.lock().await;
        voice_ids
            .iter()
            .filter_map(|id| document.clones.get(id))
            .max_by(|a, b| {
                a.quality
                    .estimated_quality
                    .total_cmp(&b.quality.estimated_quality)
            })
            .map(|clone| clone.voice_id.clone())
    }

    /// Replace the tuning parameters of a clone
    ///
    /// Returns false if the voice is unknown.
    pub async fn update_settings(&self, voice_id: &VoiceId, settings: SynthesisSettings) -> bool {
        let mut document = self.state.lock().await;
        let Some(clone) = document.clones.get_mut(voice_id) else {
            return false;
        };
        clone.settings = settings;
        self.persist(&document).await;
        true
    }

    /// Every clone trained from the given speaker, newest first
    pub async fn voices_for_speaker(&self, speaker_id: &SpeakerId) -> Vec<VoiceClone> {
        let document = self.state.lock().await;
        let mut clones: Vec<VoiceClone> = document
            .clones
            .values()
            .filter(|c| &c.speaker_id == speaker_id)
            .cloned()
            .collect();
        clones.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        clones
    }

    /// Snapshot of one clone record
    pub async fn get_clone(&self, voice_id: &VoiceId) -> Option<VoiceClone> {
        self.state.lock().await.clones.get(voice_id).cloned()
    }

    /// The speaker's current default voice, if any
    pub async fn default_voice_for_speaker(&self, speaker_id: &SpeakerId) -> Option<VoiceId> {
        self.state
            .lock()
            .await
            .speaker_voices
            .get(speaker_id)
            .cloned()
    }

    async fn persist(&self, document: &VoiceLibraryDocument) {
        if let Err(e) = self.store.save(document.clone()).await {
            warn!(error = %e, "voice library save failed; continuing in memory");
        }
    }
}

/// Pick a voice and its base settings from the library
fn resolve_voice(
    document: &VoiceLibraryDocument,
    voice_hint: Option<&VoiceId>,
    profile: Option<&SpeakerProfile>,
) -> (VoiceId, SynthesisSettings) {
    let settings_of = |id: &VoiceId| {
        document
            .clones
            .get(id)
            .map_or_else(SynthesisSettings::default, |c| c.settings)
    };

    if let Some(hint) = voice_hint {
        return (hint.clone(), settings_of(hint));
    }
    if let Some(profile) = profile {
        if let Some(voice_id) = &profile.voice_clone_id {
            return (voice_id.clone(), settings_of(voice_id));
        }
        if let Some(voice_id) = document.speaker_voices.get(&profile.speaker_id) {
            return (voice_id.clone(), settings_of(voice_id));
        }
        let preset = match profile.characteristics.gender_likelihood {
            Some(g) if g < 0.3 => PRESET_MALE,
            Some(g) if g > 0.7 => PRESET_FEMALE,
            _ => PRESET_DEFAULT,
        };
        return (VoiceId::from(preset), SynthesisSettings::default());
    }
    (VoiceId::from(PRESET_DEFAULT), SynthesisSettings::default())
}

/// Nudge synthesis settings toward the speaker's measured delivery
fn optimize_settings(settings: &mut SynthesisSettings, characteristics: &VoiceCharacteristics) {
    if let Some(pitch_std) = characteristics.pitch_std {
        if pitch_std > 20.0 {
            settings.stability = (settings.stability - 0.2).max(0.3);
        } else if pitch_std < 10.0 {
            settings.stability = (settings.stability + 0.1).min(0.8);
        }
    }
    if let Some(rate) = characteristics.speaking_rate {
        settings.style = ((0.3 + rate / 10.0) as f32).clamp(0.3, 0.8);
    }
    if let Some(clarity) = characteristics.clarity {
        settings.similarity_boost = ((0.5 + clarity * 0.5) as f32).min(1.0);
    }
    if let Some(energy) = characteristics.energy {
        settings.speaker_boost = energy > 0.3;
    }
}

/// Measure the quality of raw audio offered for cloning
///
/// Cheap signal statistics only: this guards against feeding the cloning
/// provider clipped or mostly-silent audio, it is not a perceptual model.
#[must_use]
pub fn analyze_sample_quality(samples: &[f32]) -> AudioQualityReport {
    if samples.is_empty() {
        return AudioQualityReport {
            snr_db: 0.0,
            clipping_ratio: 0.0,
            silence_ratio: 1.0,
            dynamic_range_db: 0.0,
            overall: 0.0,
        };
    }

    let n = samples.len() as f64;
    let clipping_ratio = samples.iter().filter(|s| s.abs() >= 0.99).count() as f64 / n;
    let silence_ratio = samples.iter().filter(|s| s.abs() < 0.01).count() as f64 / n;

    let mut magnitudes: Vec<f64> = samples.iter().map(|&s| f64::from(s.abs())).collect();
    magnitudes.sort_by(f64::total_cmp);
    let decile = (magnitudes.len() / 10).max(1);
    let floor = magnitudes[..decile].iter().sum::<f64>() / decile as f64;
    let signal = magnitudes[magnitudes.len() - decile..].iter().sum::<f64>() / decile as f64;

    let snr_db = 20.0 * ((signal + 1e-10) / (floor + 1e-10)).log10();
    let peak = magnitudes[magnitudes.len() - 1];
    let dynamic_range_db = 20.0 * ((peak + 1e-10) / (floor + 1e-10)).log10();

    let snr_score = (snr_db / 40.0).clamp(0.0, 1.0);
    let range_score = (dynamic_range_db / 60.0).clamp(0.0, 1.0);
    let overall = (snr_score * 0.4
        + (1.0 - clipping_ratio) * 0.2
        + (1.0 - silence_ratio) * 0.2
        + range_score * 0.2)
        .clamp(0.0, 1.0);

    AudioQualityReport {
        snr_db,
        clipping_ratio,
        silence_ratio,
        dynamic_range_db,
        overall,
    }
}

#[cfg(test)]
mod tests {
    use domain::value_objects::VoiceFingerprint;

    use super::*;
    use crate::ports::{MockSynthesisPort, MockVoiceLibraryStore};

    fn quiet_store() -> Arc<dyn VoiceLibraryStore> {
        let mut store = MockVoiceLibraryStore::new();
        store
            .expect_load()
            .returning(|| Ok(VoiceLibraryDocument::default()));
        store.expect_save().returning(|_| Ok(()));
        Arc::new(store)
    }

    fn cloning_synthesis() -> Arc<dyn SynthesisPort> {
        let mut port = MockSynthesisPort::new();
        let mut counter = 0u32;
        port.expect_clone_voice().returning(move |_, _, _| {
            counter += 1;
            Ok(VoiceId::new(format!("v_{counter}")))
        });
        port.expect_synthesize().returning(|_, _, _| {
            Ok(SynthesizedAudio {
                audio: vec![0u8; 32],
                duration_ms: Some(900),
            })
        });
        Arc::new(port)
    }

    async fn bank() -> VoiceIdentityBank {
        VoiceIdentityBank::new(VoiceBankConfig::default(), cloning_synthesis(), quiet_store())
            .await
    }

    /// Bytes of 16-bit PCM silence amounting to `secs` at 16 kHz
    fn pcm_secs(secs: f64) -> Vec<u8> {
        vec![0u8; (secs * 16_000.0 * 2.0) as usize]
    }

    fn profile_with(characteristics: VoiceCharacteristics) -> SpeakerProfile {
        SpeakerProfile::new(
            SpeakerId::from_index(1),
            VoiceFingerprint::zero(),
            characteristics,
        )
    }

    #[tokio::test]
    async fn clone_quality_follows_the_staircase() {
        let bank = bank().await;
        let speaker = SpeakerId::from_index(1);

        let cases = [(20.0, 0.3), (45.0, 0.5)];
        for (secs, expected) in cases {
            let voice = bank
                .clone_speaker_voice(&speaker, "Alice", vec![pcm_secs(secs)])
                .await
                .unwrap();
            let clone = bank.get_clone(&voice).await.unwrap();
            assert!(
                (clone.quality.estimated_quality - expected).abs() < 1e-6,
                "{secs}s -> {}",
                clone.quality.estimated_quality
            );
        }

        let voice = bank
            .clone_speaker_voice(&speaker, "Alice", vec![pcm_secs(180.0)])
            .await
            .unwrap();
        let quality = bank.get_clone(&voice).await.unwrap().quality.estimated_quality;
        assert!(quality > 0.7 && quality < 0.9);
    }

    #[tokio::test]
    async fn latest_clone_becomes_default_but_old_ones_stay() {
        let bank = bank().await;
        let speaker = SpeakerId::from_index(1);

        let first = bank
            .clone_speaker_voice(&speaker, "take 1", vec![pcm_secs(40.0)])
            .await
            .unwrap();
        let second = bank
            .clone_speaker_voice(&speaker, "take 2", vec![pcm_secs(40.0)])
            .await
            .unwrap();

        assert_eq!(
            bank.default_voice_for_speaker(&speaker).await,
            Some(second)
        );
        assert!(bank.get_clone(&first).await.is_some());
        assert_eq!(bank.voices_for_speaker(&speaker).await.len(), 2);
    }

    #[tokio::test]
    async fn cloning_rejects_empty_sample_set() {
        let bank = bank().await;
        let result = bank
            .clone_speaker_voice(&SpeakerId::from_index(1), "Alice", vec![])
            .await;
        assert!(matches!(result, Err(ApplicationError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn best_voice_prefers_higher_quality() {
        let bank = bank().await;
        let speaker = SpeakerId::from_index(1);
        let short = bank
            .clone_speaker_voice(&speaker, "short", vec![pcm_secs(10.0)])
            .await
            .unwrap();
        let long = bank
            .clone_speaker_voice(&speaker, "long", vec![pcm_secs(200.0)])
            .await
            .unwrap();

        let best = bank
            .best_voice_for_clones(&[short.clone(), long.clone()])
            .await;
        assert_eq!(best, Some(long.clone()));
        assert_eq!(bank.best_voice_for_clones(&[short.clone()]).await, Some(short));
        assert_eq!(bank.best_voice_for_clones(&[]).await, None);
        assert_eq!(
            bank.best_voice_for_clones(&[VoiceId::new("unknown")]).await,
            None
        );
    }

    #[tokio::test]
    async fn hint_outranks_profile_voice() {
        let bank = bank().await;
        let mut profile = profile_with(VoiceCharacteristics::default());
        profile.set_voice_clone(VoiceId::new("profile_voice"));

        let hint = VoiceId::new("hinted");
        let outcome = bank
            .synthesize("Hallo", Some(&hint), Some(&profile))
            .await
            .unwrap();
        assert_eq!(outcome.voice_id, hint);
    }

    #[tokio::test]
    async fn profile_clone_outranks_presets() {
        let bank = bank().await;
        let mut profile = profile_with(VoiceCharacteristics::default());
        profile.set_voice_clone(VoiceId::new("profile_voice"));

        let outcome = bank.synthesize("Hallo", None, Some(&profile)).await.unwrap();
        assert_eq!(outcome.voice_id, VoiceId::new("profile_voice"));
    }

    #[tokio::test]
    async fn gender_presets_kick_in_last() {
        let bank = bank().await;

        let male = profile_with(VoiceCharacteristics {
            gender_likelihood: Some(0.1),
            ..Default::default()
        });
        let female = profile_with(VoiceCharacteristics {
            gender_likelihood: Some(0.9),
            ..Default::default()
        });
        let unknown = profile_with(VoiceCharacteristics::default());

        for (profile, expected) in [
            (male, PRESET_MALE),
            (female, PRESET_FEMALE),
            (unknown, PRESET_DEFAULT),
        ] {
            let outcome = bank.synthesize("Hi", None, Some(&profile)).await.unwrap();
            assert_eq!(outcome.voice_id.as_str(), expected);
        }

        let bare = bank.synthesize("Hi", None, None).await.unwrap();
        assert_eq!(bare.voice_id.as_str(), PRESET_DEFAULT);
    }

    #[test]
    fn settings_optimization_follows_characteristics() {
        let mut settings = SynthesisSettings::default();
        optimize_settings(
            &mut settings,
            &VoiceCharacteristics {
                pitch_std: Some(30.0),
                speaking_rate: Some(4.0),
                clarity: Some(0.8),
                energy: Some(0.1),
                ..Default::default()
            },
        );
        assert!((settings.stability - 0.3).abs() < 1e-6);
        assert!((settings.style - 0.7).abs() < 1e-6);
        assert!((settings.similarity_boost - 0.9).abs() < 1e-6);
        assert!(!settings.speaker_boost);

        let mut steady = SynthesisSettings::default();
        optimize_settings(
            &mut steady,
            &VoiceCharacteristics {
                pitch_std: Some(5.0),
                energy: Some(0.5),
                ..Default::default()
            },
        );
        assert!((steady.stability - 0.6).abs() < 1e-6);
        assert!(steady.speaker_boost);
    }

    #[tokio::test]
    async fn update_settings_requires_known_voice() {
        let bank = bank().await;
        let speaker = SpeakerId::from_index(1);
        let voice = bank
            .clone_speaker_voice(&speaker, "Alice", vec![pcm_secs(40.0)])
            .await
            .unwrap();

        let settings = SynthesisSettings {
            stability: 0.35,
            ..SynthesisSettings::default()
        };
        assert!(bank.update_settings(&voice, settings).await);
        assert!(
            (bank.get_clone(&voice).await.unwrap().settings.stability - 0.35).abs() < 1e-6
        );
        assert!(!bank.update_settings(&VoiceId::new("nope"), settings).await);
    }

    #[tokio::test]
    async fn synthesis_touches_the_clone() {
        let bank = bank().await;
        let speaker = SpeakerId::from_index(1);
        let voice = bank
            .clone_speaker_voice(&speaker, "Alice", vec![pcm_secs(40.0)])
            .await
            .unwrap();
        assert!(bank.get_clone(&voice).await.unwrap().last_used_at.is_none());

        bank.synthesize("Hallo", Some(&voice), None).await.unwrap();
        assert!(bank.get_clone(&voice).await.unwrap().last_used_at.is_some());
    }

    #[test]
    fn quality_report_flags_bad_audio() {
        let clipped: Vec<f32> = (0..1000).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let report = analyze_sample_quality(&clipped);
        assert!(report.clipping_ratio > 0.9);

        let silent = vec![0.0f32; 1000];
        let report = analyze_sample_quality(&silent);
        assert!(report.silence_ratio > 0.9);
        assert!(report.overall < 0.5);

        let empty = analyze_sample_quality(&[]);
        assert!(empty.overall.abs() < f64::EPSILON);
    }

    #[test]
    fn quality_report_rewards_clean_speech_shape() {
        // Tone bursts with quiet gaps: clear signal over a low floor
        let speechy: Vec<f32> = (0..16000)
            .map(|i| {
                let t = i as f32 / 16000.0;
                let envelope = if (t * 4.0) as usize % 2 == 0 { 0.6 } else { 0.005 };
                envelope * (std::f32::consts::TAU * 180.0 * t).sin()
            })
            .collect();
        let report = analyze_sample_quality(&speechy);
        assert!(report.snr_db > 20.0);
        assert!(report.overall > 0.5);
    }
}
