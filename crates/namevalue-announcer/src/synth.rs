//! Premium speech synthesis.
//!
//! A synthesis attempt never fails with an error. It resolves to a
//! [`SynthesisOutcome`] and the queue branches on it explicitly:
//!
//! - [`SynthesisOutcome::Success`]: raw PCM ready to play;
//! - [`SynthesisOutcome::Unavailable`]: no credential configured, which is
//!   an expected state rather than a failure;
//! - [`SynthesisOutcome::TransientFailure`]: the backend was tried and did
//!   not deliver. The next item tries again.

use std::future::Future;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use namevalue_types::VoiceProfile;

use crate::config::SynthesisConfig;

/// Sample rate of synthesized audio (mono, signed 16-bit little endian).
pub const SAMPLE_RATE_HZ: u32 = 24_000;

/// Opaque synthesized audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    /// Raw PCM bytes at [`SAMPLE_RATE_HZ`], mono, s16le.
    pub pcm: Vec<u8>,
}

/// Result of one synthesis attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// Audio is ready.
    Success(AudioPayload),
    /// No credential is configured.
    Unavailable,
    /// The backend was reached (or not) and produced nothing usable.
    TransientFailure(String),
}

/// Something that turns text into audio.
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice`.
    fn synthesize(
        &self,
        text: &str,
        voice: VoiceProfile,
    ) -> impl Future<Output = SynthesisOutcome> + Send;
}

// ---------------------------------------------------------------------------
// Backend enum
// ---------------------------------------------------------------------------

/// The configured synthesis backend.
///
/// Enum dispatch keeps the queue's type concrete in the server binary.
#[derive(Debug)]
pub enum SynthesisBackend {
    /// Gemini text-to-speech.
    Gemini(GeminiBackend),
    /// No credential configured; every attempt is `Unavailable`.
    Disabled,
}

impl SynthesisBackend {
    /// Build the backend from configuration.
    ///
    /// A missing or blank API key selects [`SynthesisBackend::Disabled`].
    pub fn from_config(config: &SynthesisConfig) -> Self {
        match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Self::Gemini(GeminiBackend::new(config, key)),
            _ => Self::Disabled,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gemini(_) => "gemini",
            Self::Disabled => "disabled",
        }
    }
}

impl SpeechSynthesizer for SynthesisBackend {
    async fn synthesize(&self, text: &str, voice: VoiceProfile) -> SynthesisOutcome {
        match self {
            Self::Gemini(backend) => backend.synthesize(text, voice).await,
            Self::Disabled => SynthesisOutcome::Unavailable,
        }
    }
}

// ---------------------------------------------------------------------------
// Gemini backend
// ---------------------------------------------------------------------------

/// Backend for the Gemini `generateContent` API with audio output.
///
/// Sends requests to `{api_url}/models/{model}:generateContent` with the
/// key in the `x-goog-api-key` header. Audio comes back base64-encoded in
/// `candidates[0].content.parts[0].inlineData.data`.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiBackend {
    /// Create a new Gemini backend.
    pub fn new(config: &SynthesisConfig, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            model: config.model.clone(),
        }
    }

    async fn synthesize(&self, text: &str, voice: VoiceProfile) -> SynthesisOutcome {
        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);
        let body = request_body(text, voice);

        let response = match self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return SynthesisOutcome::TransientFailure(format!("Gemini request failed: {e}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return SynthesisOutcome::TransientFailure(format!(
                "Gemini returned {status}: {error_body}"
            ));
        }

        let json: serde_json::Value = match response.json().await {
            Ok(json) => json,
            Err(e) => {
                return SynthesisOutcome::TransientFailure(format!(
                    "Gemini response parse failed: {e}"
                ));
            }
        };

        match extract_gemini_audio(&json) {
            Ok(payload) => {
                debug!(bytes = payload.pcm.len(), voice = ?voice, "synthesized");
                SynthesisOutcome::Success(payload)
            }
            Err(reason) => SynthesisOutcome::TransientFailure(reason),
        }
    }
}

/// Prebuilt voice name for a voice profile.
pub const fn voice_name(voice: VoiceProfile) -> &'static str {
    match voice {
        VoiceProfile::Female => "Kore",
        VoiceProfile::Male => "Fenrir",
    }
}

/// Build a single-turn audio generation request.
fn request_body(text: &str, voice: VoiceProfile) -> serde_json::Value {
    serde_json::json!({
        "contents": [{"parts": [{"text": text}]}],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": {"voiceName": voice_name(voice)}
                }
            }
        }
    })
}

/// Extract and decode the audio from a `generateContent` response.
fn extract_gemini_audio(json: &serde_json::Value) -> Result<AudioPayload, String> {
    let data = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("inlineData"))
        .and_then(|d| d.get("data"))
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            "Gemini response missing candidates[0].content.parts[0].inlineData.data".to_owned()
        })?;

    let pcm = STANDARD
        .decode(data)
        .map_err(|e| format!("Gemini audio is not valid base64: {e}"))?;
    if pcm.is_empty() {
        return Err("Gemini returned empty audio".to_owned());
    }
    Ok(AudioPayload { pcm })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(data: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {"mimeType": "audio/L16;rate=24000", "data": data}}]}
            }]
        })
    }

    #[test]
    fn voices_map_to_prebuilt_names() {
        assert_eq!(voice_name(VoiceProfile::Female), "Kore");
        assert_eq!(voice_name(VoiceProfile::Male), "Fenrir");
    }

    #[test]
    fn request_asks_for_audio_with_voice() {
        let body = request_body("Bonjour", VoiceProfile::Male);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Bonjour");
        assert_eq!(body["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Fenrir"
        );
    }

    #[test]
    fn extracts_decoded_pcm() {
        let json = response_with(&STANDARD.encode([1_u8, 2, 3, 4]));
        assert_eq!(
            extract_gemini_audio(&json),
            Ok(AudioPayload {
                pcm: vec![1, 2, 3, 4]
            })
        );
    }

    #[test]
    fn missing_audio_is_an_error() {
        let json = serde_json::json!({"candidates": [{"content": {"parts": [{"text": "no"}]}}]});
        assert!(extract_gemini_audio(&json).is_err());
        assert!(extract_gemini_audio(&serde_json::json!({})).is_err());
    }

    #[test]
    fn bad_base64_is_an_error() {
        assert!(extract_gemini_audio(&response_with("%%%not base64")).is_err());
        assert!(extract_gemini_audio(&response_with("")).is_err());
    }

    #[test]
    fn blank_key_disables_backend() {
        let mut config = SynthesisConfig::default();
        assert_eq!(SynthesisBackend::from_config(&config).name(), "disabled");

        config.api_key = Some("   ".into());
        assert_eq!(SynthesisBackend::from_config(&config).name(), "disabled");

        config.api_key = Some("k".into());
        assert_eq!(SynthesisBackend::from_config(&config).name(), "gemini");
    }

    #[tokio::test]
    async fn disabled_backend_is_unavailable() {
        let outcome = SynthesisBackend::Disabled
            .synthesize("Bonjour", VoiceProfile::Female)
            .await;
        assert_eq!(outcome, SynthesisOutcome::Unavailable);
    }

    #[tokio::test]
    async fn unreachable_backend_is_transient() {
        let config = SynthesisConfig {
            api_url: "http://127.0.0.1:9".into(),
            ..SynthesisConfig::default()
        };
        let backend = GeminiBackend::new(&config, "k");
        let outcome = backend.synthesize("Bonjour", VoiceProfile::Female).await;
        assert!(matches!(outcome, SynthesisOutcome::TransientFailure(_)));
    }
}
