//! Announcer configuration.
//!
//! Mirrors the `announcer` section of `namevalue-config.yaml`:
//!
//! ```yaml
//! announcer:
//!   synthesis:
//!     api_url: https://generativelanguage.googleapis.com/v1beta
//!     model: gemini-2.5-flash-preview-tts
//!     timeout_ms: 8000
//!   player:
//!     program: aplay
//!     args: ["-q", "-t", "raw", "-f", "S16_LE", "-r", "24000", "-c", "1", "-"]
//!   fallback:
//!     program: espeak-ng
//!     args: ["-v", "{lang}", "--stdin"]
//!     language: fr-FR
//! ```
//!
//! The API key is normally left out of the file and supplied through the
//! environment.

use std::time::Duration;

use serde::Deserialize;

/// Environment variables checked for the synthesis API key, in order.
pub const API_KEY_VARS: [&str; 3] = ["TTS_API_KEY", "GEMINI_API_KEY", "API_KEY"];

/// Top-level announcer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    /// Premium synthesis settings.
    pub synthesis: SynthesisConfig,
    /// Audio player settings.
    pub player: PlayerConfig,
    /// Fallback voice settings.
    pub fallback: FallbackConfig,
}

impl AnnouncerConfig {
    /// Apply environment variable overrides. See
    /// [`SynthesisConfig::apply_env_overrides`].
    pub fn apply_env_overrides(&mut self) {
        self.synthesis.apply_env_overrides();
    }
}

/// Premium speech synthesis settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// API key. Without one, synthesis is reported unavailable and every
    /// item uses the fallback voice.
    pub api_key: Option<String>,
    /// Base URL of the generative language API.
    pub api_url: String,
    /// Text-to-speech model name.
    pub model: String,
    /// Upper bound on a single synthesis request, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: String::from("https://generativelanguage.googleapis.com/v1beta"),
            model: String::from("gemini-2.5-flash-preview-tts"),
            timeout_ms: 8_000,
        }
    }
}

impl SynthesisConfig {
    /// The synthesis deadline.
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Take the API key from the first non-empty variable in
    /// [`API_KEY_VARS`], if any is set.
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = API_KEY_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
        {
            self.api_key = Some(key);
        }
    }
}

/// External player that receives raw PCM on stdin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Program to run.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            program: String::from("aplay"),
            args: ["-q", "-t", "raw", "-f", "S16_LE", "-r", "24000", "-c", "1", "-"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Local text-to-speech command used when premium synthesis fails.
///
/// The sentence is written to the program's stdin, never onto its command
/// line, since it starts with a viewer-chosen name. `{lang}` in any argument
/// is replaced by [`FallbackConfig::language`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Program to run.
    pub program: String,
    /// Argument templates.
    pub args: Vec<String>,
    /// Language tag passed as `{lang}`.
    pub language: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            program: String::from("espeak-ng"),
            args: vec![
                String::from("-v"),
                String::from("{lang}"),
                String::from("--stdin"),
            ],
            language: String::from("fr-FR"),
        }
    }
}
