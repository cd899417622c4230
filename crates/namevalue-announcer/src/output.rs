//! Audio playback and the local fallback voice.
//!
//! Both run external programs through `tokio::process` and complete when
//! the program exits. Neither has a timeout: an utterance plays to its
//! natural end.

use std::future::Future;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::trace;

use crate::config::{FallbackConfig, PlayerConfig};
use crate::error::AnnouncerError;
use crate::synth::AudioPayload;

/// Plays synthesized audio to completion.
pub trait AudioSink: Send + Sync {
    /// Play `audio`, returning once playback has finished.
    fn play(&self, audio: &AudioPayload) -> impl Future<Output = Result<(), AnnouncerError>> + Send;
}

/// Speaks text without premium synthesis.
pub trait FallbackVoice: Send + Sync {
    /// Speak `text`, returning once speech has finished.
    fn speak(&self, text: &str) -> impl Future<Output = Result<(), AnnouncerError>> + Send;
}

// ---------------------------------------------------------------------------
// Command-driven player
// ---------------------------------------------------------------------------

/// Pipes raw PCM into an external player's stdin.
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
}

impl CommandSink {
    /// Create a sink from player configuration.
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl AudioSink for CommandSink {
    async fn play(&self, audio: &AudioPayload) -> Result<(), AnnouncerError> {
        if self.program.is_empty() {
            return Err(AnnouncerError::NotConfigured);
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AnnouncerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&audio.pcm)
                .await
                .map_err(|source| self.io_error(source))?;
            stdin.shutdown().await.map_err(|source| self.io_error(source))?;
        }

        let status = child.wait().await.map_err(|source| self.io_error(source))?;
        trace!(program = %self.program, %status, bytes = audio.pcm.len(), "playback finished");
        if status.success() {
            Ok(())
        } else {
            Err(AnnouncerError::CommandFailed {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

impl CommandSink {
    fn io_error(&self, source: std::io::Error) -> AnnouncerError {
        AnnouncerError::Io {
            program: self.program.clone(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Command-driven fallback voice
// ---------------------------------------------------------------------------

/// Runs a local text-to-speech program, feeding it the sentence on stdin.
#[derive(Debug, Clone)]
pub struct CommandVoice {
    program: String,
    args: Vec<String>,
    language: String,
}

impl CommandVoice {
    /// Create a voice from fallback configuration.
    pub fn new(config: &FallbackConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            language: config.language.clone(),
        }
    }

    /// Arguments with `{lang}` substituted.
    pub fn render_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{lang}", &self.language))
            .collect()
    }

    fn io_error(&self, source: std::io::Error) -> AnnouncerError {
        AnnouncerError::Io {
            program: self.program.clone(),
            source,
        }
    }
}

impl FallbackVoice for CommandVoice {
    async fn speak(&self, text: &str) -> Result<(), AnnouncerError> {
        if self.program.is_empty() {
            return Err(AnnouncerError::NotConfigured);
        }

        let mut child = Command::new(&self.program)
            .args(self.render_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AnnouncerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // One line per utterance; line-oriented readers need the newline.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(format!("{text}\n").as_bytes())
                .await
                .map_err(|source| self.io_error(source))?;
            stdin.shutdown().await.map_err(|source| self.io_error(source))?;
        }

        let status = child.wait().await.map_err(|source| self.io_error(source))?;
        trace!(program = %self.program, %status, "fallback speech finished");
        if status.success() {
            Ok(())
        } else {
            Err(AnnouncerError::CommandFailed {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(program: &str, args: &[&str]) -> CommandVoice {
        CommandVoice::new(&FallbackConfig {
            program: program.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
            language: "fr-FR".to_owned(),
        })
    }

    fn sink(program: &str) -> CommandSink {
        CommandSink::new(&PlayerConfig {
            program: program.to_owned(),
            args: Vec::new(),
        })
    }

    #[test]
    fn fallback_args_substitute_language() {
        let voice = CommandVoice::new(&FallbackConfig::default());
        assert_eq!(voice.render_args(), ["-v", "fr-FR", "--stdin"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dash_prefixed_name_reaches_voice_as_text() {
        let text = "-w/tmp/x vient de booster son nom de 5 points !";
        let script = format!("read -r line && [ \"$line\" = '{text}' ]");
        assert!(voice("sh", &["-c", &script]).speak(text).await.is_ok());
        assert!(
            CommandVoice::new(&FallbackConfig::default())
                .render_args()
                .iter()
                .all(|arg| !arg.contains(text))
        );
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let result = voice("namevalue-no-such-program", &[]).speak("x").await;
        assert!(matches!(result, Err(AnnouncerError::Spawn { .. })));

        let result = sink("namevalue-no-such-program")
            .play(&AudioPayload { pcm: vec![0; 4] })
            .await;
        assert!(matches!(result, Err(AnnouncerError::Spawn { .. })));
    }

    #[tokio::test]
    async fn empty_program_is_not_configured() {
        let result = voice("", &[]).speak("x").await;
        assert!(matches!(result, Err(AnnouncerError::NotConfigured)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_status_decides_success() {
        assert!(voice("cat", &[]).speak("Bonjour").await.is_ok());
        let result = voice("false", &[]).speak("Bonjour").await;
        assert!(matches!(result, Err(AnnouncerError::CommandFailed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn sink_pipes_audio_to_player() {
        let result = sink("cat").play(&AudioPayload { pcm: vec![7; 4_096] }).await;
        assert!(result.is_ok());
    }
}
