//! Announcement queue for the Name Value broadcast.
//!
//! Announcements are short French sentences spoken over the stream: a
//! welcome when a viewer joins, a shout-out when someone gifts. A single
//! consumer task speaks them one at a time. Urgent announcements jump ahead
//! of routine ones but never cut off the sentence being spoken.
//!
//! # Architecture
//!
//! - [`queue`] -- The [`Announcer`] producer handle and the
//!   [`AnnouncementQueue`] consumer loop.
//! - [`synth`] -- Premium speech synthesis. Every attempt resolves to a
//!   [`SynthesisOutcome`]; failures are values, not errors.
//! - [`output`] -- Audio playback and the local fallback voice, both driven
//!   through external commands.
//! - [`config`] -- Configuration for all of the above.
//!
//! # Degradation
//!
//! Each item is decided on its own. If premium synthesis is unavailable,
//! fails, or exceeds its deadline, that one item is spoken by the fallback
//! voice and the next item tries premium again. A fallback failure is
//! logged and the queue moves on; producers never see an error.

pub mod config;
pub mod error;
pub mod output;
pub mod queue;
pub mod synth;

pub use config::{AnnouncerConfig, FallbackConfig, PlayerConfig, SynthesisConfig};
pub use error::AnnouncerError;
pub use output::{AudioSink, CommandSink, CommandVoice, FallbackVoice};
pub use queue::{AnnouncementQueue, Announcer, QueueState, QueueStatus, SpeechPath};
pub use synth::{AudioPayload, GeminiBackend, SpeechSynthesizer, SynthesisBackend, SynthesisOutcome};

use namevalue_types::VoiceProfile;

/// One sentence waiting to be spoken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// The sentence.
    pub text: String,
    /// Which premium voice speaks it.
    pub voice: VoiceProfile,
    /// Urgent items are spoken before every routine item already queued.
    pub urgent: bool,
}

impl Announcement {
    /// A routine announcement.
    pub fn routine(text: impl Into<String>, voice: VoiceProfile) -> Self {
        Self {
            text: text.into(),
            voice,
            urgent: false,
        }
    }

    /// An urgent announcement.
    pub fn urgent(text: impl Into<String>, voice: VoiceProfile) -> Self {
        Self {
            text: text.into(),
            voice,
            urgent: true,
        }
    }
}
