//! The announcement queue.
//!
//! Producers hold an [`Announcer`] and push into an unbounded channel; they
//! never wait on speech. One consumer task runs
//! [`AnnouncementQueue::run`], moving items from the channel into its own
//! pending list and speaking the front of that list one at a time.
//!
//! Ordering rules:
//!
//! - a routine item goes to the back of the pending list;
//! - an urgent item goes to the front, ahead of every routine item;
//! - the item being spoken is never interrupted;
//! - nothing is dropped, only reordered. Of several urgent items waiting
//!   together, the most recent is spoken first.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use namevalue_types::VoiceProfile;

use crate::Announcement;
use crate::output::{AudioSink, FallbackVoice};
use crate::synth::{SpeechSynthesizer, SynthesisOutcome};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Whether the consumer is speaking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueState {
    /// Nothing pending, nothing in flight.
    #[default]
    Idle,
    /// An item is being synthesized or played.
    Speaking,
}

/// How the most recent item was spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechPath {
    /// Premium synthesis and playback.
    Premium,
    /// The local fallback voice.
    Fallback,
    /// Both paths failed; the item was skipped.
    Failed,
}

/// Snapshot of the queue, published after every transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    /// Current state.
    pub state: QueueState,
    /// Items waiting behind the one in flight.
    pub pending: usize,
    /// Path taken by the last finished item.
    pub last_path: Option<SpeechPath>,
}

// ---------------------------------------------------------------------------
// Producer handle
// ---------------------------------------------------------------------------

/// Cloneable producer handle for the announcement queue.
///
/// The queue keeps running for as long as at least one handle exists.
#[derive(Debug, Clone)]
pub struct Announcer {
    tx: mpsc::UnboundedSender<Announcement>,
    status: watch::Receiver<QueueStatus>,
}

impl Announcer {
    /// Queue `text` for speaking.
    ///
    /// Urgent items go ahead of every routine item still waiting. Returns
    /// immediately.
    pub fn announce(&self, text: impl Into<String>, voice: VoiceProfile, urgent: bool) {
        self.submit(Announcement {
            text: text.into(),
            voice,
            urgent,
        });
    }

    /// Queue a prepared announcement.
    pub fn submit(&self, announcement: Announcement) {
        if let Err(e) = self.tx.send(announcement) {
            warn!(text = %e.0.text, "announcement queue has stopped, dropping item");
        }
    }

    /// The latest published queue status.
    pub fn status(&self) -> QueueStatus {
        *self.status.borrow()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<QueueStatus> {
        self.status.clone()
    }

    /// A handle that delivers announcements to the returned receiver
    /// instead of a consumer loop. Its status stays idle.
    pub fn capture() -> (Self, mpsc::UnboundedReceiver<Announcement>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (_status_tx, status) = watch::channel(QueueStatus::default());
        (Self { tx, status }, rx)
    }
}

// ---------------------------------------------------------------------------
// Consumer
// ---------------------------------------------------------------------------

/// The single consumer of announcements.
pub struct AnnouncementQueue<S, P, F> {
    synthesizer: S,
    sink: P,
    fallback: F,
    synthesis_timeout: Duration,
    inbox: mpsc::UnboundedReceiver<Announcement>,
    pending: VecDeque<Announcement>,
    status: watch::Sender<QueueStatus>,
    last_path: Option<SpeechPath>,
}

impl<S, P, F> AnnouncementQueue<S, P, F>
where
    S: SpeechSynthesizer,
    P: AudioSink,
    F: FallbackVoice,
{
    /// Create a queue and its first producer handle.
    ///
    /// Nothing is spoken until [`run`](Self::run) is polled.
    pub fn new(
        synthesizer: S,
        sink: P,
        fallback: F,
        synthesis_timeout: Duration,
    ) -> (Announcer, Self) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let (status, status_rx) = watch::channel(QueueStatus::default());
        let queue = Self {
            synthesizer,
            sink,
            fallback,
            synthesis_timeout,
            inbox,
            pending: VecDeque::new(),
            status,
            last_path: None,
        };
        (
            Announcer {
                tx,
                status: status_rx,
            },
            queue,
        )
    }

    /// Speak announcements until every [`Announcer`] is dropped and the
    /// pending list is empty.
    pub async fn run(mut self) {
        info!(
            timeout_ms = self.synthesis_timeout.as_millis(),
            "announcement queue started"
        );

        loop {
            self.drain_inbox();
            let Some(item) = self.pending.pop_front() else {
                self.publish(QueueState::Idle);
                match self.inbox.recv().await {
                    Some(announcement) => {
                        self.enqueue(announcement);
                        continue;
                    }
                    None => break,
                }
            };

            self.publish(QueueState::Speaking);
            let path = self.speak(&item).await;
            self.last_path = Some(path);
        }

        self.publish(QueueState::Idle);
        info!("announcement queue stopped");
    }

    fn drain_inbox(&mut self) {
        while let Ok(announcement) = self.inbox.try_recv() {
            self.enqueue(announcement);
        }
    }

    fn enqueue(&mut self, announcement: Announcement) {
        debug!(
            urgent = announcement.urgent,
            pending = self.pending.len(),
            "announcement queued"
        );
        if announcement.urgent {
            self.pending.push_front(announcement);
        } else {
            self.pending.push_back(announcement);
        }
    }

    fn publish(&self, state: QueueState) {
        self.status.send_replace(QueueStatus {
            state,
            pending: self.pending.len(),
            last_path: self.last_path,
        });
    }

    /// Speak one item: premium first, then the fallback voice.
    async fn speak(&self, item: &Announcement) -> SpeechPath {
        let synthesis = timeout(
            self.synthesis_timeout,
            self.synthesizer.synthesize(&item.text, item.voice),
        )
        .await;

        match synthesis {
            Ok(SynthesisOutcome::Success(audio)) => match self.sink.play(&audio).await {
                Ok(()) => {
                    debug!(urgent = item.urgent, "announcement spoken via premium voice");
                    return SpeechPath::Premium;
                }
                Err(e) => {
                    warn!(error = %e, "playback failed, using fallback voice");
                }
            },
            Ok(SynthesisOutcome::Unavailable) => {
                debug!("premium synthesis unavailable, using fallback voice");
            }
            Ok(SynthesisOutcome::TransientFailure(reason)) => {
                warn!(reason = %reason, "premium synthesis failed, using fallback voice");
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.synthesis_timeout.as_millis(),
                    "premium synthesis deadline exceeded, using fallback voice"
                );
            }
        }

        match self.fallback.speak(&item.text).await {
            Ok(()) => SpeechPath::Fallback,
            Err(e) => {
                error!(
                    error = %e,
                    text = %item.text,
                    "fallback voice failed, skipping announcement"
                );
                SpeechPath::Failed
            }
        }
    }
}
