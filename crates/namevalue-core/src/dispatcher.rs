//! Routes live events to the ledger and the announcement queue.
//!
//! The [`EventDispatcher`] is the single writer in front of the ledger:
//! every mutating call holds the write gate for its whole
//! read-modify-write, so two events never interleave. After each state
//! change the new [`LeaderboardView`] is broadcast to subscribers (the
//! overlay WebSocket).

use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use namevalue_announcer::Announcer;
use namevalue_ledger::{
    ExportDocument, LeaderboardView, LedgerConfig, LedgerError, PointLedger, country_totals,
};
use namevalue_types::{CountryAggregate, LiveEvent, Participant, SessionRecord, VoiceProfile};

use crate::config::DispatcherConfig;
use crate::country::{self, ResolvedCountry};

/// Capacity of the leaderboard broadcast channel.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// What handling one event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DispatchOutcome {
    /// Coins were credited and a shout-out queued.
    GiftCredited {
        /// Participant credited.
        participant_id: String,
        /// Display name used in the announcement.
        display_name: String,
        /// Coins credited.
        coins: u64,
        /// Live points after the gift.
        points_live: u64,
    },
    /// A country was attributed to an existing participant.
    CountryAssigned {
        /// Participant updated.
        participant_id: String,
        /// Stored country code.
        country_code: String,
    },
    /// A join was seen. Joins never touch the ledger.
    Joined {
        /// Viewer identity.
        identity: String,
        /// Whether a welcome was queued.
        announced: bool,
    },
    /// The event changed nothing.
    Ignored {
        /// Why.
        reason: IgnoreReason,
    },
}

/// Why an event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// A gift worth zero coins.
    ZeroCoins,
    /// A comment from someone who has never gifted.
    UnknownParticipant,
    /// A comment that names no known country, with unknown countries
    /// disabled.
    UnrecognizedCountry,
    /// A blank comment.
    EmptyComment,
}

/// Routes events and serializes ledger writes.
pub struct EventDispatcher {
    ledger: PointLedger,
    announcer: Announcer,
    config: DispatcherConfig,
    leaderboard_size: usize,
    country_board_size: usize,
    write_gate: Mutex<()>,
    updates: broadcast::Sender<LeaderboardView>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("ledger", &self.ledger)
            .field("config", &self.config)
            .field("subscribers", &self.updates.receiver_count())
            .finish_non_exhaustive()
    }
}

impl EventDispatcher {
    /// Create a dispatcher over `ledger`, announcing through `announcer`.
    pub fn new(
        ledger: PointLedger,
        announcer: Announcer,
        config: DispatcherConfig,
        ledger_config: &LedgerConfig,
    ) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            ledger,
            announcer,
            config,
            leaderboard_size: ledger_config.leaderboard_size,
            country_board_size: ledger_config.country_board_size,
            write_gate: Mutex::new(()),
            updates,
        }
    }

    /// The announcement handle.
    pub const fn announcer(&self) -> &Announcer {
        &self.announcer
    }

    /// Name of the storage backend behind the ledger.
    pub const fn storage_backend(&self) -> &'static str {
        self.ledger.store().backend_name()
    }

    /// Subscribe to leaderboard updates.
    pub fn subscribe(&self) -> broadcast::Receiver<LeaderboardView> {
        self.updates.subscribe()
    }

    /// Handle one live event.
    pub async fn handle(&self, event: LiveEvent) -> DispatchOutcome {
        debug!(kind = event.kind(), identity = event.identity(), "dispatching event");
        match event {
            LiveEvent::Gift {
                identity,
                display_name,
                coin_amount,
                gift_name,
            } => {
                self.handle_gift(&identity, &display_name, coin_amount, gift_name.as_deref())
                    .await
            }
            LiveEvent::Comment {
                identity,
                display_name,
                text,
            } => {
                self.handle_comment(&identity, display_name.as_deref(), &text)
                    .await
            }
            LiveEvent::Join {
                identity,
                display_name,
            } => self.handle_join(&identity, display_name.as_deref()),
        }
    }

    async fn handle_gift(
        &self,
        identity: &str,
        display_name: &str,
        coins: u64,
        gift_name: Option<&str>,
    ) -> DispatchOutcome {
        if coins == 0 {
            return DispatchOutcome::Ignored {
                reason: IgnoreReason::ZeroCoins,
            };
        }
        let display_name = if display_name.trim().is_empty() {
            identity
        } else {
            display_name
        };

        let _gate = self.write_gate.lock().await;
        let participants = self.ledger.apply_gift(identity, display_name, coins).await;
        self.remember(|session| session.last_user = display_name.to_owned())
            .await;
        self.publish(&participants);

        self.announcer.announce(
            format!("{display_name} vient de booster son nom de {coins} points !"),
            VoiceProfile::Female,
            true,
        );

        // A generated identity is only findable through the display name.
        let credited = self
            .ledger
            .locate(&participants, identity, Some(display_name))
            .or_else(|| participants.iter().rev().find(|p| p.display_name == display_name));
        let (participant_id, points_live) =
            credited.map_or_else(|| (identity.to_owned(), coins), |p| (p.id.clone(), p.points_live));

        info!(
            participant = %participant_id,
            gift = gift_name.unwrap_or("unknown"),
            coins,
            points_live,
            "gift received"
        );
        DispatchOutcome::GiftCredited {
            participant_id,
            display_name: display_name.to_owned(),
            coins,
            points_live,
        }
    }

    /// Attribute the country named in a comment.
    ///
    /// The typed text becomes the session's last country even when the
    /// commenter has never gifted, so the simulator keeps what was entered.
    async fn handle_comment(
        &self,
        identity: &str,
        display_name: Option<&str>,
        text: &str,
    ) -> DispatchOutcome {
        let code = match country::resolve(text) {
            ResolvedCountry::Known(code) => code.to_owned(),
            ResolvedCountry::Unrecognized(raw) if self.config.accept_unrecognized_countries => {
                debug!(identity, text = %raw, "keeping unrecognized country as-is");
                raw
            }
            ResolvedCountry::Unrecognized(raw) => {
                debug!(identity, text = %raw, "ignoring unrecognized country");
                return DispatchOutcome::Ignored {
                    reason: IgnoreReason::UnrecognizedCountry,
                };
            }
            ResolvedCountry::Empty => {
                return DispatchOutcome::Ignored {
                    reason: IgnoreReason::EmptyComment,
                };
            }
        };

        let _gate = self.write_gate.lock().await;
        let participants = self
            .ledger
            .assign_country(identity, display_name, &code)
            .await;
        self.remember(|session| session.last_country = text.trim().to_owned())
            .await;

        let Some(participant) = self.ledger.locate(&participants, identity, display_name) else {
            return DispatchOutcome::Ignored {
                reason: IgnoreReason::UnknownParticipant,
            };
        };
        let participant_id = participant.id.clone();
        self.publish(&participants);

        DispatchOutcome::CountryAssigned {
            participant_id,
            country_code: code,
        }
    }

    fn handle_join(&self, identity: &str, display_name: Option<&str>) -> DispatchOutcome {
        let announced = self.config.announce_joins;
        if announced {
            let name = display_name.filter(|n| !n.trim().is_empty()).unwrap_or(identity);
            self.announcer
                .announce(format!("Bienvenue {name} !"), VoiceProfile::Male, false);
        }
        DispatchOutcome::Joined {
            identity: identity.to_owned(),
            announced,
        }
    }

    /// Zero every live counter.
    pub async fn reset_live(&self) -> Vec<Participant> {
        let _gate = self.write_gate.lock().await;
        let participants = self.ledger.reset_live().await;
        self.publish(&participants);
        participants
    }

    /// Export the participant collection.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Serialization`] if serialization fails.
    pub async fn export(&self) -> Result<ExportDocument, LedgerError> {
        let _gate = self.write_gate.lock().await;
        self.ledger.export().await
    }

    /// Replace the participant collection with an export.
    ///
    /// # Errors
    ///
    /// Returns the [`LedgerError`] from [`PointLedger::import`]; the
    /// collection is unchanged on error.
    pub async fn import(&self, raw: &str) -> Result<Vec<Participant>, LedgerError> {
        let _gate = self.write_gate.lock().await;
        let participants = self.ledger.import(raw).await?;
        self.publish(&participants);
        Ok(participants)
    }

    /// The full participant collection, rolled forward to now.
    pub async fn participants(&self) -> Vec<Participant> {
        self.ledger.load().await
    }

    /// The leaderboard view at the configured sizes.
    pub async fn leaderboard(&self) -> LeaderboardView {
        self.leaderboard_with(self.leaderboard_size).await
    }

    /// The leaderboard view with `limit` entries per window.
    pub async fn leaderboard_with(&self, limit: usize) -> LeaderboardView {
        let participants = self.ledger.load().await;
        LeaderboardView::project(&participants, limit, self.country_board_size)
    }

    /// Country totals, best first, at most `limit` entries.
    pub async fn countries(&self, limit: usize) -> Vec<CountryAggregate> {
        let mut totals = country_totals(&self.ledger.load().await);
        totals.truncate(limit);
        totals
    }

    /// The session record.
    pub async fn session(&self) -> SessionRecord {
        self.ledger.session().await
    }

    /// The configured leaderboard size.
    pub const fn leaderboard_size(&self) -> usize {
        self.leaderboard_size
    }

    /// The configured country ranking size.
    pub const fn country_board_size(&self) -> usize {
        self.country_board_size
    }

    async fn remember(&self, update: impl FnOnce(&mut SessionRecord)) {
        let mut session = self.ledger.session().await;
        update(&mut session);
        self.ledger.save_session(&session).await;
    }

    fn publish(&self, participants: &[Participant]) {
        let view =
            LeaderboardView::project(participants, self.leaderboard_size, self.country_board_size);
        // No subscribers is fine; the next one reads a fresh view.
        let _ = self.updates.send(view);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]

    use namevalue_announcer::Announcement;
    use namevalue_db::KvStore;
    use namevalue_ledger::MatchPolicy;
    use tokio::sync::mpsc;

    use super::*;

    fn dispatcher(
        config: DispatcherConfig,
    ) -> (EventDispatcher, mpsc::UnboundedReceiver<Announcement>) {
        let (announcer, rx) = Announcer::capture();
        let ledger = PointLedger::new(KvStore::memory(), MatchPolicy::PermissiveName);
        let dispatcher =
            EventDispatcher::new(ledger, announcer, config, &LedgerConfig::default());
        (dispatcher, rx)
    }

    fn gift(identity: &str, name: &str, coins: u64) -> LiveEvent {
        LiveEvent::Gift {
            identity: identity.into(),
            display_name: name.into(),
            coin_amount: coins,
            gift_name: Some("Rose".into()),
        }
    }

    fn comment(identity: &str, text: &str) -> LiveEvent {
        LiveEvent::Comment {
            identity: identity.into(),
            display_name: None,
            text: text.into(),
        }
    }

    #[tokio::test]
    async fn gift_credits_and_announces_urgently() {
        let (dispatcher, mut announcements) = dispatcher(DispatcherConfig::default());

        let outcome = dispatcher.handle(gift("u1", "Jean", 10)).await;
        assert_eq!(
            outcome,
            DispatchOutcome::GiftCredited {
                participant_id: "u1".into(),
                display_name: "Jean".into(),
                coins: 10,
                points_live: 10,
            }
        );

        let announcement = announcements.recv().await.unwrap();
        assert_eq!(
            announcement,
            Announcement::urgent("Jean vient de booster son nom de 10 points !", VoiceProfile::Female)
        );
        assert_eq!(dispatcher.session().await.last_user, "Jean");
    }

    #[tokio::test]
    async fn zero_coin_gift_is_ignored_silently() {
        let (dispatcher, mut announcements) = dispatcher(DispatcherConfig::default());
        let outcome = dispatcher.handle(gift("u1", "Jean", 0)).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Ignored {
                reason: IgnoreReason::ZeroCoins
            }
        );
        assert!(announcements.try_recv().is_err());
        assert!(dispatcher.participants().await.is_empty());
    }

    #[tokio::test]
    async fn anonymous_gift_reports_generated_id() {
        let (dispatcher, _announcements) = dispatcher(DispatcherConfig::default());
        let outcome = dispatcher.handle(gift("", "Anon", 2)).await;
        let DispatchOutcome::GiftCredited { participant_id, .. } = outcome else {
            panic!("expected a credited gift, got {outcome:?}");
        };
        assert!(participant_id.starts_with("u_"));
    }

    #[tokio::test]
    async fn comment_resolves_country_for_donor() {
        let (dispatcher, _announcements) = dispatcher(DispatcherConfig::default());
        dispatcher.handle(gift("u1", "Jean", 10)).await;

        let outcome = dispatcher.handle(comment("u1", "  algérie ")).await;
        assert_eq!(
            outcome,
            DispatchOutcome::CountryAssigned {
                participant_id: "u1".into(),
                country_code: "DZ".into(),
            }
        );
        assert_eq!(dispatcher.countries(8).await[0].country_code, "DZ");
        assert_eq!(dispatcher.session().await.last_country, "algérie");
    }

    #[tokio::test]
    async fn comment_from_non_donor_is_ignored() {
        let (dispatcher, _announcements) = dispatcher(DispatcherConfig::default());
        let outcome = dispatcher.handle(comment("ghost", "Maroc")).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Ignored {
                reason: IgnoreReason::UnknownParticipant
            }
        );
        assert!(dispatcher.participants().await.is_empty());

        dispatcher.handle(comment("ghost", " Sénégal ")).await;
        assert_eq!(dispatcher.session().await.last_country, "Sénégal");
        assert!(dispatcher.participants().await.is_empty());
    }

    #[tokio::test]
    async fn unrecognized_country_follows_config() {
        let (keeping, _rx) = dispatcher(DispatcherConfig::default());
        keeping.handle(gift("u1", "Jean", 10)).await;
        let outcome = keeping.handle(comment("u1", "Atlantide")).await;
        assert!(matches!(
            outcome,
            DispatchOutcome::CountryAssigned { ref country_code, .. } if country_code == "Atlantide"
        ));

        let strict_config = DispatcherConfig {
            accept_unrecognized_countries: false,
            ..DispatcherConfig::default()
        };
        let (strict, _rx) = dispatcher(strict_config);
        strict.handle(gift("u1", "Jean", 10)).await;
        let outcome = strict.handle(comment("u1", "Atlantide")).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Ignored {
                reason: IgnoreReason::UnrecognizedCountry
            }
        );
        assert_eq!(strict.participants().await[0].country_code, None);
    }

    #[tokio::test]
    async fn blank_comment_is_ignored() {
        let (dispatcher, _rx) = dispatcher(DispatcherConfig::default());
        let outcome = dispatcher.handle(comment("u1", "   ")).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Ignored {
                reason: IgnoreReason::EmptyComment
            }
        );
    }

    #[tokio::test]
    async fn joins_announce_only_when_enabled() {
        let join = || LiveEvent::Join {
            identity: "u9".into(),
            display_name: Some("Yasmine".into()),
        };

        let (quiet, mut quiet_rx) = dispatcher(DispatcherConfig::default());
        quiet.handle(join()).await;
        assert!(quiet_rx.try_recv().is_err());
        assert!(quiet.participants().await.is_empty());

        let config = DispatcherConfig {
            announce_joins: true,
            ..DispatcherConfig::default()
        };
        let (loud, mut loud_rx) = dispatcher(config);
        let outcome = loud.handle(join()).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Joined {
                identity: "u9".into(),
                announced: true
            }
        );
        let welcome = loud_rx.recv().await.unwrap();
        assert_eq!(welcome.text, "Bienvenue Yasmine !");
        assert!(!welcome.urgent);
    }

    #[tokio::test]
    async fn state_changes_are_broadcast() {
        let (dispatcher, _rx) = dispatcher(DispatcherConfig::default());
        let mut updates = dispatcher.subscribe();

        dispatcher.handle(gift("u1", "Jean", 10)).await;
        let view = updates.recv().await.unwrap();
        assert_eq!(view.live[0].points_live, 10);

        dispatcher.reset_live().await;
        let view = updates.recv().await.unwrap();
        assert!(view.live.is_empty());
        assert_eq!(view.week[0].points_week, 10);
    }

    #[tokio::test]
    async fn import_replaces_and_broadcasts() {
        let (source, _rx) = dispatcher(DispatcherConfig::default());
        source.handle(gift("u1", "Jean", 15)).await;
        let doc = source.export().await.unwrap();

        let (target, _rx) = dispatcher(DispatcherConfig::default());
        let mut updates = target.subscribe();
        let imported = target.import(&doc.body).await.unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(updates.recv().await.unwrap().participant_count, 1);

        assert!(target.import("{}").await.is_err());
        assert_eq!(target.participants().await, imported);
    }

    #[test]
    fn outcome_serializes_tagged() {
        let json = serde_json::to_value(DispatchOutcome::CountryAssigned {
            participant_id: "u1".into(),
            country_code: "MA".into(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "country_assigned");
        assert_eq!(json["participantId"], "u1");
        assert_eq!(json["countryCode"], "MA");
    }
}
