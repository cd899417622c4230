//! The point ledger: participant records over a durable key-value store.
//!
//! The [`PointLedger`] owns the participant collection. Every mutating
//! operation is a read-modify-write of the whole collection: load (with
//! lazy rollover), change one record, persist, and return the new snapshot.
//!
//! # Design
//!
//! - **Single writer**: callers serialize mutating calls; the ledger takes
//!   no locks of its own.
//! - **Lazy rollover**: stale week/year counters are zeroed on read, and
//!   only written back with the next mutation.
//! - **Fail soft**: storage corruption and failed writes are logged, never
//!   raised. The broadcast must keep running.
//! - **Gift-only creation**: a participant exists only after a gift.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use namevalue_db::{KvStore, PARTICIPANTS_KEY, SESSION_KEY};
use namevalue_types::{Participant, SessionRecord};

use crate::LedgerError;
use crate::transfer::{self, ExportDocument};
use crate::window;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How an incoming event is matched to an existing participant.
///
/// Identity always wins when it matches. The policies differ in whether a
/// display-name match is accepted when the identity is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Fall back to matching the display name. Two viewers sharing a name
    /// are merged into one record.
    #[default]
    PermissiveName,
    /// Only the stable identity matches.
    StrictIdentity,
}

/// Ledger settings from the `ledger` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Participant matching policy.
    pub match_policy: MatchPolicy,
    /// Number of participants shown per window leaderboard.
    pub leaderboard_size: usize,
    /// Number of countries shown in the country ranking.
    pub country_board_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            match_policy: MatchPolicy::PermissiveName,
            leaderboard_size: 15,
            country_board_size: 8,
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The durable collection of participants and their windowed scores.
#[derive(Debug, Clone)]
pub struct PointLedger {
    store: KvStore,
    policy: MatchPolicy,
}

impl PointLedger {
    /// Create a ledger over `store`.
    pub const fn new(store: KvStore, policy: MatchPolicy) -> Self {
        Self { store, policy }
    }

    /// The underlying store.
    pub const fn store(&self) -> &KvStore {
        &self.store
    }

    /// The matching policy in effect.
    pub const fn match_policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Find the participant an event for `identity`/`display_name` would
    /// touch, under this ledger's matching policy.
    pub fn locate<'a>(
        &self,
        participants: &'a [Participant],
        identity: &str,
        display_name: Option<&str>,
    ) -> Option<&'a Participant> {
        let name = display_name.unwrap_or(identity);
        find_participant(participants, identity, Some(name), self.policy)
            .and_then(|index| participants.get(index))
    }

    /// Read the participant collection, rolling stale windows forward.
    ///
    /// A missing, unreadable, or corrupt collection loads as empty. Rolled
    /// counters are not written back until the next mutation.
    pub async fn load(&self) -> Vec<Participant> {
        self.load_at(window::now()).await
    }

    pub(crate) async fn load_at(&self, now: DateTime<Utc>) -> Vec<Participant> {
        let raw = match self.store.get(PARTICIPANTS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "failed to read participant collection, using empty ledger"
                );
                return Vec::new();
            }
        };

        let mut participants: Vec<Participant> = match serde_json::from_str(&raw) {
            Ok(participants) => participants,
            Err(e) => {
                warn!(
                    error = %e,
                    bytes = raw.len(),
                    "storage corruption detected, using empty ledger"
                );
                return Vec::new();
            }
        };

        for participant in &mut participants {
            let rolled = window::roll_forward(participant, now);
            if rolled.week || rolled.year {
                debug!(
                    participant = %participant.id,
                    week = rolled.week,
                    year = rolled.year,
                    "window rollover"
                );
            }
        }
        participants
    }

    /// Credit `coins` to a participant, creating them on their first gift.
    ///
    /// All three counters grow by `coins` and all three timestamps move to
    /// now. The display name is updated to the latest value seen. An empty
    /// identity gets a generated one. A zero-coin gift changes nothing.
    pub async fn apply_gift(
        &self,
        identity: &str,
        display_name: &str,
        coins: u64,
    ) -> Vec<Participant> {
        self.apply_gift_at(identity, display_name, coins, window::now())
            .await
    }

    pub(crate) async fn apply_gift_at(
        &self,
        identity: &str,
        display_name: &str,
        coins: u64,
        now: DateTime<Utc>,
    ) -> Vec<Participant> {
        let mut participants = self.load_at(now).await;

        if coins == 0 {
            debug!(identity, display_name, "ignoring zero-coin gift");
            return participants;
        }

        match find_participant(&participants, identity, Some(display_name), self.policy) {
            Some(index) => {
                if let Some(p) = participants.get_mut(index) {
                    p.display_name = display_name.to_owned();
                    p.points_live = p.points_live.saturating_add(coins);
                    p.points_week = p.points_week.saturating_add(coins);
                    p.points_year = p.points_year.saturating_add(coins);
                    p.last_update = now;
                    p.last_week_update = Some(now);
                    p.last_year_update = Some(now);
                    debug!(
                        participant = %p.id,
                        coins,
                        points_live = p.points_live,
                        "gift credited"
                    );
                }
            }
            None => {
                let id = if identity.is_empty() {
                    format!("u_{}", Uuid::now_v7().simple())
                } else {
                    identity.to_owned()
                };
                info!(participant = %id, display_name, coins, "new participant");
                participants.push(Participant::from_first_gift(id, display_name, coins, now));
            }
        }

        self.persist(&participants, now).await;
        participants
    }

    /// Attribute a country to an existing participant.
    ///
    /// The participant is looked up by `identity`, then (permissive policy)
    /// by `display_name`, or by `identity` read as a display name when no
    /// name is given. Unknown participants are ignored: geography can only
    /// be claimed by someone who has already gifted.
    pub async fn assign_country(
        &self,
        identity: &str,
        display_name: Option<&str>,
        country_code: &str,
    ) -> Vec<Participant> {
        let now = window::now();
        let mut participants = self.load_at(now).await;

        let name = display_name.unwrap_or(identity);
        let Some(index) = find_participant(&participants, identity, Some(name), self.policy)
        else {
            info!(
                identity,
                country_code, "country assignment refused: participant has no points yet"
            );
            return participants;
        };

        if let Some(p) = participants.get_mut(index) {
            p.country_code = Some(country_code.to_owned());
            p.last_update = now;
            debug!(participant = %p.id, country_code, "country assigned");
        }

        self.persist(&participants, now).await;
        participants
    }

    /// Zero every live counter. Week and year counters are untouched.
    pub async fn reset_live(&self) -> Vec<Participant> {
        let now = window::now();
        let mut participants = self.load_at(now).await;
        for p in &mut participants {
            p.points_live = 0;
        }
        info!(count = participants.len(), "live points reset");
        self.persist(&participants, now).await;
        participants
    }

    /// Serialize the current collection into a dated export document.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Serialization`] if serialization fails.
    pub async fn export(&self) -> Result<ExportDocument, LedgerError> {
        let now = window::now();
        let participants = self.load_at(now).await;
        transfer::export_document(&participants, now)
    }

    /// Replace the whole collection with the contents of an export.
    ///
    /// The records are stored verbatim; rollover applies on the next load.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ImportFormatInvalid`] if the top level is not
    /// a list, [`LedgerError::ImportParse`] if the payload or an element is
    /// malformed, and [`LedgerError::Storage`] if the write fails.
    pub async fn import(&self, raw: &str) -> Result<Vec<Participant>, LedgerError> {
        let participants = transfer::parse_import(raw)?;
        self.store.set_json(PARTICIPANTS_KEY, &participants).await?;
        self.touch_session(window::now()).await;
        info!(count = participants.len(), "participant collection imported");
        Ok(participants)
    }

    /// Read the session record, falling back to defaults.
    pub async fn session(&self) -> SessionRecord {
        match self.store.get_json::<SessionRecord>(SESSION_KEY).await {
            Ok(Some(session)) => session,
            Ok(None) => SessionRecord::default(),
            Err(e) => {
                warn!(error = %e, "unreadable session record, using defaults");
                SessionRecord::default()
            }
        }
    }

    /// Write the session record. Failures are logged.
    pub async fn save_session(&self, session: &SessionRecord) {
        if let Err(e) = self.store.set_json(SESSION_KEY, session).await {
            error!(error = %e, "failed to save session record");
        }
    }

    async fn persist(&self, participants: &[Participant], now: DateTime<Utc>) {
        if let Err(e) = self.store.set_json(PARTICIPANTS_KEY, &participants).await {
            error!(
                backend = self.store.backend_name(),
                count = participants.len(),
                error = %e,
                "failed to persist participant collection"
            );
            return;
        }
        self.touch_session(now).await;
    }

    async fn touch_session(&self, now: DateTime<Utc>) {
        let mut session = self.session().await;
        session.last_active = now;
        self.save_session(&session).await;
    }
}

/// Locate a participant by identity, then by display name if allowed.
fn find_participant(
    participants: &[Participant],
    identity: &str,
    display_name: Option<&str>,
    policy: MatchPolicy,
) -> Option<usize> {
    if !identity.is_empty()
        && let Some(index) = participants.iter().position(|p| p.id == identity)
    {
        return Some(index);
    }
    match (policy, display_name) {
        (MatchPolicy::PermissiveName, Some(name)) if !name.is_empty() => {
            participants.iter().position(|p| p.display_name == name)
        }
        _ => None,
    }
}
