//! Core entity structs for the Name Value leaderboard.
//!
//! Timestamps are stored as UTC [`DateTime`] values and serialized as epoch
//! milliseconds so backups stay compatible with the browser overlay, which
//! has always written `Date.now()` values.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Window;

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// A named participant of the broadcast and their running scores.
///
/// Participants are created only by the ledger, as a side effect of a gift.
/// The three counters are non-decreasing between window rollovers; the
/// week and year counters are zeroed lazily when a read observes that their
/// last-update timestamp belongs to an older window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Participant {
    /// Stable identity, independent of the display name.
    pub id: String,
    /// Latest display name seen for this participant.
    #[serde(alias = "username")]
    pub display_name: String,
    /// Canonical country code, `None` until first assignment.
    #[serde(default)]
    pub country_code: Option<String>,
    /// Points earned during the current broadcast session.
    #[serde(default)]
    pub points_live: u64,
    /// Points earned during the current ISO week.
    #[serde(default)]
    pub points_week: u64,
    /// Points earned during the current calendar year.
    #[serde(default)]
    pub points_year: u64,
    /// Last time any field of this record changed.
    #[serde(default, with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub last_update: DateTime<Utc>,
    /// Timestamp used to detect week rollover.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    #[ts(type = "number | null")]
    pub last_week_update: Option<DateTime<Utc>>,
    /// Timestamp used to detect year rollover.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    #[ts(type = "number | null")]
    pub last_year_update: Option<DateTime<Utc>>,
}

impl Participant {
    /// Create a participant from their first gift.
    ///
    /// All three counters start at `coins` and every timestamp is `now`.
    pub fn from_first_gift(
        id: impl Into<String>,
        display_name: impl Into<String>,
        coins: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            country_code: None,
            points_live: coins,
            points_week: coins,
            points_year: coins,
            last_update: now,
            last_week_update: Some(now),
            last_year_update: Some(now),
        }
    }

    /// Return the counter for the given window.
    pub const fn points(&self, window: Window) -> u64 {
        match window {
            Window::Live => self.points_live,
            Window::Week => self.points_week,
            Window::Year => self.points_year,
        }
    }
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// Live points summed over every participant attributed to one country.
///
/// Recomputed from a ledger snapshot on every read; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CountryAggregate {
    /// Canonical country code.
    pub country_code: String,
    /// Sum of `points_live` for the country.
    pub points: u64,
}

// ---------------------------------------------------------------------------
// Session metadata
// ---------------------------------------------------------------------------

/// Session metadata stored next to the participant collection.
///
/// Remembers when the ledger was last written and the last values typed
/// into the simulator so the operator console can restore them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SessionRecord {
    /// Last time the participant collection was saved.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub last_active: DateTime<Utc>,
    /// Whether events are being injected by hand rather than a live feed.
    pub simulator_mode: bool,
    /// Last participant name used in an event.
    pub last_user: String,
    /// Last country text used in an event.
    pub last_country: String,
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self {
            // Millisecond precision, matching the serialized form.
            last_active: Utc::now().trunc_subsecs(3),
            simulator_mode: true,
            last_user: String::from("Paul"),
            last_country: String::from("Maroc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ts(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
    }

    #[test]
    fn participant_serializes_camel_case_millis() {
        let p = Participant::from_first_gift("u1", "Jean", 10, ts(1_700_000_000_000));
        let json = serde_json::to_value(&p).unwrap_or_default();
        assert_eq!(json["displayName"], "Jean");
        assert_eq!(json["pointsLive"], 10);
        assert_eq!(json["lastWeekUpdate"], 1_700_000_000_000_i64);
        assert!(json["countryCode"].is_null());
    }

    #[test]
    fn legacy_record_deserializes() {
        // Shape written by the browser overlay: `username`, a duplicate
        // `country` key, and no window timestamps.
        let raw = r#"{
            "id": "u_1",
            "username": "Amina",
            "pointsLive": 5,
            "pointsWeek": 5,
            "pointsYear": 5,
            "country": "MA",
            "countryCode": "MA",
            "lastUpdate": 1700000000000
        }"#;
        let parsed: Result<Participant, _> = serde_json::from_str(raw);
        assert!(parsed.is_ok());
        let p = parsed.unwrap_or_else(|_| Participant::from_first_gift("", "", 0, ts(0)));
        assert_eq!(p.display_name, "Amina");
        assert_eq!(p.country_code.as_deref(), Some("MA"));
        assert_eq!(p.last_week_update, None);
    }

    #[test]
    fn negative_counter_is_rejected() {
        let raw = r#"{"id":"x","displayName":"X","pointsLive":-3,"lastUpdate":0}"#;
        let parsed: Result<Participant, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn points_by_window() {
        let mut p = Participant::from_first_gift("u1", "Jean", 7, ts(0));
        p.points_week = 3;
        p.points_year = 11;
        assert_eq!(p.points(Window::Live), 7);
        assert_eq!(p.points(Window::Week), 3);
        assert_eq!(p.points(Window::Year), 11);
    }

    #[test]
    fn session_defaults() {
        let session = SessionRecord::default();
        assert!(session.simulator_mode);
        assert_eq!(session.last_user, "Paul");
        assert_eq!(session.last_country, "Maroc");
    }

    #[test]
    fn default_session_survives_reload_unchanged() {
        let session = SessionRecord::default();
        let reloaded = serde_json::to_string(&session)
            .ok()
            .and_then(|raw| serde_json::from_str::<SessionRecord>(&raw).ok());
        assert_eq!(reloaded.map(|s| s.last_active), Some(session.last_active));
    }
}
