//! Scoring window keys and lazy rollover.
//!
//! A window key identifies the period a timestamp falls in. Keys are never
//! stored: each read recomputes the key of a participant's last-update
//! timestamp and compares it with the key of "now". All keys are computed
//! on UTC dates, so the operator's local timezone can never trigger a
//! second reset.

use chrono::{DateTime, Datelike, SubsecRound, Utc};

use namevalue_types::Participant;

/// ISO 8601 week identifier.
///
/// The ISO year is part of the key: week 3 of 2025 and week 3 of 2026 are
/// different windows, and the last days of December can belong to week 1
/// of the following ISO year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    /// ISO week-numbering year.
    pub iso_year: i32,
    /// ISO week number (1..=53).
    pub week: u32,
}

/// Week key of a UTC timestamp.
pub fn week_key(at: DateTime<Utc>) -> WeekKey {
    let iso = at.iso_week();
    WeekKey {
        iso_year: iso.year(),
        week: iso.week(),
    }
}

/// Year key (calendar year, UTC) of a timestamp.
pub fn year_key(at: DateTime<Utc>) -> i32 {
    at.year()
}

/// Truncate a timestamp to millisecond precision.
///
/// Records are serialized with millisecond timestamps; stamping at the same
/// precision keeps a save/load cycle lossless.
pub fn stamp(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

/// Current time, stamped at millisecond precision.
pub fn now() -> DateTime<Utc> {
    stamp(Utc::now())
}

/// Which counters a rollover pass zeroed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rollover {
    /// The week counter belonged to an older week.
    pub week: bool,
    /// The year counter belonged to an older year.
    pub year: bool,
}

/// Zero every counter whose window is stale relative to `now`.
///
/// A missing timestamp counts as stale. A zeroed counter gets its
/// timestamp stamped to `now`. The live counter is never touched here.
pub fn roll_forward(participant: &mut Participant, now: DateTime<Utc>) -> Rollover {
    let current_week = week_key(now);
    let current_year = year_key(now);

    let week_stale = participant
        .last_week_update
        .is_none_or(|at| week_key(at) != current_week);
    let year_stale = participant
        .last_year_update
        .is_none_or(|at| year_key(at) != current_year);

    if week_stale {
        participant.points_week = 0;
        participant.last_week_update = Some(now);
    }
    if year_stale {
        participant.points_year = 0;
        participant.last_year_update = Some(now);
    }

    Rollover {
        week: week_stale,
        year: year_stale,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .unwrap_or_default()
    }

    fn participant_at(at: DateTime<Utc>) -> Participant {
        let mut p = Participant::from_first_gift("u1", "Jean", 500, at);
        p.points_live = 120;
        p
    }

    #[test]
    fn week_key_follows_iso_8601() {
        // Monday 2024-12-30 opens ISO week 1 of 2025.
        assert_eq!(
            week_key(utc(2024, 12, 30, 0, 0)),
            WeekKey {
                iso_year: 2025,
                week: 1
            }
        );
        // Sunday 2021-01-03 still belongs to week 53 of 2020.
        assert_eq!(
            week_key(utc(2021, 1, 3, 12, 0)),
            WeekKey {
                iso_year: 2020,
                week: 53
            }
        );
    }

    #[test]
    fn week_boundary_is_monday_midnight_utc() {
        let sunday_night = utc(2026, 10, 11, 23, 59);
        let monday_morning = utc(2026, 10, 12, 0, 0);
        assert_ne!(week_key(sunday_night), week_key(monday_morning));
        assert_eq!(week_key(monday_morning), week_key(utc(2026, 10, 18, 23, 59)));
    }

    #[test]
    fn same_week_number_in_another_year_is_stale() {
        let last_year = utc(2025, 10, 15, 12, 0);
        let this_year = utc(2026, 10, 14, 12, 0);
        assert_eq!(week_key(last_year).week, week_key(this_year).week);
        assert_ne!(week_key(last_year), week_key(this_year));
    }

    #[test]
    fn prior_week_zeroes_week_counter_only() {
        let last_week = utc(2026, 10, 7, 18, 0);
        let now = utc(2026, 10, 15, 9, 0);
        let mut p = participant_at(last_week);

        let rolled = roll_forward(&mut p, now);

        assert_eq!(rolled, Rollover { week: true, year: false });
        assert_eq!(p.points_week, 0);
        assert_eq!(p.last_week_update, Some(now));
        assert_eq!(p.points_year, 500);
        assert_eq!(p.last_year_update, Some(last_week));
        assert_eq!(p.points_live, 120);
    }

    #[test]
    fn prior_year_zeroes_both_calendar_counters() {
        let last_year = utc(2025, 12, 20, 18, 0);
        let now = utc(2026, 1, 15, 9, 0);
        let mut p = participant_at(last_year);

        let rolled = roll_forward(&mut p, now);

        assert_eq!(rolled, Rollover { week: true, year: true });
        assert_eq!(p.points_week, 0);
        assert_eq!(p.points_year, 0);
        assert_eq!(p.points_live, 120);
    }

    #[test]
    fn missing_timestamps_are_stale() {
        let now = utc(2026, 10, 15, 9, 0);
        let mut p = participant_at(now);
        p.last_week_update = None;
        p.last_year_update = None;

        let rolled = roll_forward(&mut p, now);

        assert!(rolled.week && rolled.year);
        assert_eq!(p.last_week_update, Some(now));
        assert_eq!(p.last_year_update, Some(now));
    }

    #[test]
    fn current_window_is_untouched() {
        let now = utc(2026, 10, 15, 9, 0);
        let mut p = participant_at(utc(2026, 10, 13, 8, 0));
        let before = p.clone();
        assert_eq!(roll_forward(&mut p, now), Rollover::default());
        assert_eq!(p, before);
    }

    #[test]
    fn stamp_drops_sub_millisecond_precision() {
        let precise = Utc
            .timestamp_opt(1_700_000_000, 123_456_789)
            .single()
            .unwrap_or_default();
        assert_eq!(stamp(precise).timestamp_subsec_nanos(), 123_000_000);
    }
}
