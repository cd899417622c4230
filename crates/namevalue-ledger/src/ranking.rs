//! Pure ranking projections over a participant snapshot.
//!
//! Nothing here touches storage. Ordering is always descending by points
//! and stable: equal scores keep their collection order, so the earliest
//! created participant stays ahead on ties.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;

use namevalue_types::{CountryAggregate, Participant, Window};

/// Up to `n` participants with a positive counter in `window`, best first.
pub fn top_by_window(participants: &[Participant], window: Window, n: usize) -> Vec<Participant> {
    let mut ranked: Vec<&Participant> = participants
        .iter()
        .filter(|p| p.points(window) > 0)
        .collect();
    ranked.sort_by_key(|p| Reverse(p.points(window)));
    ranked.into_iter().take(n).cloned().collect()
}

/// Sum live points per country, best first.
///
/// Participants without a country or without live points are excluded.
/// Countries tie-break in code order.
pub fn country_totals(participants: &[Participant]) -> Vec<CountryAggregate> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for p in participants {
        if p.points_live == 0 {
            continue;
        }
        let Some(code) = p.country_code.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        let total = totals.entry(code).or_default();
        *total = total.saturating_add(p.points_live);
    }

    let mut aggregates: Vec<CountryAggregate> = totals
        .into_iter()
        .map(|(code, points)| CountryAggregate {
            country_code: code.to_owned(),
            points,
        })
        .collect();
    aggregates.sort_by_key(|a| Reverse(a.points));
    aggregates
}

/// Everything the overlay renders, projected from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    /// Top participants for the live session.
    pub live: Vec<Participant>,
    /// Top participants for the current ISO week.
    pub week: Vec<Participant>,
    /// Top participants for the current year.
    pub year: Vec<Participant>,
    /// Country ranking by live points.
    pub countries: Vec<CountryAggregate>,
    /// Total number of known participants.
    pub participant_count: usize,
}

impl LeaderboardView {
    /// Project a snapshot into per-window leaderboards.
    pub fn project(participants: &[Participant], limit: usize, country_limit: usize) -> Self {
        let mut countries = country_totals(participants);
        countries.truncate(country_limit);
        Self {
            live: top_by_window(participants, Window::Live, limit),
            week: top_by_window(participants, Window::Week, limit),
            year: top_by_window(participants, Window::Year, limit),
            countries,
            participant_count: participants.len(),
        }
    }

    /// The leaderboard for one window.
    pub fn window(&self, window: Window) -> &[Participant] {
        match window {
            Window::Live => &self.live,
            Window::Week => &self.week,
            Window::Year => &self.year,
        }
    }
}
