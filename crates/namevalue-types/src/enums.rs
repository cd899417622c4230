//! Enumeration types for the Name Value leaderboard.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Scoring windows
// ---------------------------------------------------------------------------

/// A scoring period tracked by the point ledger.
///
/// Each participant carries one counter per window. The live window is reset
/// explicitly by the operator; the week and year windows roll over lazily
/// when a read detects that the stored window key is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Window {
    /// The current broadcast session.
    Live,
    /// The current ISO 8601 week (Monday-anchored, UTC).
    Week,
    /// The current calendar year (UTC).
    Year,
}

impl Window {
    /// All windows, in display order.
    pub const ALL: [Self; 3] = [Self::Live, Self::Week, Self::Year];

    /// Stable lowercase name used in URLs and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Week => "week",
            Self::Year => "year",
        }
    }

    /// Parse a window from its lowercase name.
    ///
    /// Returns `None` for anything other than `live`, `week`, or `year`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "live" | "session" => Some(Self::Live),
            "week" => Some(Self::Week),
            "year" => Some(Self::Year),
            _ => None,
        }
    }
}

impl core::fmt::Display for Window {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Voice profiles
// ---------------------------------------------------------------------------

/// Voice used to speak an announcement.
///
/// The synthesis backend maps each profile onto one of its prebuilt voices.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum VoiceProfile {
    /// Female announcer voice (used for donations).
    #[default]
    Female,
    /// Male announcer voice.
    Male,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_parse_accepts_known_names() {
        assert_eq!(Window::parse("live"), Some(Window::Live));
        assert_eq!(Window::parse(" WEEK "), Some(Window::Week));
        assert_eq!(Window::parse("year"), Some(Window::Year));
        assert_eq!(Window::parse("session"), Some(Window::Live));
        assert_eq!(Window::parse("month"), None);
    }

    #[test]
    fn window_serializes_lowercase() {
        let json = serde_json::to_string(&Window::Week).unwrap_or_default();
        assert_eq!(json, "\"week\"");
    }

    #[test]
    fn voice_defaults_to_female() {
        assert_eq!(VoiceProfile::default(), VoiceProfile::Female);
        let json = serde_json::to_string(&VoiceProfile::Male).unwrap_or_default();
        assert_eq!(json, "\"male\"");
    }
}
