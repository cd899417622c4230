//! Inbound live events delivered by the broadcast feed.
//!
//! Events arrive already parsed; this module only fixes their shape. The
//! JSON form is tagged by `type`:
//!
//! ```json
//! {"type": "gift", "identity": "123", "displayName": "Jean", "coinAmount": 5}
//! {"type": "comment", "identity": "123", "text": "maroc"}
//! {"type": "join", "identity": "123"}
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single interaction event from the live broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum LiveEvent {
    /// A viewer sent a gift worth `coin_amount` coins.
    Gift {
        /// Stable identity of the sender.
        identity: String,
        /// Display name of the sender at the time of the gift.
        #[serde(rename = "displayName", alias = "username")]
        display_name: String,
        /// Coin value of the gift (positive).
        #[serde(rename = "coinAmount", alias = "coins")]
        coin_amount: u64,
        /// Name of the gift, when the feed provides it.
        #[serde(rename = "giftName", default)]
        gift_name: Option<String>,
    },
    /// A viewer posted a comment, interpreted as a country claim.
    Comment {
        /// Stable identity (or display name) of the author.
        identity: String,
        /// Display name of the author, when the feed provides it.
        #[serde(rename = "displayName", default)]
        display_name: Option<String>,
        /// Raw comment text, or an already resolved country code.
        #[serde(alias = "comment")]
        text: String,
    },
    /// A viewer joined the broadcast.
    Join {
        /// Stable identity of the viewer.
        identity: String,
        /// Display name of the viewer, when the feed provides it.
        #[serde(rename = "displayName", default)]
        display_name: Option<String>,
    },
}

impl LiveEvent {
    /// Stable identity carried by every event.
    pub fn identity(&self) -> &str {
        match self {
            Self::Gift { identity, .. }
            | Self::Comment { identity, .. }
            | Self::Join { identity, .. } => identity,
        }
    }

    /// Best available human-readable name: the display name if present,
    /// otherwise the identity.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gift { display_name, .. } => display_name,
            Self::Comment { display_name, identity, .. }
            | Self::Join { display_name, identity } => {
                display_name.as_deref().unwrap_or(identity)
            }
        }
    }

    /// Short lowercase event kind for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Gift { .. } => "gift",
            Self::Comment { .. } => "comment",
            Self::Join { .. } => "join",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gift_parses_from_feed_json() {
        let raw = r#"{"type":"gift","identity":"u1","displayName":"Jean","coinAmount":5}"#;
        let event: Result<LiveEvent, _> = serde_json::from_str(raw);
        assert_eq!(
            event.ok(),
            Some(LiveEvent::Gift {
                identity: "u1".to_owned(),
                display_name: "Jean".to_owned(),
                coin_amount: 5,
                gift_name: None,
            })
        );
    }

    #[test]
    fn comment_accepts_legacy_field_name() {
        let raw = r#"{"type":"comment","identity":"Jean","comment":"maroc"}"#;
        let event: Result<LiveEvent, _> = serde_json::from_str(raw);
        assert!(event.is_ok());
        let event = event.unwrap_or(LiveEvent::Join {
            identity: String::new(),
            display_name: None,
        });
        assert_eq!(event.kind(), "comment");
        assert_eq!(event.display_name(), "Jean");
    }

    #[test]
    fn unknown_type_is_rejected() {
        let raw = r#"{"type":"like","identity":"u1"}"#;
        let event: Result<LiveEvent, _> = serde_json::from_str(raw);
        assert!(event.is_err());
    }
}
