//! Export and import of the full participant collection.
//!
//! An export is a pretty-printed JSON list of participant records, named
//! after the UTC day it was taken. Import accepts the same list, including
//! older backups that use `username` and omit timestamps.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use namevalue_types::Participant;

use crate::LedgerError;

/// A ready-to-download backup of the participant collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Suggested file name, `que_vaut_ton_nom_backup_YYYY-MM-DD.json`.
    pub file_name: String,
    /// When the export was taken.
    pub exported_at: DateTime<Utc>,
    /// The JSON body.
    pub body: String,
}

/// Serialize `participants` into an export taken at `at`.
///
/// # Errors
///
/// Returns [`LedgerError::Serialization`] if a record cannot be serialized.
pub fn export_document(
    participants: &[Participant],
    at: DateTime<Utc>,
) -> Result<ExportDocument, LedgerError> {
    let body = serde_json::to_string_pretty(participants)?;
    Ok(ExportDocument {
        file_name: format!("que_vaut_ton_nom_backup_{}.json", at.format("%Y-%m-%d")),
        exported_at: at,
        body,
    })
}

/// Parse an import payload into participant records.
///
/// # Errors
///
/// Returns [`LedgerError::ImportParse`] if `raw` is not JSON or an element
/// is not a participant record, and [`LedgerError::ImportFormatInvalid`]
/// if the top level is not a list.
pub fn parse_import(raw: &str) -> Result<Vec<Participant>, LedgerError> {
    let value: Value = serde_json::from_str(raw).map_err(LedgerError::ImportParse)?;
    let kind = match &value {
        Value::Array(_) => None,
        Value::Null => Some("null"),
        Value::Bool(_) => Some("a boolean"),
        Value::Number(_) => Some("a number"),
        Value::String(_) => Some("a string"),
        Value::Object(_) => Some("an object"),
    };
    if let Some(kind) = kind {
        return Err(LedgerError::ImportFormatInvalid(kind));
    }
    serde_json::from_value(value).map_err(LedgerError::ImportParse)
}
