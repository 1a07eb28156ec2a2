//! Reset bookkeeping stored in the `system/metadata` document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Singleton record of the most recent daily reset.
///
/// Stored at: `system/metadata`. Written with merge semantics, so the
/// document may carry other fields this type does not know about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ResetMetadata {
    /// Local start of the reset day, as a UTC ISO-8601 string
    #[serde(default)]
    pub last_reset_date: Option<String>,
    /// Server time of the reset write
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub last_reset_timestamp: Option<DateTime<Utc>>,
}

/// The client-writable part of [`ResetMetadata`]; the timestamp is
/// always assigned by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetMarker {
    pub last_reset_date: String,
}
