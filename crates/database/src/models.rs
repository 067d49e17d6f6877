//! Catalog models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest known BIOS version for one device model.
///
/// `model_name` is unique under case-insensitive comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BiosReference {
    pub id: i64,
    pub vendor: String,
    pub model_name: String,
    pub latest_version: String,
    pub last_checked: DateTime<Utc>,
    /// No longer supported, version intentionally frozen
    pub is_old: bool,
}

/// Input for creating a catalog entry
#[derive(Debug, Clone, Deserialize)]
pub struct NewBiosReference {
    pub vendor: String,
    pub model_name: String,
    pub latest_version: String,
}

/// Input for updating a catalog entry
#[derive(Debug, Clone, Deserialize)]
pub struct BiosReferenceUpdate {
    pub latest_version: String,
    #[serde(default)]
    pub is_old: bool,
}
