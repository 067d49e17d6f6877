//! BiosAudit Reference Catalog
//!
//! SQLite storage for the latest known BIOS version per model, mirrored to a flat JSON file.

mod mirror;
mod models;
mod queries;
mod schema;
mod store;
mod vendor;

pub use mirror::{version_map_from_json, JsonMirror, VersionMap};
pub use models::*;
pub use schema::Database;
pub use store::{ReferenceStore, SyncSummary};
pub use vendor::{compose_model_name, infer_vendor, KNOWN_MODELS, VENDOR_OTHER, VENDOR_RULES};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Model already exists: {0}")]
    Duplicate(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON mirror I/O failed: {0}")]
    MirrorIo(#[from] std::io::Error),

    #[error("JSON mirror encoding failed: {0}")]
    MirrorFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Locations of the two catalog stores
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    pub json_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: std::env::var("BIOSAUDIT_DATABASE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("bios_database.db")),
            json_path: std::env::var("BIOSAUDIT_JSON_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("bios_versions.json")),
        }
    }
}
