//! BiosAudit Inventory Source
//!
//! Reads a fleet inventory export (delimited text or an Excel workbook) into rows the
//! analyzer can classify.

mod columns;
mod reader;

pub use columns::{ColumnField, ColumnMap, COLUMN_RULES};
pub use reader::{parse_inventory, read_inventory};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Failed to read inventory file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed inventory table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed Excel workbook: {0}")]
    Excel(#[from] calamine::XlsxError),

    #[error("Inventory table has no header row")]
    MissingHeader,

    #[error("Row {row} has {found} fields but the header has {expected}")]
    RowTooWide {
        row: usize,
        found: usize,
        expected: usize,
    },
}

pub type Result<T> = std::result::Result<T, InventoryError>;

/// Placeholder used when the table has no model column
pub const MISSING_MODEL: &str = "Unknown";
/// Placeholder used when the table has no version column
pub const MISSING_VERSION: &str = "0.0";
/// Placeholder used when the table has no name or tag column
pub const MISSING_TEXT: &str = "---";

/// One machine from the inventory export, values trimmed as scanned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub computer_name: String,
    pub model_raw: String,
    pub service_tag: String,
    pub current_version_raw: String,
}

impl InventoryRow {
    pub fn new(
        computer_name: impl Into<String>,
        model_raw: impl Into<String>,
        service_tag: impl Into<String>,
        current_version_raw: impl Into<String>,
    ) -> Self {
        Self {
            computer_name: computer_name.into(),
            model_raw: model_raw.into(),
            service_tag: service_tag.into(),
            current_version_raw: current_version_raw.into(),
        }
    }
}
