//! BiosAudit Compliance Analyzer
//!
//! Compares each inventory row's BIOS version against the reference catalog and folds the
//! results into fleet-wide and per-department compliance statistics.

pub mod catalog;
pub mod classify;
pub mod export;
pub mod matcher;
pub mod report;
pub mod version;

pub use catalog::{CatalogSnapshot, ReferenceCatalog};
pub use classify::{classify, Classification, RowVerdict};
pub use export::{export_file_name, to_csv_bytes, write_csv, ExportableRow};
pub use report::{
    build_report, department_code, DepartmentSummary, Report, ReportBuilder, ReportRow,
    ReportStatistics, RiskTier, ScoreTier,
};
pub use version::{compare, normalize, VersionToken};

use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Inventory error: {0}")]
    Inventory(#[from] biosaudit_inventory::InventoryError),

    #[error("Export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Compliance report entry points
pub struct Analyzer;

impl Analyzer {
    /// Parse an uploaded inventory table and build its report.
    ///
    /// Fails as a whole when the table cannot be read; row-level defects are classified instead.
    pub fn analyze_bytes<C>(bytes: &[u8], catalog: &C) -> Result<Report>
    where
        C: ReferenceCatalog + ?Sized,
    {
        let rows = biosaudit_inventory::parse_inventory(bytes)?;
        Ok(build_report(&rows, catalog))
    }

    /// Read an inventory file from disk and build its report
    pub fn analyze_file<C>(path: &Path, catalog: &C) -> Result<Report>
    where
        C: ReferenceCatalog + ?Sized,
    {
        let rows = biosaudit_inventory::read_inventory(path)?;
        let report = build_report(&rows, catalog);
        info!(path = %path.display(), rows = report.rows.len(), "Analyzed inventory file");
        Ok(report)
    }
}
