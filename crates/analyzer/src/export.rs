//! Delimited-text export of a report

use crate::report::ReportRow;
use crate::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One exported line, columns in spreadsheet order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportableRow {
    #[serde(rename = "Name")]
    pub computer_name: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Tag")]
    pub service_tag: String,
    #[serde(rename = "Ver PC")]
    pub current_version: String,
    #[serde(rename = "Ver Baza")]
    pub latest_version: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(skip)]
    pub match_model: String,
}

impl From<&ReportRow> for ExportableRow {
    fn from(row: &ReportRow) -> Self {
        Self {
            computer_name: row.computer_name.clone(),
            model: row.model.clone(),
            service_tag: row.service_tag.clone(),
            current_version: row.current_version.clone(),
            latest_version: row.latest_version.clone(),
            status: row.status.clone(),
            match_model: row.match_model.clone(),
        }
    }
}

/// Write rows as `;`-separated UTF-8 with a byte order mark, spreadsheet friendly
pub fn write_csv<W: Write>(rows: &[ReportRow], mut writer: W) -> Result<()> {
    writer.write_all(UTF8_BOM)?;

    let mut csv = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    if rows.is_empty() {
        csv.write_record(["Name", "Model", "Tag", "Ver PC", "Ver Baza", "Status"])?;
    }
    for row in rows {
        csv.serialize(ExportableRow::from(row))?;
    }
    csv.flush()?;

    Ok(())
}

/// Render rows to an in-memory export
pub fn to_csv_bytes(rows: &[ReportRow]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(rows, &mut buffer)?;
    Ok(buffer)
}

/// Download name for a report produced on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("Raport_BIOS_{}.csv", date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::catalog;
    use crate::report::build_report;
    use biosaudit_inventory::InventoryRow;

    #[test]
    fn test_export_layout() {
        let snapshot = catalog(&[("Dell Latitude 5420", "1.20")]);
        let report = build_report(
            &[
                InventoryRow::new("HR-PC-01", "Latitude 5420", "ABC123", "1.18"),
                InventoryRow::new("IT-PC-02", "Mystery; Box", "---", "0.0"),
            ],
            &snapshot,
        );

        let bytes = to_csv_bytes(&report.rows).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name;Model;Tag;Ver PC;Ver Baza;Status");
        assert_eq!(lines[1], "HR-PC-01;Latitude 5420;ABC123;1.18;1.20;OUTDATED");
        assert_eq!(lines[2], "IT-PC-02;\"Mystery; Box\";---;0.0;---;NO REFERENCE");
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let bytes = to_csv_bytes(&[]).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.trim_end(), "Name;Model;Tag;Ver PC;Ver Baza;Status");
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "Raport_BIOS_20260307.csv");
    }
}
