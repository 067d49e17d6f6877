//! Inventory reader for delimited text and Excel workbooks

use crate::columns::{ColumnField, ColumnMap};
use crate::{InventoryError, InventoryRow, Result, MISSING_MODEL, MISSING_TEXT, MISSING_VERSION};
use calamine::{Reader, Xlsx};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
/// Local file header signature; `.xlsx` files are ZIP archives
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Read and parse an inventory export from disk
pub fn read_inventory(path: &Path) -> Result<Vec<InventoryRow>> {
    let bytes = std::fs::read(path)?;
    let rows = parse_inventory(&bytes)?;
    info!(path = %path.display(), rows = rows.len(), "Loaded inventory");
    Ok(rows)
}

/// Parse an inventory table: an `.xlsx` workbook (first sheet) or delimited text.
///
/// The whole table fails if any record cannot be read; no partial result is returned.
pub fn parse_inventory(bytes: &[u8]) -> Result<Vec<InventoryRow>> {
    if bytes.starts_with(ZIP_MAGIC) {
        parse_workbook(bytes)
    } else {
        parse_delimited(bytes)
    }
}

/// Comma separated first, semicolon when the header says so
fn parse_delimited(bytes: &[u8]) -> Result<Vec<InventoryRow>> {
    let data = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let delimiter = detect_delimiter(data)?;
    debug!(delimiter = %(delimiter as char), "Parsing inventory table");

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(InventoryError::MissingHeader);
    }

    let columns = ColumnMap::detect(&headers[..]);
    debug!(?columns, "Resolved inventory columns");

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            return Err(InventoryError::RowTooWide {
                row: idx + 1,
                found: record.len(),
                expected: headers.len(),
            });
        }

        let fields: Vec<&str> = record.iter().collect();
        rows.push(to_row(&fields, &columns));
    }

    Ok(rows)
}

fn parse_workbook(bytes: &[u8]) -> Result<Vec<InventoryRow>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(InventoryError::MissingHeader)??;

    let mut records = range
        .rows()
        .map(|cells| cells.iter().map(|c| c.to_string()).collect::<Vec<String>>());

    let headers: Vec<String> = match records.next() {
        Some(headers) => headers.iter().map(|h| h.trim().to_string()).collect(),
        None => return Err(InventoryError::MissingHeader),
    };

    let columns = ColumnMap::detect(&headers[..]);
    debug!(?columns, "Resolved workbook columns");

    let rows: Vec<InventoryRow> = records
        .filter(|fields| fields.iter().any(|f| !f.trim().is_empty()))
        .map(|fields| to_row(&fields, &columns))
        .collect();

    Ok(rows)
}

fn to_row<S: AsRef<str>>(fields: &[S], columns: &ColumnMap) -> InventoryRow {
    InventoryRow {
        computer_name: cell(fields, columns, ColumnField::Name, MISSING_TEXT),
        model_raw: cell(fields, columns, ColumnField::Model, MISSING_MODEL),
        service_tag: cell(fields, columns, ColumnField::Tag, MISSING_TEXT),
        current_version_raw: cell(fields, columns, ColumnField::Version, MISSING_VERSION),
    }
}

fn detect_delimiter(data: &[u8]) -> Result<u8> {
    let mut reader = ReaderBuilder::new().delimiter(b',').from_reader(data);
    let headers = reader.headers()?;

    if headers.len() == 1 && headers.get(0).is_some_and(|h| h.contains(';')) {
        Ok(b';')
    } else {
        Ok(b',')
    }
}

fn cell<S: AsRef<str>>(fields: &[S], columns: &ColumnMap, field: ColumnField, missing: &str) -> String {
    match columns.get(field) {
        Some(idx) => fields.get(idx).map(|f| f.as_ref().trim()).unwrap_or_default().to_string(),
        None => missing.to_string(),
    }
}
