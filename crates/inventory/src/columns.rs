//! Header detection for inventory tables

use serde::Serialize;

/// Logical column an inventory header can feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnField {
    Model,
    Version,
    Name,
    Tag,
}

/// Ordered (substring, field) rules. A header is assigned to the first rule it matches.
pub const COLUMN_RULES: &[(&str, ColumnField)] = &[
    ("model", ColumnField::Model),
    ("ver", ColumnField::Version),
    ("bios", ColumnField::Version),
    ("name", ColumnField::Name),
    ("host", ColumnField::Name),
    ("computer", ColumnField::Name),
    ("tag", ColumnField::Tag),
    ("serial", ColumnField::Tag),
];

/// Column index resolved for each field, first matching header wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub model: Option<usize>,
    pub version: Option<usize>,
    pub name: Option<usize>,
    pub tag: Option<usize>,
}

impl ColumnMap {
    /// Resolve fields from trimmed header text
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut map = Self::default();

        for (idx, header) in headers.iter().enumerate() {
            let lower = header.as_ref().trim().to_lowercase();
            let field = COLUMN_RULES
                .iter()
                .find(|(needle, _)| lower.contains(needle))
                .map(|(_, field)| *field);

            if let Some(field) = field {
                let slot = map.slot_mut(field);
                if slot.is_none() {
                    *slot = Some(idx);
                }
            }
        }

        map
    }

    pub fn get(&self, field: ColumnField) -> Option<usize> {
        match field {
            ColumnField::Model => self.model,
            ColumnField::Version => self.version,
            ColumnField::Name => self.name,
            ColumnField::Tag => self.tag,
        }
    }

    fn slot_mut(&mut self, field: ColumnField) -> &mut Option<usize> {
        match field {
            ColumnField::Model => &mut self.model,
            ColumnField::Version => &mut self.version,
            ColumnField::Name => &mut self.name,
            ColumnField::Tag => &mut self.tag,
        }
    }
}
