//! Reference Catalog lookup used while building a report

use biosaudit_database::BiosReference;
use std::collections::HashMap;

/// Read access to the latest-version catalog
pub trait ReferenceCatalog {
    /// Exact model name match ignoring case
    fn find_by_name_case_insensitive(&self, name: &str) -> Option<&BiosReference>;
}

/// In-memory copy of the catalog, taken once per report run
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    entries: Vec<BiosReference>,
    by_name: HashMap<String, usize>,
}

impl CatalogSnapshot {
    pub fn new(entries: Vec<BiosReference>) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            by_name.entry(entry.model_name.trim().to_lowercase()).or_insert(idx);
        }
        Self { entries, by_name }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[BiosReference] {
        &self.entries
    }
}

impl ReferenceCatalog for CatalogSnapshot {
    fn find_by_name_case_insensitive(&self, name: &str) -> Option<&BiosReference> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.entries[idx])
    }
}

impl FromIterator<BiosReference> for CatalogSnapshot {
    fn from_iter<I: IntoIterator<Item = BiosReference>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
