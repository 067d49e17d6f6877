//! Inventory model name to catalog entry resolution

use crate::catalog::ReferenceCatalog;
use biosaudit_database::BiosReference;

/// Vendor prefixes tried, in order, when the bare model is not in the catalog
pub const VENDOR_PREFIXES: &[&str] = &["dell ", "lenovo ", "hp "];

/// Trim and lowercase a model name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Resolve a scanned model name against the catalog.
///
/// Exports often carry bare model numbers ("Latitude 5420") while the catalog stores
/// vendor-qualified names ("Dell Latitude 5420"), so each missing vendor prefix is tried.
pub fn resolve<'a, C>(catalog: &'a C, model_raw: &str) -> Option<&'a BiosReference>
where
    C: ReferenceCatalog + ?Sized,
{
    let normalized = normalize_name(model_raw);

    if let Some(entry) = catalog.find_by_name_case_insensitive(&normalized) {
        return Some(entry);
    }

    VENDOR_PREFIXES
        .iter()
        .filter(|prefix| !normalized.contains(**prefix))
        .find_map(|prefix| catalog.find_by_name_case_insensitive(&format!("{}{}", prefix, normalized)))
}
