//! Per-row compliance classification

use crate::catalog::ReferenceCatalog;
use crate::matcher::resolve;
use crate::version::compare;
use biosaudit_database::BiosReference;
use biosaudit_inventory::InventoryRow;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Model values that mean the scanner captured nothing
pub const PLACEHOLDER_MODELS: &[&str] = &["nan", "unknown", "", "none"];

const SEARCH_ENGINE_URL: &str = "https://www.google.com/search?q=";

/// Compliance outcome of one inventory row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Model field empty or a placeholder
    DataError,
    /// Model not found in the catalog
    NoReference,
    UpToDate,
    /// Installed version newer than the catalog's
    Ahead,
    Outdated,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DataError => "DATA ERROR",
            Self::NoReference => "NO REFERENCE",
            Self::UpToDate => "UP TO DATE",
            Self::Ahead => "OK (NEWER)",
            Self::Outdated => "OUTDATED",
        }
    }

    /// Up to date or ahead
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::UpToDate | Self::Ahead)
    }

    /// Could not be judged against a reference
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::DataError | Self::NoReference)
    }
}

/// Classification plus the catalog entry the row resolved to
#[derive(Debug, Clone, Copy)]
pub struct RowVerdict<'a> {
    pub classification: Classification,
    pub matched: Option<&'a BiosReference>,
}

pub fn is_placeholder_model(model_raw: &str) -> bool {
    let folded = model_raw.trim().to_lowercase();
    PLACEHOLDER_MODELS.contains(&folded.as_str())
}

/// Classify a row against the catalog
pub fn classify<'a, C>(row: &InventoryRow, catalog: &'a C) -> RowVerdict<'a>
where
    C: ReferenceCatalog + ?Sized,
{
    if is_placeholder_model(&row.model_raw) {
        return RowVerdict {
            classification: Classification::DataError,
            matched: None,
        };
    }

    let Some(entry) = resolve(catalog, &row.model_raw) else {
        return RowVerdict {
            classification: Classification::NoReference,
            matched: None,
        };
    };

    let classification = match compare(&row.current_version_raw, &entry.latest_version) {
        Ordering::Equal => Classification::UpToDate,
        Ordering::Greater => Classification::Ahead,
        Ordering::Less => Classification::Outdated,
    };

    RowVerdict {
        classification,
        matched: Some(entry),
    }
}

/// Web search text for finding a model's BIOS download page
pub fn search_query(model_raw: &str) -> String {
    format!("{} BIOS driver support", model_raw)
}

pub fn search_url(model_raw: &str) -> String {
    format!("{}{}", SEARCH_ENGINE_URL, urlencoding::encode(&search_query(model_raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::catalog;

    fn row(model: &str, version: &str) -> InventoryRow {
        InventoryRow::new("HR-PC-01", model, "TAG1", version)
    }

    #[test]
    fn test_placeholder_models_are_data_errors() {
        let snapshot = catalog(&[("nan", "1.0"), ("Unknown", "1.0")]);
        for model in ["", "  ", "NaN", "Unknown", "none", " NONE "] {
            let verdict = classify(&row(model, "1.0"), &snapshot);
            assert_eq!(verdict.classification, Classification::DataError, "{model:?}");
            assert!(verdict.matched.is_none());
        }
    }

    #[test]
    fn test_missing_reference() {
        let snapshot = catalog(&[("Dell Latitude 5420", "1.20")]);
        let verdict = classify(&row("Nonexistent Laptop 9999", "1.0"), &snapshot);
        assert_eq!(verdict.classification, Classification::NoReference);
    }

    #[test]
    fn test_version_outcomes() {
        let snapshot = catalog(&[("Dell Latitude 5420", "1.20")]);
        assert_eq!(classify(&row("Dell Latitude 5420", "1.20"), &snapshot).classification, Classification::UpToDate);
        assert_eq!(classify(&row("Dell Latitude 5420", "1.21.0"), &snapshot).classification, Classification::Ahead);
        assert_eq!(classify(&row("Dell Latitude 5420", "Ver 1.9"), &snapshot).classification, Classification::Outdated);
    }

    #[test]
    fn test_short_a_version_against_dotted_reference() {
        let snapshot = catalog(&[("Dell Latitude 5420", "1.20")]);
        let verdict = classify(&row("Latitude 5420", "A03"), &snapshot);
        assert_eq!(verdict.classification, Classification::Ahead);
        assert_eq!(verdict.matched.unwrap().model_name, "Dell Latitude 5420");
    }

    #[test]
    fn test_classification_is_repeatable() {
        let snapshot = catalog(&[("HP EliteBook 840 G8", "01.10.00")]);
        let r = row("EliteBook 840 G8", "T37 Ver. 01.08.01");
        let first = classify(&r, &snapshot).classification;
        let second = classify(&r, &snapshot).classification;
        assert_eq!(first, Classification::Outdated);
        assert_eq!(first, second);
    }

    #[test]
    fn test_search_link() {
        assert_eq!(search_query("Latitude 5420"), "Latitude 5420 BIOS driver support");
        assert_eq!(
            search_url("Latitude 5420"),
            "https://www.google.com/search?q=Latitude%205420%20BIOS%20driver%20support"
        );
    }
}
