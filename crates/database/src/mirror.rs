//! Flat JSON mirror of the catalog (`{"Model": "Version"}`)

use crate::{DatabaseError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Model name to latest version, as stored in the mirror file
pub type VersionMap = BTreeMap<String, String>;

/// JSON key-value file kept alongside the database
#[derive(Debug, Clone)]
pub struct JsonMirror {
    path: PathBuf,
}

impl JsonMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the mirror. A missing or unreadable file yields an empty map.
    pub fn load(&self) -> VersionMap {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "JSON mirror not readable");
                return VersionMap::new();
            }
        };

        let data = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
        match serde_json::from_slice(data) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "JSON mirror is not a model/version map");
                VersionMap::new()
            }
        }
    }

    /// Overwrite the mirror with `data`
    pub fn save(&self, data: &VersionMap) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), entries = data.len(), "Saved JSON mirror");
        Ok(())
    }
}

/// Convert an imported JSON document into a model/version map.
///
/// The document must be an object; versions may be strings or numbers.
pub fn version_map_from_json(document: Value) -> Result<VersionMap> {
    let Value::Object(object) = document else {
        return Err(DatabaseError::InvalidInput(
            "expected a JSON object of \"Model\": \"Version\" pairs".to_string(),
        ));
    };

    object
        .into_iter()
        .map(|(model, version)| match version {
            Value::String(s) => Ok((model, s)),
            Value::Number(n) => Ok((model, n.to_string())),
            other => Err(DatabaseError::InvalidInput(format!(
                "invalid version for {}: {}",
                model, other
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = JsonMirror::new(dir.path().join("absent.json"));
        assert!(mirror.load().is_empty());
    }

    #[test]
    fn test_save_then_load_keeps_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = JsonMirror::new(dir.path().join("bios.json"));

        let mut data = VersionMap::new();
        data.insert("Dell Latitude 5420".to_string(), "1.20".to_string());
        data.insert("Łódź Terminal".to_string(), "A07".to_string());
        mirror.save(&data).unwrap();

        let raw = std::fs::read_to_string(mirror.path()).unwrap();
        assert!(raw.contains("Łódź Terminal"));
        assert_eq!(mirror.load(), data);
    }

    #[test]
    fn test_tolerates_byte_order_mark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.json");
        std::fs::write(&path, "\u{feff}{\"HP EliteBook 840 G8\": \"01.10\"}").unwrap();

        let map = JsonMirror::new(&path).load();
        assert_eq!(map.get("HP EliteBook 840 G8").map(String::as_str), Some("01.10"));
    }

    #[test]
    fn test_version_map_accepts_strings_and_numbers() {
        let map = version_map_from_json(serde_json::json!({
            "HP EliteBook 840 G8": "01.10",
            "Dell Latitude 7420": 1.3,
            "Dell Latitude 5430": 2
        }))
        .unwrap();

        assert_eq!(map.get("HP EliteBook 840 G8").map(String::as_str), Some("01.10"));
        assert_eq!(map.get("Dell Latitude 7420").map(String::as_str), Some("1.3"));
        assert_eq!(map.get("Dell Latitude 5430").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_version_map_rejects_other_shapes() {
        assert!(matches!(
            version_map_from_json(serde_json::json!(["x"])),
            Err(DatabaseError::InvalidInput(_))
        ));
        assert!(matches!(
            version_map_from_json(serde_json::json!({"Dell Latitude 5420": null})),
            Err(DatabaseError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_garbage_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(JsonMirror::new(&path).load().is_empty());
    }
}
