//! Catalog maintenance across the database and the JSON mirror

use crate::mirror::{JsonMirror, VersionMap};
use crate::models::{BiosReference, BiosReferenceUpdate, NewBiosReference};
use crate::schema::Database;
use crate::vendor::{compose_model_name, infer_vendor, VENDOR_OTHER};
use crate::{DatabaseError, Result, StoreConfig};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Outcome of copying the JSON mirror into the database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Reference Catalog backed by both stores. Writes go to the mirror first, then SQL.
#[derive(Clone)]
pub struct ReferenceStore {
    db: Database,
    mirror: JsonMirror,
}

impl ReferenceStore {
    pub fn new(db: Database, mirror: JsonMirror) -> Self {
        Self { db, mirror }
    }

    /// Open both stores from configuration
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let db = Database::connect(&config.database_path).await?;
        Ok(Self::new(db, JsonMirror::new(&config.json_path)))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn mirror(&self) -> &JsonMirror {
        &self.mirror
    }

    /// All entries, ordered by vendor and model
    pub async fn list(&self) -> Result<Vec<BiosReference>> {
        self.db.list_references().await
    }

    /// Add an entry by hand. The vendor is prepended to the model when missing.
    pub async fn add_manual(&self, vendor: &str, model: &str, version: &str) -> Result<BiosReference> {
        let model = model.trim();
        let version = version.trim();
        if model.is_empty() || version.is_empty() {
            return Err(DatabaseError::InvalidInput(
                "model and version are required".to_string(),
            ));
        }

        let vendor = match vendor.trim() {
            "" => VENDOR_OTHER,
            v => v,
        };
        let full_name = compose_model_name(vendor, model);

        if self.db.find_by_name_case_insensitive(&full_name).await?.is_some() {
            return Err(DatabaseError::Duplicate(full_name));
        }

        let mut data = self.mirror.load();
        data.insert(full_name.clone(), version.to_string());
        self.mirror.save(&data)?;

        let created = self
            .db
            .insert_reference(NewBiosReference {
                vendor: vendor.to_string(),
                model_name: full_name,
                latest_version: version.to_string(),
            })
            .await?;

        info!(model = %created.model_name, version = %created.latest_version, "Added reference");
        Ok(created)
    }

    /// Change the latest version and support flag of an entry
    pub async fn edit(&self, id: i64, version: &str, is_old: bool) -> Result<BiosReference> {
        let version = version.trim();
        if version.is_empty() {
            return Err(DatabaseError::InvalidInput("version is required".to_string()));
        }

        let entry = self.db.get_reference(id).await?;

        let mut data = self.mirror.load();
        if let Some(value) = data.get_mut(&entry.model_name) {
            *value = version.to_string();
            self.mirror.save(&data)?;
        }

        let update = BiosReferenceUpdate {
            latest_version: version.to_string(),
            is_old,
        };
        let updated = self.db.update_reference(id, &update).await?;

        info!(model = %updated.model_name, version = %updated.latest_version, is_old, "Updated reference");
        Ok(updated)
    }

    /// Remove an entry from both stores
    pub async fn delete(&self, id: i64) -> Result<()> {
        let entry = self.db.get_reference(id).await?;

        let mut data = self.mirror.load();
        if data.remove(&entry.model_name).is_some() {
            self.mirror.save(&data)?;
        }

        self.db.delete_reference(id).await?;
        info!(model = %entry.model_name, "Deleted reference");
        Ok(())
    }

    /// Merge a model/version map into the mirror, then sync the database.
    ///
    /// Returns how many models were new or carried a different version.
    pub async fn import(&self, incoming: VersionMap) -> Result<usize> {
        let mut data = self.mirror.load();
        let mut changed = 0;

        for (model, version) in incoming {
            if data.get(&model) != Some(&version) {
                data.insert(model, version);
                changed += 1;
            }
        }

        self.mirror.save(&data)?;
        let summary = self.sync().await?;

        info!(changed, inserted = summary.inserted, updated = summary.updated, "Imported references");
        Ok(changed)
    }

    /// Copy the mirror into the database: update differing versions, insert missing models
    pub async fn sync(&self) -> Result<SyncSummary> {
        let data = self.mirror.load();
        let mut existing: HashMap<String, BiosReference> = self
            .db
            .list_references()
            .await?
            .into_iter()
            .map(|r| (r.model_name.to_lowercase(), r))
            .collect();

        let mut summary = SyncSummary::default();
        let mut seen = HashSet::new();

        // Mirror keys differing only in case map to one row; the first key in order wins
        for (model, version) in data {
            let key = model.to_lowercase();
            if !seen.insert(key.clone()) {
                debug!(model = %model, "Skipping mirror key that differs only in case");
                continue;
            }

            match existing.get(&key) {
                Some(entry) if entry.latest_version == version => {}
                Some(entry) => {
                    let update = BiosReferenceUpdate {
                        latest_version: version,
                        is_old: entry.is_old,
                    };
                    let updated = self.db.update_reference(entry.id, &update).await?;
                    existing.insert(key, updated);
                    summary.updated += 1;
                }
                None => {
                    let created = self
                        .db
                        .insert_reference(NewBiosReference {
                            vendor: infer_vendor(&model).to_string(),
                            model_name: model,
                            latest_version: version,
                        })
                        .await?;
                    existing.insert(key, created);
                    summary.inserted += 1;
                }
            }
        }

        info!(inserted = summary.inserted, updated = summary.updated, "Synced database with JSON mirror");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (ReferenceStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::in_memory().await.unwrap();
        let mirror = JsonMirror::new(dir.path().join("bios_versions.json"));
        (ReferenceStore::new(db, mirror), dir)
    }

    #[tokio::test]
    async fn test_add_manual_prepends_vendor_and_mirrors() {
        let (store, _dir) = store().await;

        let created = store.add_manual("Dell", "Latitude 5420", " 1.20 ").await.unwrap();
        assert_eq!(created.model_name, "Dell Latitude 5420");
        assert_eq!(created.vendor, "Dell");
        assert_eq!(created.latest_version, "1.20");

        let mirror = store.mirror().load();
        assert_eq!(mirror.get("Dell Latitude 5420").map(String::as_str), Some("1.20"));
    }

    #[tokio::test]
    async fn test_add_manual_rejects_case_insensitive_duplicate() {
        let (store, _dir) = store().await;
        store.add_manual("HP", "EliteBook 840 G8", "01.10").await.unwrap();

        let err = store.add_manual("Other", "hp elitebook 840 g8", "01.12").await.unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate(_)));
        assert_eq!(store.mirror().load().len(), 1);
    }

    #[tokio::test]
    async fn test_add_manual_requires_model_and_version() {
        let (store, _dir) = store().await;
        assert!(matches!(
            store.add_manual("Dell", "  ", "1.0").await,
            Err(DatabaseError::InvalidInput(_))
        ));
        assert!(matches!(
            store.add_manual("Dell", "Latitude 5420", "").await,
            Err(DatabaseError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_edit_updates_both_stores() {
        let (store, _dir) = store().await;
        let created = store.add_manual("Lenovo", "ThinkPad T14 Gen 2", "1.38").await.unwrap();

        let updated = store.edit(created.id, "1.40", true).await.unwrap();
        assert_eq!(updated.latest_version, "1.40");
        assert!(updated.is_old);
        assert_eq!(
            store.mirror().load().get("Lenovo ThinkPad T14 Gen 2").map(String::as_str),
            Some("1.40")
        );

        assert!(matches!(
            store.edit(created.id, " ", false).await,
            Err(DatabaseError::InvalidInput(_))
        ));
        assert!(matches!(
            store.edit(9999, "1.0", false).await,
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_from_both_stores() {
        let (store, _dir) = store().await;
        let created = store.add_manual("Dell", "Latitude 7420", "1.30").await.unwrap();

        store.delete(created.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.mirror().load().is_empty());
        assert!(matches!(store.delete(created.id).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_import_counts_only_changes() {
        let (store, _dir) = store().await;
        store.add_manual("Dell", "Latitude 5420", "1.20").await.unwrap();

        let mut incoming = VersionMap::new();
        incoming.insert("Dell Latitude 5420".to_string(), "1.20".to_string());
        incoming.insert("Dell Latitude 5430".to_string(), "1.15".to_string());
        incoming.insert("HP EliteBook 840 G8".to_string(), "01.12".to_string());

        assert_eq!(store.import(incoming.clone()).await.unwrap(), 2);
        assert_eq!(store.import(incoming).await.unwrap(), 0);

        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 3);
        let hp = entries.iter().find(|e| e.model_name == "HP EliteBook 840 G8").unwrap();
        assert_eq!(hp.vendor, "HP");
    }

    #[tokio::test]
    async fn test_sync_updates_differing_versions() {
        let (store, _dir) = store().await;
        let created = store.add_manual("Dell", "Latitude 5420", "1.20").await.unwrap();
        store.edit(created.id, "1.20", true).await.unwrap();

        let mut data = store.mirror().load();
        data.insert("Dell Latitude 5420".to_string(), "1.25".to_string());
        data.insert("Fujitsu Lifebook U7411".to_string(), "2.17".to_string());
        store.mirror().save(&data).unwrap();

        let summary = store.sync().await.unwrap();
        assert_eq!(summary, SyncSummary { inserted: 1, updated: 1 });

        let entry = store.db().get_reference(created.id).await.unwrap();
        assert_eq!(entry.latest_version, "1.25");
        assert!(entry.is_old);

        let fujitsu = store
            .db()
            .find_by_name_case_insensitive("fujitsu lifebook u7411")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fujitsu.vendor, VENDOR_OTHER);
    }

    #[tokio::test]
    async fn test_sync_matches_case_insensitively() {
        let (store, _dir) = store().await;
        let created = store.add_manual("Dell", "Latitude 5420", "1.20").await.unwrap();

        let mut data = store.mirror().load();
        data.insert("dell latitude 5420".to_string(), "1.21".to_string());
        store.mirror().save(&data).unwrap();

        // "Dell Latitude 5420" sorts first and already matches, the lowercase twin is ignored
        for _ in 0..2 {
            assert_eq!(store.sync().await.unwrap(), SyncSummary::default());
        }

        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        let entry = store.db().get_reference(created.id).await.unwrap();
        assert_eq!(entry.latest_version, "1.20");
        assert_eq!(entry.last_checked, created.last_checked);
    }
}
