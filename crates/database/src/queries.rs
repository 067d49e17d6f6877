//! Database query functions

use crate::models::*;
use crate::schema::Database;
use crate::{DatabaseError, Result};

const SELECT_REFERENCE: &str = "SELECT id, vendor, model_name, latest_version,
        datetime(last_checked) as last_checked, is_old
 FROM bios_references";

impl Database {
    // ==================== Reference Catalog ====================

    /// Get all catalog entries ordered by vendor and model
    pub async fn list_references(&self) -> Result<Vec<BiosReference>> {
        let rows = sqlx::query_as::<_, BiosReference>(&format!(
            "{} ORDER BY vendor, model_name",
            SELECT_REFERENCE
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Get the most recently checked entries
    pub async fn recent_references(&self, limit: i64) -> Result<Vec<BiosReference>> {
        let rows = sqlx::query_as::<_, BiosReference>(&format!(
            "{} ORDER BY last_checked DESC, id DESC LIMIT ?",
            SELECT_REFERENCE
        ))
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Get a catalog entry by ID
    pub async fn get_reference(&self, id: i64) -> Result<BiosReference> {
        sqlx::query_as::<_, BiosReference>(&format!("{} WHERE id = ?", SELECT_REFERENCE))
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Reference ID: {}", id)))
    }

    /// Find a catalog entry by model name, ignoring case
    pub async fn find_by_name_case_insensitive(&self, name: &str) -> Result<Option<BiosReference>> {
        let row = sqlx::query_as::<_, BiosReference>(&format!(
            "{} WHERE lower(model_name) = lower(?)",
            SELECT_REFERENCE
        ))
        .bind(name.trim())
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// Create a new catalog entry
    pub async fn insert_reference(&self, reference: NewBiosReference) -> Result<BiosReference> {
        let result = sqlx::query(
            "INSERT INTO bios_references (vendor, model_name, latest_version)
             VALUES (?, ?, ?)",
        )
        .bind(&reference.vendor)
        .bind(&reference.model_name)
        .bind(&reference.latest_version)
        .execute(self.pool())
        .await;

        let id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(DatabaseError::Duplicate(reference.model_name));
            }
            Err(e) => return Err(e.into()),
        };

        self.get_reference(id).await
    }

    /// Update the latest version and support flag of an entry
    pub async fn update_reference(&self, id: i64, update: &BiosReferenceUpdate) -> Result<BiosReference> {
        let affected = sqlx::query(
            "UPDATE bios_references
             SET latest_version = ?, is_old = ?, last_checked = datetime('now')
             WHERE id = ?",
        )
        .bind(&update.latest_version)
        .bind(update.is_old)
        .bind(id)
        .execute(self.pool())
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(DatabaseError::NotFound(format!("Reference ID: {}", id)));
        }

        self.get_reference(id).await
    }

    /// Delete a catalog entry
    pub async fn delete_reference(&self, id: i64) -> Result<()> {
        let affected = sqlx::query("DELETE FROM bios_references WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(DatabaseError::NotFound(format!("Reference ID: {}", id)));
        }

        Ok(())
    }
}
