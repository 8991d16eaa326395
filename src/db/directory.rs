//! Directory records for imgstation.
//!
//! A directory record registers a filesystem path under an owning user.
//! Records are bookkeeping only; they are independent from upload batches.

use sqlx::SqlitePool;

use crate::{Result, StationError};

/// A directory registered by a user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DirectoryRecord {
    /// Unique record ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Absolute filesystem path (unique).
    pub path: String,
    /// Owning user ID.
    pub user_id: i64,
    /// Owning user's name.
    pub username: String,
    /// When the record was created.
    pub created_at: String,
    /// When the record was last modified.
    pub updated_at: String,
}

/// Data for creating a new directory record.
#[derive(Debug, Clone)]
pub struct NewDirectoryRecord {
    /// Display name.
    pub name: String,
    /// Absolute filesystem path.
    pub path: String,
    /// Owning user ID.
    pub user_id: i64,
}

impl NewDirectoryRecord {
    /// Create a new directory record for the given owner.
    pub fn new(name: impl Into<String>, path: impl Into<String>, user_id: i64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            user_id,
        }
    }
}

const SELECT_RECORD: &str = "SELECT d.id, d.name, d.path, d.user_id, u.username,
        d.created_at, d.updated_at
 FROM directories d
 JOIN users u ON u.id = d.user_id";

/// Repository for directory record operations.
pub struct DirectoryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DirectoryRepository<'a> {
    /// Create a new DirectoryRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new directory record.
    ///
    /// A path that is already registered yields [`StationError::Conflict`].
    pub async fn create(&self, record: &NewDirectoryRecord) -> Result<DirectoryRecord> {
        let result = sqlx::query("INSERT INTO directories (name, path, user_id) VALUES (?, ?, ?)")
            .bind(&record.name)
            .bind(&record.path)
            .bind(record.user_id)
            .execute(self.pool)
            .await
            .map_err(|e| match StationError::from(e) {
                StationError::Conflict(_) => {
                    StationError::Conflict(format!("directory path {}", record.path))
                }
                other => other,
            })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| StationError::NotFound("directory".to_string()))
    }

    /// Get a record by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<DirectoryRecord>> {
        let record = sqlx::query_as::<_, DirectoryRecord>(&format!("{SELECT_RECORD} WHERE d.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StationError::Database(e.to_string()))?;
        Ok(record)
    }

    /// Get a record by its path.
    pub async fn get_by_path(&self, path: &str) -> Result<Option<DirectoryRecord>> {
        let record =
            sqlx::query_as::<_, DirectoryRecord>(&format!("{SELECT_RECORD} WHERE d.path = ?"))
                .bind(path)
                .fetch_optional(self.pool)
                .await
                .map_err(|e| StationError::Database(e.to_string()))?;
        Ok(record)
    }

    /// List every record ordered by ID.
    pub async fn list_all(&self) -> Result<Vec<DirectoryRecord>> {
        let records = sqlx::query_as::<_, DirectoryRecord>(&format!("{SELECT_RECORD} ORDER BY d.id"))
            .fetch_all(self.pool)
            .await
            .map_err(|e| StationError::Database(e.to_string()))?;
        Ok(records)
    }

    /// List the records owned by a user ordered by ID.
    pub async fn list_by_owner(&self, user_id: i64) -> Result<Vec<DirectoryRecord>> {
        let records = sqlx::query_as::<_, DirectoryRecord>(&format!(
            "{SELECT_RECORD} WHERE d.user_id = ? ORDER BY d.id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| StationError::Database(e.to_string()))?;
        Ok(records)
    }

    /// Delete a record by ID.
    ///
    /// Returns true if a record was deleted, false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM directories WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StationError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
