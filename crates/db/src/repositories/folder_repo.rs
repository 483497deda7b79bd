//! Repository for the `folders` table.

use campo_core::types::DbId;
use sqlx::PgPool;

use crate::models::folder::{CreateFolder, Folder};
use crate::models::inspection::Inspection;
use crate::repositories::inspection_repo::COLUMNS as INSPECTION_COLUMNS;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at";

/// Outcome of a cascading folder delete.
#[derive(Debug)]
pub struct DeletedFolder {
    pub folder: Folder,
    /// Inspections removed along with the folder, so callers can clean up
    /// their photo files.
    pub inspections: Vec<Inspection>,
}

/// Provides CRUD operations for folders.
pub struct FolderRepo;

impl FolderRepo {
    /// Insert a new folder, returning the created row.
    ///
    /// A duplicate name fails with a `uq_folders_name` violation.
    pub async fn create(pool: &PgPool, input: &CreateFolder) -> Result<Folder, sqlx::Error> {
        let query = format!("INSERT INTO folders (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Folder>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a folder by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Folder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM folders WHERE id = $1");
        sqlx::query_as::<_, Folder>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a folder by exact name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Folder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM folders WHERE name = $1");
        sqlx::query_as::<_, Folder>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all folders in creation order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Folder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM folders ORDER BY id");
        sqlx::query_as::<_, Folder>(&query).fetch_all(pool).await
    }

    /// Delete a folder and every inspection in it.
    ///
    /// Children go first, then the parent, in one transaction. Returns
    /// `None` (and deletes nothing) if the folder does not exist.
    pub async fn delete_with_inspections(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DeletedFolder>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let inspections_query = format!(
            "DELETE FROM inspections WHERE folder_id = $1 RETURNING {INSPECTION_COLUMNS}"
        );
        let inspections = sqlx::query_as::<_, Inspection>(&inspections_query)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        let folder_query = format!("DELETE FROM folders WHERE id = $1 RETURNING {COLUMNS}");
        let folder = sqlx::query_as::<_, Folder>(&folder_query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(folder) = folder else {
            tx.rollback().await?;
            return Ok(None);
        };

        tx.commit().await?;
        Ok(Some(DeletedFolder {
            folder,
            inspections,
        }))
    }
}
