//! SQL-backed resource reference lookup.
//!
//! The host records a picked file's origin across four tables; this module
//! joins them to recover the repository type and remote identifier for one
//! context. The host application owns the schema and supplies the pool.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::existence::{PersistenceError, PersistenceReader, REPOSITORY_TYPE, ResourceReference};

/// Component owning the referenced files.
const FILE_COMPONENT: &str = "mod_resource";

/// File area the referenced files live in.
const FILE_AREA: &str = "content";

const REFERENCE_QUERY: &str = "\
    SELECT r.type, f.source \
    FROM files f \
    INNER JOIN files_reference fr ON fr.id = f.referencefileid \
    INNER JOIN repository_instances ri ON fr.repositoryid = ri.id \
    INNER JOIN repository r ON r.id = ri.typeid \
    WHERE f.contextid = ? AND r.type = ? AND f.component = ? AND f.filearea = ?";

/// [`PersistenceReader`] over the host's relational store.
#[derive(Debug, Clone)]
pub struct SqlResourceLookup {
    pool: SqlitePool,
}

impl SqlResourceLookup {
    /// Wraps the pool the host application hands out.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceReader for SqlResourceLookup {
    async fn find_reference(
        &self,
        context_id: i64,
    ) -> Result<Option<ResourceReference>, PersistenceError> {
        let row: Option<(String, String)> = sqlx::query_as(REFERENCE_QUERY)
            .bind(context_id)
            .bind(REPOSITORY_TYPE)
            .bind(FILE_COMPONENT)
            .bind(FILE_AREA)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(repository_type, source)| ResourceReference {
            repository_type,
            source,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Builds an in-memory database carrying the host's reference tables.
    async fn host_schema() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        for statement in [
            "CREATE TABLE files (
                id INTEGER PRIMARY KEY,
                contextid INTEGER NOT NULL,
                component TEXT NOT NULL,
                filearea TEXT NOT NULL,
                source TEXT,
                referencefileid INTEGER
            )",
            "CREATE TABLE files_reference (id INTEGER PRIMARY KEY, repositoryid INTEGER NOT NULL)",
            "CREATE TABLE repository_instances (id INTEGER PRIMARY KEY, typeid INTEGER NOT NULL)",
            "CREATE TABLE repository (id INTEGER PRIMARY KEY, type TEXT NOT NULL)",
        ] {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }
        pool
    }

    async fn link_resource(pool: &SqlitePool, context_id: i64, repo_type: &str, source: &str) {
        sqlx::query("INSERT INTO repository (id, type) VALUES (1, ?)")
            .bind(repo_type)
            .execute(pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO repository_instances (id, typeid) VALUES (1, 1)")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO files_reference (id, repositoryid) VALUES (1, 1)")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO files (contextid, component, filearea, source, referencefileid) \
             VALUES (?, 'mod_resource', 'content', ?, 1)",
        )
        .bind(context_id)
        .bind(source)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_lookup_finds_linked_resource() {
        let pool = host_schema().await;
        link_resource(&pool, 17, "pod", "41").await;

        let lookup = SqlResourceLookup::new(pool);
        let reference = lookup.find_reference(17).await.unwrap().unwrap();
        assert_eq!(reference.repository_type, "pod");
        assert_eq!(reference.source, "41");
    }

    #[tokio::test]
    async fn test_lookup_without_linkage_returns_none() {
        let pool = host_schema().await;
        let lookup = SqlResourceLookup::new(pool);
        assert!(lookup.find_reference(17).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_filters_foreign_repository_types() {
        let pool = host_schema().await;
        link_resource(&pool, 17, "dropbox", "41").await;

        let lookup = SqlResourceLookup::new(pool);
        assert!(lookup.find_reference(17).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_filters_other_contexts() {
        let pool = host_schema().await;
        link_resource(&pool, 17, "pod", "41").await;

        let lookup = SqlResourceLookup::new(pool);
        assert!(lookup.find_reference(99).await.unwrap().is_none());
    }
}
