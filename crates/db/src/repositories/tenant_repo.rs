//! Repository for the `tenants` table.

use mlkids_core::tenant::ClassRow;
use sqlx::PgPool;

const COLUMNS: &str = "id, projecttypes, ismanaged, maxusers, maxprojectsperuser, \
    textclassifiersexpiry, imageclassifiersexpiry";

/// Provides CRUD operations for class tenant policy rows.
pub struct TenantRepo;

impl TenantRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<ClassRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tenants WHERE id = $1");
        sqlx::query_as::<_, ClassRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a tenant, replacing the policy columns if it already exists.
    pub async fn upsert(pool: &PgPool, row: &ClassRow) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO tenants \
                (id, projecttypes, ismanaged, maxusers, maxprojectsperuser, \
                 textclassifiersexpiry, imageclassifiersexpiry) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
                 projecttypes = EXCLUDED.projecttypes, \
                 ismanaged = EXCLUDED.ismanaged, \
                 maxusers = EXCLUDED.maxusers, \
                 maxprojectsperuser = EXCLUDED.maxprojectsperuser, \
                 textclassifiersexpiry = EXCLUDED.textclassifiersexpiry, \
                 imageclassifiersexpiry = EXCLUDED.imageclassifiersexpiry",
        )
        .bind(&row.id)
        .bind(&row.projecttypes)
        .bind(row.ismanaged)
        .bind(row.maxusers)
        .bind(row.maxprojectsperuser)
        .bind(row.textclassifiersexpiry)
        .bind(row.imageclassifiersexpiry)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
