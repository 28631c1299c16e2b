//! Repository for the `bluemixcredentials` table.

use mlkids_core::credentials::BluemixCredentialsRow;
use sqlx::PgPool;

const COLUMNS: &str = "id, classid, servicetype, url, username, password";

/// Provides CRUD operations for service credentials.
pub struct CredentialsRepo;

impl CredentialsRepo {
    pub async fn create(pool: &PgPool, row: &BluemixCredentialsRow) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO bluemixcredentials (id, classid, servicetype, url, username, password) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&row.id)
        .bind(&row.classid)
        .bind(&row.servicetype)
        .bind(&row.url)
        .bind(&row.username)
        .bind(&row.password)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// List a class's credentials for one service, oldest first.
    pub async fn list_by_class(
        pool: &PgPool,
        classid: &str,
        servicetype: &str,
    ) -> Result<Vec<BluemixCredentialsRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bluemixcredentials \
             WHERE classid = $1 AND servicetype = $2 \
             ORDER BY seq"
        );
        sqlx::query_as::<_, BluemixCredentialsRow>(&query)
            .bind(classid)
            .bind(servicetype)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bluemixcredentials WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
