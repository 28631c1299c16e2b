//! Repository for the `texttraining`, `numbertraining` and `imagetraining`
//! tables.
//!
//! The three tables share a shape (`id, projectid, <data>, label`) plus a
//! `seq` column recording insertion order, so every query here is built
//! from the [`TrainingTable`] of the requested project type.

use std::collections::BTreeMap;

use mlkids_core::training::{ImageTraining, NumberTrainingRow, TextTraining, TrainingRow};
use mlkids_core::types::{Paging, ProjectType};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

// ---------------------------------------------------------------------------
// Table metadata
// ---------------------------------------------------------------------------

/// Table and payload column holding one project type's training rows.
#[derive(Debug, Clone, Copy)]
pub struct TrainingTable {
    pub table: &'static str,
    pub data_column: &'static str,
}

impl TrainingTable {
    pub fn for_kind(kind: ProjectType) -> Self {
        match kind {
            ProjectType::Text => Self {
                table: "texttraining",
                data_column: "textdata",
            },
            ProjectType::Numbers => Self {
                table: "numbertraining",
                data_column: "numberdata",
            },
            ProjectType::Images => Self {
                table: "imagetraining",
                data_column: "imageurl",
            },
        }
    }
}

/// Column-wise arrays for one UNNEST batch insert.
#[derive(Debug, Default)]
struct TrainingColumns {
    ids: Vec<String>,
    projectids: Vec<String>,
    data: Vec<String>,
    labels: Vec<Option<String>>,
}

impl TrainingColumns {
    fn push(&mut self, id: &str, projectid: &str, data: &str, label: Option<&str>) {
        self.ids.push(id.to_string());
        self.projectids.push(projectid.to_string());
        self.data.push(data.to_string());
        self.labels.push(label.map(str::to_string));
    }

    fn push_row(&mut self, row: &TrainingRow) {
        match row {
            TrainingRow::Text(t) => self.push(&t.id, &t.projectid, &t.textdata, t.label.as_deref()),
            TrainingRow::Numbers(t) => {
                self.push(&t.id, &t.projectid, &t.numberdata, t.label.as_deref())
            }
            TrainingRow::Images(t) => {
                self.push(&t.id, &t.projectid, &t.imageurl, t.label.as_deref())
            }
        }
    }
}

/// Provides batch writes, paged reads and label maintenance for training rows.
pub struct TrainingRepo;

impl TrainingRepo {
    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert all rows in one transaction, one UNNEST statement per table.
    pub async fn insert_batch(pool: &PgPool, rows: &[TrainingRow]) -> Result<(), sqlx::Error> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = pool.begin().await?;
        for kind in [ProjectType::Text, ProjectType::Numbers, ProjectType::Images] {
            let mut columns = TrainingColumns::default();
            for row in rows.iter().filter(|r| r.kind() == kind) {
                columns.push_row(row);
            }
            if !columns.ids.is_empty() {
                Self::insert_columns(&mut tx, TrainingTable::for_kind(kind), columns).await?;
            }
        }
        tx.commit().await
    }

    async fn insert_columns(
        tx: &mut Transaction<'_, Postgres>,
        table: TrainingTable,
        columns: TrainingColumns,
    ) -> Result<(), sqlx::Error> {
        let TrainingTable { table, data_column } = table;
        // ORDER BY ord keeps `seq` in slice order.
        let query = format!(
            "INSERT INTO {table} (id, projectid, {data_column}, label) \
             SELECT id, projectid, data, label \
             FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[]) \
                 WITH ORDINALITY AS batch(id, projectid, data, label, ord) \
             ORDER BY ord"
        );
        sqlx::query(&query)
            .bind(&columns.ids)
            .bind(&columns.projectids)
            .bind(&columns.data)
            .bind(&columns.labels)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Relabel every matching row with a single UPDATE statement.
    pub async fn rename_label(
        pool: &PgPool,
        kind: ProjectType,
        projectid: &str,
        before: &str,
        after: &str,
    ) -> Result<u64, sqlx::Error> {
        let TrainingTable { table, .. } = TrainingTable::for_kind(kind);
        let query = format!("UPDATE {table} SET label = $3 WHERE projectid = $1 AND label = $2");
        let result = sqlx::query(&query)
            .bind(projectid)
            .bind(before)
            .bind(after)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(
        pool: &PgPool,
        kind: ProjectType,
        projectid: &str,
        id: &str,
    ) -> Result<u64, sqlx::Error> {
        let TrainingTable { table, .. } = TrainingTable::for_kind(kind);
        let query = format!("DELETE FROM {table} WHERE projectid = $1 AND id = $2");
        let result = sqlx::query(&query)
            .bind(projectid)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_project(
        pool: &PgPool,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<u64, sqlx::Error> {
        let TrainingTable { table, .. } = TrainingTable::for_kind(kind);
        let query = format!("DELETE FROM {table} WHERE projectid = $1");
        let result = sqlx::query(&query).bind(projectid).execute(pool).await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Paged rows in insertion order, optionally filtered to one label.
    pub async fn list(
        pool: &PgPool,
        kind: ProjectType,
        projectid: &str,
        label: Option<&str>,
        paging: Paging,
    ) -> Result<Vec<TrainingRow>, sqlx::Error> {
        match kind {
            ProjectType::Text => Self::list_as::<TextTraining>(pool, kind, projectid, label, paging)
                .await
                .map(|rows| rows.into_iter().map(TrainingRow::Text).collect()),
            ProjectType::Numbers => {
                Self::list_as::<NumberTrainingRow>(pool, kind, projectid, label, paging)
                    .await
                    .map(|rows| rows.into_iter().map(TrainingRow::Numbers).collect())
            }
            ProjectType::Images => {
                Self::list_as::<ImageTraining>(pool, kind, projectid, label, paging)
                    .await
                    .map(|rows| rows.into_iter().map(TrainingRow::Images).collect())
            }
        }
    }

    async fn list_as<T>(
        pool: &PgPool,
        kind: ProjectType,
        projectid: &str,
        label: Option<&str>,
        paging: Paging,
    ) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let TrainingTable { table, data_column } = TrainingTable::for_kind(kind);
        let query = format!(
            "SELECT id, projectid, {data_column}, label FROM {table} \
             WHERE projectid = $1 AND ($2::TEXT IS NULL OR label = $2) \
             ORDER BY seq \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, T>(&query)
            .bind(projectid)
            .bind(label)
            .bind(paging.limit)
            .bind(paging.start)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<i64, sqlx::Error> {
        let TrainingTable { table, .. } = TrainingTable::for_kind(kind);
        let query = format!("SELECT COUNT(*) FROM {table} WHERE projectid = $1");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(projectid)
            .fetch_one(pool)
            .await
    }

    pub async fn count_by_label(
        pool: &PgPool,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<BTreeMap<String, i64>, sqlx::Error> {
        let TrainingTable { table, .. } = TrainingTable::for_kind(kind);
        let query = format!(
            "SELECT label, COUNT(*) FROM {table} \
             WHERE projectid = $1 AND label IS NOT NULL \
             GROUP BY label"
        );
        let rows = sqlx::query_as::<_, (String, i64)>(&query)
            .bind(projectid)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn list_labels(
        pool: &PgPool,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let TrainingTable { table, .. } = TrainingTable::for_kind(kind);
        let query = format!(
            "SELECT DISTINCT label FROM {table} \
             WHERE projectid = $1 AND label IS NOT NULL \
             ORDER BY label"
        );
        sqlx::query_scalar::<_, String>(&query)
            .bind(projectid)
            .fetch_all(pool)
            .await
    }
}
