//! Repository for the `projects` and `numbersprojectsfields` tables.

use mlkids_core::project::{FieldRow, ProjectRow};
use mlkids_core::types::ProjectType;
use sqlx::{PgPool, Postgres, Transaction};

use super::training_repo::TrainingTable;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, userid, classid, typeid, name, language, labels, numfields";

const FIELD_COLUMNS: &str = "id, projectid, userid, classid, name, fieldtype, choices";

/// Provides CRUD operations for projects and their fields.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project and its fields in one transaction.
    pub async fn create(pool: &PgPool, row: &ProjectRow) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO projects (id, userid, classid, typeid, name, language, labels, numfields) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&row.id)
        .bind(&row.userid)
        .bind(&row.classid)
        .bind(row.typeid)
        .bind(&row.name)
        .bind(&row.language)
        .bind(&row.labels)
        .bind(row.numfields)
        .execute(&mut *tx)
        .await?;

        if !row.fields.is_empty() {
            let ids: Vec<&str> = row.fields.iter().map(|f| f.id.as_str()).collect();
            let names: Vec<&str> = row.fields.iter().map(|f| f.name.as_str()).collect();
            let types: Vec<i16> = row.fields.iter().map(|f| f.fieldtype).collect();
            let choices: Vec<Option<&str>> =
                row.fields.iter().map(|f| f.choices.as_deref()).collect();

            sqlx::query(
                "INSERT INTO numbersprojectsfields \
                    (id, projectid, userid, classid, name, fieldtype, choices) \
                 SELECT id, $5::text, $6::text, $7::text, name, fieldtype, choices \
                 FROM UNNEST($1::text[], $2::text[], $3::smallint[], $4::text[]) \
                     WITH ORDINALITY AS f(id, name, fieldtype, choices, ord) \
                 ORDER BY ord",
            )
            .bind(&ids)
            .bind(&names)
            .bind(&types)
            .bind(&choices)
            .bind(&row.id)
            .bind(&row.userid)
            .bind(&row.classid)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Find a project by ID, with its fields loaded.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        let project = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match project {
            Some(mut project) => {
                project.fields = Self::list_fields(pool, &[project.id.clone()]).await?;
                Ok(Some(project))
            }
            None => Ok(None),
        }
    }

    /// List a student's projects in creation order, with fields loaded.
    pub async fn list_by_user(
        pool: &PgPool,
        classid: &str,
        userid: &str,
    ) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE classid = $1 AND userid = $2 \
             ORDER BY seq"
        );
        let mut projects = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(classid)
            .bind(userid)
            .fetch_all(pool)
            .await?;

        let numbers_ids: Vec<String> = projects
            .iter()
            .filter(|p| p.typeid == ProjectType::Numbers.typeid())
            .map(|p| p.id.clone())
            .collect();
        if numbers_ids.is_empty() {
            return Ok(projects);
        }

        let fields = Self::list_fields(pool, &numbers_ids).await?;
        for project in &mut projects {
            project.fields = fields
                .iter()
                .filter(|f| f.projectid == project.id)
                .cloned()
                .collect();
        }
        Ok(projects)
    }

    async fn list_fields(pool: &PgPool, projectids: &[String]) -> Result<Vec<FieldRow>, sqlx::Error> {
        let query = format!(
            "SELECT {FIELD_COLUMNS} FROM numbersprojectsfields \
             WHERE projectid = ANY($1) \
             ORDER BY seq"
        );
        sqlx::query_as::<_, FieldRow>(&query)
            .bind(projectids)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_user(
        pool: &PgPool,
        classid: &str,
        userid: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM projects WHERE classid = $1 AND userid = $2",
        )
        .bind(classid)
        .bind(userid)
        .fetch_one(pool)
        .await
    }

    /// Read a project's label list and hold its row lock until `tx` ends.
    pub async fn lock_labels(
        tx: &mut Transaction<'_, Postgres>,
        id: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT labels FROM projects WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub async fn update_labels(
        tx: &mut Transaction<'_, Postgres>,
        id: &str,
        labels: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE projects SET labels = $2 WHERE id = $1")
            .bind(id)
            .bind(labels)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete a project with its fields and every training row that
    /// belongs to it, in one transaction.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        for kind in [ProjectType::Text, ProjectType::Numbers, ProjectType::Images] {
            let TrainingTable { table, .. } = TrainingTable::for_kind(kind);
            let query = format!("DELETE FROM {table} WHERE projectid = $1");
            sqlx::query(&query).bind(id).execute(&mut *tx).await?;
        }

        sqlx::query("DELETE FROM numbersprojectsfields WHERE projectid = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
