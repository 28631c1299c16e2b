//! Persistence backend traits.
//!
//! The stores are generic over these so the same validation and logging
//! sit in front of PostgreSQL and the in-memory backend. Every write that
//! touches more than one row is a single atomic backend call: a batch
//! insert is all-or-nothing and a label rename is never observed half done.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mlkids_core::credentials::BluemixCredentialsRow;
use mlkids_core::project::ProjectRow;
use mlkids_core::tenant::ClassRow;
use mlkids_core::training::TrainingRow;
use mlkids_core::types::{Paging, ProjectType};
use mlkids_core::CoreError;

use crate::error::StoreError;

/// Training rows for all three project types, keyed by `kind`.
#[async_trait]
pub trait TrainingBackend: Send + Sync {
    /// Insert every row or none of them. Rows keep their slice order.
    async fn insert_training(&self, rows: &[TrainingRow]) -> Result<(), StoreError>;

    /// Rows for a project in insertion order, optionally restricted to one
    /// label, windowed by `paging`.
    async fn select_training(
        &self,
        kind: ProjectType,
        projectid: &str,
        label: Option<&str>,
        paging: Paging,
    ) -> Result<Vec<TrainingRow>, StoreError>;

    async fn count_training(&self, kind: ProjectType, projectid: &str) -> Result<i64, StoreError>;

    /// Row count per distinct label. Unlabelled rows are not counted.
    async fn count_training_by_label(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<BTreeMap<String, i64>, StoreError>;

    /// Distinct labels, sorted.
    async fn select_training_labels(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<Vec<String>, StoreError>;

    /// Relabel every `before` row of the project as `after` in one atomic
    /// update. Returns the number of rows changed.
    async fn rename_training_label(
        &self,
        kind: ProjectType,
        projectid: &str,
        before: &str,
        after: &str,
    ) -> Result<u64, StoreError>;

    async fn delete_training(
        &self,
        kind: ProjectType,
        projectid: &str,
        id: &str,
    ) -> Result<u64, StoreError>;

    async fn delete_training_by_project(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<u64, StoreError>;
}

/// Projects together with their numbers-project fields.
#[async_trait]
pub trait ProjectBackend: Send + Sync {
    /// Insert the project row and its field rows atomically.
    async fn insert_project(&self, row: &ProjectRow) -> Result<(), StoreError>;

    /// Load a project with its fields in creation order.
    async fn select_project(&self, id: &str) -> Result<Option<ProjectRow>, StoreError>;

    async fn select_projects_by_user(
        &self,
        classid: &str,
        userid: &str,
    ) -> Result<Vec<ProjectRow>, StoreError>;

    async fn count_projects_by_user(&self, classid: &str, userid: &str) -> Result<i64, StoreError>;

    /// Rewrite the project's `labels` column atomically: `edit` receives the
    /// stored list and returns its replacement, and no other label edit of
    /// the same project can interleave. Returns the new list, or `None` when
    /// the project does not exist.
    async fn edit_project_labels(
        &self,
        id: &str,
        edit: &(dyn for<'a> Fn(&'a str) -> Result<String, CoreError> + Send + Sync),
    ) -> Result<Option<String>, StoreError>;

    /// Remove the project, its fields and all of its training rows
    /// atomically. Returns the number of project rows removed.
    async fn delete_project(&self, id: &str) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait TenantBackend: Send + Sync {
    async fn select_tenant(&self, classid: &str) -> Result<Option<ClassRow>, StoreError>;

    /// Insert the row, or replace the policy of an existing class.
    async fn upsert_tenant(&self, row: &ClassRow) -> Result<(), StoreError>;

    async fn delete_tenant(&self, classid: &str) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait CredentialsBackend: Send + Sync {
    async fn insert_credentials(&self, row: &BluemixCredentialsRow) -> Result<(), StoreError>;

    async fn select_credentials(
        &self,
        classid: &str,
        servicetype: &str,
    ) -> Result<Vec<BluemixCredentialsRow>, StoreError>;

    async fn delete_credentials(&self, id: &str) -> Result<u64, StoreError>;
}
