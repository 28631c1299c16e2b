//! PostgreSQL backend: the backend traits implemented for [`PgPool`] by
//! delegating to the repositories.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mlkids_core::credentials::BluemixCredentialsRow;
use mlkids_core::project::ProjectRow;
use mlkids_core::tenant::ClassRow;
use mlkids_core::training::TrainingRow;
use mlkids_core::types::{Paging, ProjectType};
use mlkids_core::CoreError;
use sqlx::PgPool;

use crate::backend::{CredentialsBackend, ProjectBackend, TenantBackend, TrainingBackend};
use crate::error::StoreError;
use crate::repositories::{CredentialsRepo, ProjectRepo, TenantRepo, TrainingRepo};

#[async_trait]
impl TrainingBackend for PgPool {
    async fn insert_training(&self, rows: &[TrainingRow]) -> Result<(), StoreError> {
        Ok(TrainingRepo::insert_batch(self, rows).await?)
    }

    async fn select_training(
        &self,
        kind: ProjectType,
        projectid: &str,
        label: Option<&str>,
        paging: Paging,
    ) -> Result<Vec<TrainingRow>, StoreError> {
        Ok(TrainingRepo::list(self, kind, projectid, label, paging).await?)
    }

    async fn count_training(&self, kind: ProjectType, projectid: &str) -> Result<i64, StoreError> {
        Ok(TrainingRepo::count(self, kind, projectid).await?)
    }

    async fn count_training_by_label(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<BTreeMap<String, i64>, StoreError> {
        Ok(TrainingRepo::count_by_label(self, kind, projectid).await?)
    }

    async fn select_training_labels(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<Vec<String>, StoreError> {
        Ok(TrainingRepo::list_labels(self, kind, projectid).await?)
    }

    async fn rename_training_label(
        &self,
        kind: ProjectType,
        projectid: &str,
        before: &str,
        after: &str,
    ) -> Result<u64, StoreError> {
        Ok(TrainingRepo::rename_label(self, kind, projectid, before, after).await?)
    }

    async fn delete_training(
        &self,
        kind: ProjectType,
        projectid: &str,
        id: &str,
    ) -> Result<u64, StoreError> {
        Ok(TrainingRepo::delete(self, kind, projectid, id).await?)
    }

    async fn delete_training_by_project(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<u64, StoreError> {
        Ok(TrainingRepo::delete_by_project(self, kind, projectid).await?)
    }
}

#[async_trait]
impl ProjectBackend for PgPool {
    async fn insert_project(&self, row: &ProjectRow) -> Result<(), StoreError> {
        Ok(ProjectRepo::create(self, row).await?)
    }

    async fn select_project(&self, id: &str) -> Result<Option<ProjectRow>, StoreError> {
        Ok(ProjectRepo::find_by_id(self, id).await?)
    }

    async fn select_projects_by_user(
        &self,
        classid: &str,
        userid: &str,
    ) -> Result<Vec<ProjectRow>, StoreError> {
        Ok(ProjectRepo::list_by_user(self, classid, userid).await?)
    }

    async fn count_projects_by_user(&self, classid: &str, userid: &str) -> Result<i64, StoreError> {
        Ok(ProjectRepo::count_by_user(self, classid, userid).await?)
    }

    async fn edit_project_labels(
        &self,
        id: &str,
        edit: &(dyn for<'a> Fn(&'a str) -> Result<String, CoreError> + Send + Sync),
    ) -> Result<Option<String>, StoreError> {
        let mut tx = self.begin().await?;
        let Some(current) = ProjectRepo::lock_labels(&mut tx, id).await? else {
            return Ok(None);
        };
        // An error here drops the transaction, releasing the row lock.
        let labels = edit(&current)?;
        ProjectRepo::update_labels(&mut tx, id, &labels).await?;
        tx.commit().await?;
        Ok(Some(labels))
    }

    async fn delete_project(&self, id: &str) -> Result<u64, StoreError> {
        Ok(ProjectRepo::delete(self, id).await?)
    }
}

#[async_trait]
impl TenantBackend for PgPool {
    async fn select_tenant(&self, classid: &str) -> Result<Option<ClassRow>, StoreError> {
        Ok(TenantRepo::find_by_id(self, classid).await?)
    }

    async fn upsert_tenant(&self, row: &ClassRow) -> Result<(), StoreError> {
        Ok(TenantRepo::upsert(self, row).await?)
    }

    async fn delete_tenant(&self, classid: &str) -> Result<u64, StoreError> {
        Ok(TenantRepo::delete(self, classid).await?)
    }
}

#[async_trait]
impl CredentialsBackend for PgPool {
    async fn insert_credentials(&self, row: &BluemixCredentialsRow) -> Result<(), StoreError> {
        Ok(CredentialsRepo::create(self, row).await?)
    }

    async fn select_credentials(
        &self,
        classid: &str,
        servicetype: &str,
    ) -> Result<Vec<BluemixCredentialsRow>, StoreError> {
        Ok(CredentialsRepo::list_by_class(self, classid, servicetype).await?)
    }

    async fn delete_credentials(&self, id: &str) -> Result<u64, StoreError> {
        Ok(CredentialsRepo::delete(self, id).await?)
    }
}
