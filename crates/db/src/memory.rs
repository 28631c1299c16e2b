//! In-process backend.
//!
//! All tables sit behind one [`RwLock`], and every write is performed
//! under a single write-guard, so a batch insert or label rename is
//! observed by readers either completely or not at all. Rows are kept in
//! insertion order, which gives the same ordering as the `seq` column of
//! the PostgreSQL tables.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use mlkids_core::credentials::BluemixCredentialsRow;
use mlkids_core::project::ProjectRow;
use mlkids_core::tenant::ClassRow;
use mlkids_core::training::{ImageTraining, NumberTrainingRow, TextTraining, TrainingRow};
use mlkids_core::types::{Paging, ProjectType};
use mlkids_core::CoreError;
use tokio::sync::RwLock;

use crate::backend::{CredentialsBackend, ProjectBackend, TenantBackend, TrainingBackend};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Tables {
    training: Vec<TrainingRow>,
    projects: Vec<ProjectRow>,
    tenants: BTreeMap<String, ClassRow>,
    credentials: Vec<BluemixCredentialsRow>,
}

impl Tables {
    fn training_for<'a>(
        &'a self,
        kind: ProjectType,
        projectid: &'a str,
    ) -> impl Iterator<Item = &'a TrainingRow> + 'a {
        self.training
            .iter()
            .filter(move |r| r.kind() == kind && r.projectid() == projectid)
    }
}

/// A copy of `row` carrying `label`.
fn relabelled(row: &TrainingRow, label: &str) -> TrainingRow {
    let label = Some(label.to_string());
    match row {
        TrainingRow::Text(t) => TrainingRow::Text(TextTraining { label, ..t.clone() }),
        TrainingRow::Numbers(t) => TrainingRow::Numbers(NumberTrainingRow { label, ..t.clone() }),
        TrainingRow::Images(t) => TrainingRow::Images(ImageTraining { label, ..t.clone() }),
    }
}

/// Backend holding every table in memory. Useful for tests and for
/// running the stores without a database.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrainingBackend for MemoryBackend {
    async fn insert_training(&self, rows: &[TrainingRow]) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        // Reject the whole batch before touching the table.
        let mut seen: HashSet<(ProjectType, &str)> = tables
            .training
            .iter()
            .map(|r| (r.kind(), r.id()))
            .collect();
        for row in rows {
            if !seen.insert((row.kind(), row.id())) {
                return Err(StoreError::Conflict(format!(
                    "duplicate {} training id {}",
                    row.kind(),
                    row.id()
                )));
            }
        }
        drop(seen);

        tables.training.extend_from_slice(rows);
        Ok(())
    }

    async fn select_training(
        &self,
        kind: ProjectType,
        projectid: &str,
        label: Option<&str>,
        paging: Paging,
    ) -> Result<Vec<TrainingRow>, StoreError> {
        let paging = paging.normalized();
        let tables = self.tables.read().await;
        Ok(tables
            .training_for(kind, projectid)
            .filter(|r| label.map_or(true, |l| r.label() == Some(l)))
            .skip(paging.start as usize)
            .take(paging.limit as usize)
            .cloned()
            .collect())
    }

    async fn count_training(&self, kind: ProjectType, projectid: &str) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.training_for(kind, projectid).count() as i64)
    }

    async fn count_training_by_label(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<BTreeMap<String, i64>, StoreError> {
        let tables = self.tables.read().await;
        let mut counts = BTreeMap::new();
        for label in tables.training_for(kind, projectid).filter_map(TrainingRow::label) {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn select_training_labels(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self
            .count_training_by_label(kind, projectid)
            .await?
            .into_keys()
            .collect())
    }

    async fn rename_training_label(
        &self,
        kind: ProjectType,
        projectid: &str,
        before: &str,
        after: &str,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let mut renamed = 0;
        for row in tables.training.iter_mut().filter(|r| {
            r.kind() == kind && r.projectid() == projectid && r.label() == Some(before)
        }) {
            *row = relabelled(row, after);
            renamed += 1;
        }
        Ok(renamed)
    }

    async fn delete_training(
        &self,
        kind: ProjectType,
        projectid: &str,
        id: &str,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.training.len();
        tables
            .training
            .retain(|r| !(r.kind() == kind && r.projectid() == projectid && r.id() == id));
        Ok((before - tables.training.len()) as u64)
    }

    async fn delete_training_by_project(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.training.len();
        tables
            .training
            .retain(|r| !(r.kind() == kind && r.projectid() == projectid));
        Ok((before - tables.training.len()) as u64)
    }
}

#[async_trait]
impl ProjectBackend for MemoryBackend {
    async fn insert_project(&self, row: &ProjectRow) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.projects.iter().any(|p| p.id == row.id) {
            return Err(StoreError::Conflict(format!("duplicate project id {}", row.id)));
        }
        tables.projects.push(row.clone());
        Ok(())
    }

    async fn select_project(&self, id: &str) -> Result<Option<ProjectRow>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn select_projects_by_user(
        &self,
        classid: &str,
        userid: &str,
    ) -> Result<Vec<ProjectRow>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .filter(|p| p.classid == classid && p.userid == userid)
            .cloned()
            .collect())
    }

    async fn count_projects_by_user(&self, classid: &str, userid: &str) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .filter(|p| p.classid == classid && p.userid == userid)
            .count() as i64)
    }

    async fn edit_project_labels(
        &self,
        id: &str,
        edit: &(dyn for<'a> Fn(&'a str) -> Result<String, CoreError> + Send + Sync),
    ) -> Result<Option<String>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        let labels = edit(&project.labels)?;
        project.labels = labels.clone();
        Ok(Some(labels))
    }

    async fn delete_project(&self, id: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        tables.training.retain(|r| r.projectid() != id);
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        Ok((before - tables.projects.len()) as u64)
    }
}

#[async_trait]
impl TenantBackend for MemoryBackend {
    async fn select_tenant(&self, classid: &str) -> Result<Option<ClassRow>, StoreError> {
        Ok(self.tables.read().await.tenants.get(classid).cloned())
    }

    async fn upsert_tenant(&self, row: &ClassRow) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .tenants
            .insert(row.id.clone(), row.clone());
        Ok(())
    }

    async fn delete_tenant(&self, classid: &str) -> Result<u64, StoreError> {
        let removed = self.tables.write().await.tenants.remove(classid);
        Ok(u64::from(removed.is_some()))
    }
}

#[async_trait]
impl CredentialsBackend for MemoryBackend {
    async fn insert_credentials(&self, row: &BluemixCredentialsRow) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.credentials.iter().any(|c| c.id == row.id) {
            return Err(StoreError::Conflict(format!(
                "duplicate credentials id {}",
                row.id
            )));
        }
        tables.credentials.push(row.clone());
        Ok(())
    }

    async fn select_credentials(
        &self,
        classid: &str,
        servicetype: &str,
    ) -> Result<Vec<BluemixCredentialsRow>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .credentials
            .iter()
            .filter(|c| c.classid == classid && c.servicetype == servicetype)
            .cloned()
            .collect())
    }

    async fn delete_credentials(&self, id: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.credentials.len();
        tables.credentials.retain(|c| c.id != id);
        Ok((before - tables.credentials.len()) as u64)
    }
}
