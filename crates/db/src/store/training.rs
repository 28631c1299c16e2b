//! Training data store for text, numbers and images projects.
//!
//! Multi-row writes go to the backend as one call: a bulk insert is a
//! single batch and a label rename is a single update.

use std::collections::BTreeMap;
use std::sync::Arc;

use mlkids_core::project::Project;
use mlkids_core::training::{
    number_training_from_row, number_training_to_row, ImageTraining, NumberTraining, TextTraining,
    TrainingItem, TrainingRow,
};
use mlkids_core::types::{Paging, ProjectType};
use mlkids_core::{CoreError, ObjectFactory};

use crate::backend::TrainingBackend;
use crate::error::StoreError;

pub struct TrainingStore<B> {
    backend: Arc<B>,
    factory: ObjectFactory,
}

impl<B> Clone for TrainingStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            factory: self.factory.clone(),
        }
    }
}

impl<B: TrainingBackend> TrainingStore<B> {
    pub fn new(backend: Arc<B>, factory: ObjectFactory) -> Self {
        Self { backend, factory }
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    pub async fn store_text_training(
        &self,
        projectid: &str,
        data: &str,
        label: Option<&str>,
    ) -> Result<TextTraining, StoreError> {
        let training = self.factory.create_text_training(projectid, data, label)?;
        self.insert(projectid, vec![TrainingRow::Text(training.clone())])
            .await?;
        Ok(training)
    }

    /// Validate every item, then insert them all in one batch. Nothing is
    /// written if any item is invalid.
    pub async fn bulk_store_text_training(
        &self,
        projectid: &str,
        items: &[TrainingItem<String>],
    ) -> Result<Vec<TextTraining>, StoreError> {
        let trainings = items
            .iter()
            .map(|item| {
                self.factory
                    .create_text_training(projectid, &item.data, item.label.as_deref())
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.insert(
            projectid,
            trainings.iter().cloned().map(TrainingRow::Text).collect(),
        )
        .await?;
        Ok(trainings)
    }

    /// Rows in insertion order within the `[start, start + limit)` window.
    pub async fn get_text_training(
        &self,
        projectid: &str,
        paging: Paging,
    ) -> Result<Vec<TextTraining>, StoreError> {
        let rows = self
            .select(ProjectType::Text, projectid, None, paging)
            .await?;
        Ok(rows.into_iter().map(into_text).collect::<Result<_, _>>()?)
    }

    pub async fn get_text_training_by_label(
        &self,
        projectid: &str,
        label: &str,
        paging: Paging,
    ) -> Result<Vec<TextTraining>, StoreError> {
        let rows = self
            .select(ProjectType::Text, projectid, Some(label), paging)
            .await?;
        Ok(rows.into_iter().map(into_text).collect::<Result<_, _>>()?)
    }

    pub async fn count_text_training(&self, projectid: &str) -> Result<i64, StoreError> {
        self.count(ProjectType::Text, projectid).await
    }

    pub async fn count_text_training_by_label(
        &self,
        projectid: &str,
    ) -> Result<BTreeMap<String, i64>, StoreError> {
        self.count_by_label(ProjectType::Text, projectid).await
    }

    /// Relabel every `before` row of the project as `after`. Readers see
    /// either none or all of the rows renamed.
    pub async fn rename_text_training_label(
        &self,
        projectid: &str,
        before: &str,
        after: &str,
    ) -> Result<u64, StoreError> {
        let renamed = self
            .backend
            .rename_training_label(ProjectType::Text, projectid, before, after)
            .await?;
        if renamed == 0 {
            tracing::warn!(project_id = %projectid, before, after, "No training rows to relabel");
        } else {
            tracing::info!(project_id = %projectid, before, after, rows = renamed, "Training label renamed");
        }
        Ok(renamed)
    }

    pub async fn delete_text_training(&self, projectid: &str, id: &str) -> Result<u64, StoreError> {
        self.delete_one(ProjectType::Text, projectid, id).await
    }

    /// Remove all text rows of a project. Succeeds when there are none.
    pub async fn delete_text_training_by_project_id(
        &self,
        projectid: &str,
    ) -> Result<u64, StoreError> {
        self.delete_by_project(ProjectType::Text, projectid).await
    }

    // -----------------------------------------------------------------------
    // Numbers
    // -----------------------------------------------------------------------

    pub async fn store_number_training(
        &self,
        projectid: &str,
        data: &[f64],
        label: Option<&str>,
    ) -> Result<NumberTraining, StoreError> {
        let training = self.factory.create_number_training(projectid, data, label)?;
        self.insert_numbers(projectid, std::slice::from_ref(&training))
            .await?;
        Ok(training)
    }

    /// Like [`store_number_training`](Self::store_number_training), but
    /// also checks the values against the project's fields.
    pub async fn store_number_training_for(
        &self,
        project: &Project,
        data: &[f64],
        label: Option<&str>,
    ) -> Result<NumberTraining, StoreError> {
        let training = self
            .factory
            .create_number_training_for(project, data, label)?;
        self.insert_numbers(&project.id, std::slice::from_ref(&training))
            .await?;
        Ok(training)
    }

    pub async fn bulk_store_number_training(
        &self,
        projectid: &str,
        items: &[TrainingItem<Vec<f64>>],
    ) -> Result<Vec<NumberTraining>, StoreError> {
        let trainings = items
            .iter()
            .map(|item| {
                self.factory
                    .create_number_training(projectid, &item.data, item.label.as_deref())
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.insert_numbers(projectid, &trainings).await?;
        Ok(trainings)
    }

    pub async fn get_number_training(
        &self,
        projectid: &str,
        paging: Paging,
    ) -> Result<Vec<NumberTraining>, StoreError> {
        let rows = self
            .select(ProjectType::Numbers, projectid, None, paging)
            .await?;
        Ok(rows.into_iter().map(into_numbers).collect::<Result<_, _>>()?)
    }

    pub async fn get_number_training_by_label(
        &self,
        projectid: &str,
        label: &str,
        paging: Paging,
    ) -> Result<Vec<NumberTraining>, StoreError> {
        let rows = self
            .select(ProjectType::Numbers, projectid, Some(label), paging)
            .await?;
        Ok(rows.into_iter().map(into_numbers).collect::<Result<_, _>>()?)
    }

    pub async fn count_number_training(&self, projectid: &str) -> Result<i64, StoreError> {
        self.count(ProjectType::Numbers, projectid).await
    }

    pub async fn count_number_training_by_label(
        &self,
        projectid: &str,
    ) -> Result<BTreeMap<String, i64>, StoreError> {
        self.count_by_label(ProjectType::Numbers, projectid).await
    }

    pub async fn delete_number_training(
        &self,
        projectid: &str,
        id: &str,
    ) -> Result<u64, StoreError> {
        self.delete_one(ProjectType::Numbers, projectid, id).await
    }

    pub async fn delete_number_training_by_project_id(
        &self,
        projectid: &str,
    ) -> Result<u64, StoreError> {
        self.delete_by_project(ProjectType::Numbers, projectid)
            .await
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    pub async fn store_image_training(
        &self,
        projectid: &str,
        imageurl: &str,
        label: Option<&str>,
    ) -> Result<ImageTraining, StoreError> {
        let training = self
            .factory
            .create_image_training(projectid, imageurl, label)?;
        self.insert(projectid, vec![TrainingRow::Images(training.clone())])
            .await?;
        Ok(training)
    }

    pub async fn bulk_store_image_training(
        &self,
        projectid: &str,
        items: &[TrainingItem<String>],
    ) -> Result<Vec<ImageTraining>, StoreError> {
        let trainings = items
            .iter()
            .map(|item| {
                self.factory
                    .create_image_training(projectid, &item.data, item.label.as_deref())
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.insert(
            projectid,
            trainings.iter().cloned().map(TrainingRow::Images).collect(),
        )
        .await?;
        Ok(trainings)
    }

    pub async fn get_image_training(
        &self,
        projectid: &str,
        paging: Paging,
    ) -> Result<Vec<ImageTraining>, StoreError> {
        let rows = self
            .select(ProjectType::Images, projectid, None, paging)
            .await?;
        Ok(rows.into_iter().map(into_images).collect::<Result<_, _>>()?)
    }

    pub async fn get_image_training_by_label(
        &self,
        projectid: &str,
        label: &str,
        paging: Paging,
    ) -> Result<Vec<ImageTraining>, StoreError> {
        let rows = self
            .select(ProjectType::Images, projectid, Some(label), paging)
            .await?;
        Ok(rows.into_iter().map(into_images).collect::<Result<_, _>>()?)
    }

    pub async fn count_image_training(&self, projectid: &str) -> Result<i64, StoreError> {
        self.count(ProjectType::Images, projectid).await
    }

    pub async fn count_image_training_by_label(
        &self,
        projectid: &str,
    ) -> Result<BTreeMap<String, i64>, StoreError> {
        self.count_by_label(ProjectType::Images, projectid).await
    }

    pub async fn delete_image_training(
        &self,
        projectid: &str,
        id: &str,
    ) -> Result<u64, StoreError> {
        self.delete_one(ProjectType::Images, projectid, id).await
    }

    pub async fn delete_image_training_by_project_id(
        &self,
        projectid: &str,
    ) -> Result<u64, StoreError> {
        self.delete_by_project(ProjectType::Images, projectid)
            .await
    }

    // -----------------------------------------------------------------------
    // Shared
    // -----------------------------------------------------------------------

    /// Distinct labels present in a project's training data, sorted.
    pub async fn get_training_labels(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<Vec<String>, StoreError> {
        self.backend.select_training_labels(kind, projectid).await
    }

    async fn insert_numbers(
        &self,
        projectid: &str,
        trainings: &[NumberTraining],
    ) -> Result<(), StoreError> {
        let rows = trainings
            .iter()
            .map(|t| TrainingRow::Numbers(number_training_to_row(t)))
            .collect();
        self.insert(projectid, rows).await
    }

    async fn insert(&self, projectid: &str, rows: Vec<TrainingRow>) -> Result<(), StoreError> {
        let Some(kind) = rows.first().map(TrainingRow::kind) else {
            return Ok(());
        };
        tracing::debug!(project_id = %projectid, %kind, rows = rows.len(), "Inserting training rows");
        self.backend.insert_training(&rows).await?;
        if rows.len() > 1 {
            tracing::info!(project_id = %projectid, %kind, rows = rows.len(), "Bulk training insert complete");
        }
        Ok(())
    }

    async fn select(
        &self,
        kind: ProjectType,
        projectid: &str,
        label: Option<&str>,
        paging: Paging,
    ) -> Result<Vec<TrainingRow>, StoreError> {
        let paging = paging.normalized();
        if paging.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(
            project_id = %projectid,
            %kind,
            label,
            start = paging.start,
            limit = paging.limit,
            "Selecting training rows"
        );
        self.backend
            .select_training(kind, projectid, label, paging)
            .await
    }

    async fn count(&self, kind: ProjectType, projectid: &str) -> Result<i64, StoreError> {
        self.backend.count_training(kind, projectid).await
    }

    async fn count_by_label(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<BTreeMap<String, i64>, StoreError> {
        self.backend.count_training_by_label(kind, projectid).await
    }

    async fn delete_one(
        &self,
        kind: ProjectType,
        projectid: &str,
        id: &str,
    ) -> Result<u64, StoreError> {
        let deleted = self.backend.delete_training(kind, projectid, id).await?;
        tracing::debug!(project_id = %projectid, %kind, id, rows = deleted, "Deleted training row");
        Ok(deleted)
    }

    async fn delete_by_project(
        &self,
        kind: ProjectType,
        projectid: &str,
    ) -> Result<u64, StoreError> {
        let deleted = self
            .backend
            .delete_training_by_project(kind, projectid)
            .await?;
        tracing::info!(project_id = %projectid, %kind, rows = deleted, "Deleted project training");
        Ok(deleted)
    }
}

// ---------------------------------------------------------------------------
// Row unpacking
// ---------------------------------------------------------------------------

fn wrong_kind(expected: ProjectType, row: &TrainingRow) -> CoreError {
    CoreError::CorruptRow(format!(
        "expected {expected} training row, got {} row {}",
        row.kind(),
        row.id()
    ))
}

fn into_text(row: TrainingRow) -> Result<TextTraining, CoreError> {
    match row {
        TrainingRow::Text(t) => Ok(t),
        other => Err(wrong_kind(ProjectType::Text, &other)),
    }
}

fn into_numbers(row: TrainingRow) -> Result<NumberTraining, CoreError> {
    match row {
        TrainingRow::Numbers(t) => number_training_from_row(t),
        other => Err(wrong_kind(ProjectType::Numbers, &other)),
    }
}

fn into_images(row: TrainingRow) -> Result<ImageTraining, CoreError> {
    match row {
        TrainingRow::Images(t) => Ok(t),
        other => Err(wrong_kind(ProjectType::Images, &other)),
    }
}
