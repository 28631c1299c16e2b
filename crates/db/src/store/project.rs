//! Project store: projects, their fields and their label lists.

use std::sync::Arc;

use mlkids_core::labels::{create_label, label_list_from_array, labels_from_list};
use mlkids_core::project::{project_from_row, FieldSpec, Project};
use mlkids_core::{CoreError, ObjectFactory};

use crate::backend::ProjectBackend;
use crate::error::StoreError;

pub struct ProjectStore<B> {
    backend: Arc<B>,
    factory: ObjectFactory,
}

impl<B> Clone for ProjectStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            factory: self.factory.clone(),
        }
    }
}

impl<B: ProjectBackend> ProjectStore<B> {
    pub fn new(backend: Arc<B>, factory: ObjectFactory) -> Self {
        Self { backend, factory }
    }

    /// Validate and persist a new project together with its fields.
    pub async fn store_project(
        &self,
        userid: &str,
        classid: &str,
        project_type: &str,
        name: &str,
        language: Option<&str>,
        fields: &[FieldSpec],
    ) -> Result<Project, StoreError> {
        let row = self
            .factory
            .create_project(userid, classid, project_type, name, language, fields)?;
        self.backend.insert_project(&row).await?;
        tracing::info!(
            project_id = %row.id,
            class_id = %classid,
            user_id = %userid,
            project_type,
            fields = row.fields.len(),
            "Project created"
        );
        Ok(project_from_row(row)?)
    }

    pub async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        match self.backend.select_project(id).await? {
            Some(row) => Ok(Some(project_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// A student's projects in creation order.
    pub async fn get_projects_by_user(
        &self,
        classid: &str,
        userid: &str,
    ) -> Result<Vec<Project>, StoreError> {
        let rows = self.backend.select_projects_by_user(classid, userid).await?;
        Ok(rows
            .into_iter()
            .map(project_from_row)
            .collect::<Result<_, _>>()?)
    }

    pub async fn count_projects_by_user(
        &self,
        classid: &str,
        userid: &str,
    ) -> Result<i64, StoreError> {
        self.backend.count_projects_by_user(classid, userid).await
    }

    /// Sanitize `label` and append it to the project's label list if it is
    /// not already there. Returns the resulting list.
    pub async fn add_label_to_project(
        &self,
        projectid: &str,
        label: &str,
    ) -> Result<Vec<String>, StoreError> {
        let label = create_label(label);
        if label.is_empty() {
            return Err(CoreError::MissingAttribute.into());
        }
        let max = self.factory.limits().max_label_list_length;
        self.edit_labels(projectid, &|stored: &str| {
            let mut labels = labels_from_list(stored);
            if !labels.contains(&label) {
                labels.push(label.clone());
            }
            label_list_from_array(&labels, max)
        })
        .await
    }

    /// Remove `label`, sanitized the same way as when it was added.
    pub async fn remove_label_from_project(
        &self,
        projectid: &str,
        label: &str,
    ) -> Result<Vec<String>, StoreError> {
        let label = create_label(label);
        let max = self.factory.limits().max_label_list_length;
        self.edit_labels(projectid, &|stored: &str| {
            let mut labels = labels_from_list(stored);
            labels.retain(|l| *l != label);
            label_list_from_array(&labels, max)
        })
        .await
    }

    /// Delete a project along with its fields and training data.
    pub async fn delete_entire_project(&self, projectid: &str) -> Result<u64, StoreError> {
        let deleted = self.backend.delete_project(projectid).await?;
        tracing::info!(project_id = %projectid, rows = deleted, "Project deleted");
        Ok(deleted)
    }

    async fn edit_labels(
        &self,
        projectid: &str,
        edit: &(dyn for<'a> Fn(&'a str) -> Result<String, CoreError> + Send + Sync),
    ) -> Result<Vec<String>, StoreError> {
        let list = self
            .backend
            .edit_project_labels(projectid, edit)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "project",
                id: projectid.to_string(),
            })?;
        let labels = labels_from_list(&list);
        tracing::debug!(project_id = %projectid, labels = labels.len(), "Updated project labels");
        Ok(labels)
    }
}
