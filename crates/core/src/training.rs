//! Training examples for the three project types.
//!
//! Text and image examples are stored as-is. Numbers examples keep their
//! values as a comma-joined string in the `numberdata` column, so they go
//! through [`NumberTrainingRow`] on the way in and out of storage.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::factory::ObjectFactory;
use crate::project::Project;
use crate::types::{ProjectType, RecordId};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A row of the `texttraining` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TextTraining {
    pub id: RecordId,
    pub projectid: RecordId,
    pub textdata: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberTraining {
    pub id: RecordId,
    pub projectid: RecordId,
    pub numberdata: Vec<f64>,
    pub label: Option<String>,
}

/// A row of the `imagetraining` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ImageTraining {
    pub id: RecordId,
    pub projectid: RecordId,
    pub imageurl: String,
    pub label: Option<String>,
}

/// A row of the `numbertraining` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct NumberTrainingRow {
    pub id: RecordId,
    pub projectid: RecordId,
    pub numberdata: String,
    pub label: Option<String>,
}

/// One persisted training example, tagged by the project type it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TrainingRow {
    Text(TextTraining),
    Numbers(NumberTrainingRow),
    Images(ImageTraining),
}

impl TrainingRow {
    pub fn kind(&self) -> ProjectType {
        match self {
            TrainingRow::Text(_) => ProjectType::Text,
            TrainingRow::Numbers(_) => ProjectType::Numbers,
            TrainingRow::Images(_) => ProjectType::Images,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            TrainingRow::Text(t) => &t.id,
            TrainingRow::Numbers(t) => &t.id,
            TrainingRow::Images(t) => &t.id,
        }
    }

    pub fn projectid(&self) -> &str {
        match self {
            TrainingRow::Text(t) => &t.projectid,
            TrainingRow::Numbers(t) => &t.projectid,
            TrainingRow::Images(t) => &t.projectid,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            TrainingRow::Text(t) => t.label.as_deref(),
            TrainingRow::Numbers(t) => t.label.as_deref(),
            TrainingRow::Images(t) => t.label.as_deref(),
        }
    }
}

/// Client input for bulk inserts: the example payload plus optional label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainingItem<D> {
    pub data: D,
    #[serde(default)]
    pub label: Option<String>,
}

impl<D> TrainingItem<D> {
    pub fn new(data: D, label: Option<&str>) -> Self {
        Self {
            data,
            label: label.map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl ObjectFactory {
    /// Build a text example. Tabs and line breaks become single spaces.
    pub fn create_text_training(
        &self,
        projectid: &str,
        data: &str,
        label: Option<&str>,
    ) -> Result<TextTraining, CoreError> {
        if projectid.is_empty() || data.is_empty() {
            return Err(CoreError::MissingAttribute);
        }
        let textdata = data
            .chars()
            .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
            .collect();
        Ok(TextTraining {
            id: self.next_id(),
            projectid: projectid.to_string(),
            textdata,
            label: label.map(str::to_string),
        })
    }

    pub fn create_number_training(
        &self,
        projectid: &str,
        data: &[f64],
        label: Option<&str>,
    ) -> Result<NumberTraining, CoreError> {
        if projectid.is_empty() || data.is_empty() {
            return Err(CoreError::MissingAttribute);
        }
        if data.len() > self.limits().max_number_items {
            return Err(CoreError::TooManyItems);
        }
        if data.iter().any(|n| !n.is_finite()) {
            return Err(CoreError::NonNumericData);
        }
        Ok(NumberTraining {
            id: self.next_id(),
            projectid: projectid.to_string(),
            numberdata: data.to_vec(),
            label: label.map(str::to_string),
        })
    }

    /// Build a numbers example for a known project, additionally checking
    /// that one value is supplied per project field.
    pub fn create_number_training_for(
        &self,
        project: &Project,
        data: &[f64],
        label: Option<&str>,
    ) -> Result<NumberTraining, CoreError> {
        if project.project_type != ProjectType::Numbers {
            return Err(CoreError::InvalidProjectType(project.project_type.to_string()));
        }
        let training = self.create_number_training(&project.id, data, label)?;
        if training.numberdata.len() != project.fields.len() {
            return Err(CoreError::DataShapeMismatch);
        }
        Ok(training)
    }

    pub fn create_image_training(
        &self,
        projectid: &str,
        imageurl: &str,
        label: Option<&str>,
    ) -> Result<ImageTraining, CoreError> {
        if projectid.is_empty() || imageurl.is_empty() {
            return Err(CoreError::MissingAttribute);
        }
        let max = self.limits().max_image_url_length;
        if imageurl.chars().count() > max {
            return Err(CoreError::UrlTooLong { max });
        }
        Ok(ImageTraining {
            id: self.next_id(),
            projectid: projectid.to_string(),
            imageurl: imageurl.to_string(),
            label: label.map(str::to_string),
        })
    }
}

/// Convert raw client JSON into numeric values. Any non-number item fails
/// with [`CoreError::NonNumericData`].
pub fn number_data_from_json(values: &[serde_json::Value]) -> Result<Vec<f64>, CoreError> {
    values
        .iter()
        .map(|v| v.as_f64().ok_or(CoreError::NonNumericData))
        .collect()
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Serialize a numbers example into its stored row.
pub fn number_training_to_row(training: &NumberTraining) -> NumberTrainingRow {
    NumberTrainingRow {
        id: training.id.clone(),
        projectid: training.projectid.clone(),
        numberdata: training
            .numberdata
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(","),
        label: training.label.clone(),
    }
}

/// Parse a stored `numberdata` string back into values.
pub fn number_training_from_row(row: NumberTrainingRow) -> Result<NumberTraining, CoreError> {
    let numberdata = row
        .numberdata
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| CoreError::CorruptRow(format!("numberdata item '{s}' in {}", row.id)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NumberTraining {
        id: row.id,
        projectid: row.projectid,
        numberdata,
        label: row.label,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
