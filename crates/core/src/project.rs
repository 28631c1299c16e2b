//! Projects and their numbers-project fields.
//!
//! [`ObjectFactory::create_project`] produces the persistence rows
//! ([`ProjectRow`] with nested [`FieldRow`]s); [`project_from_row`] turns a
//! stored row back into a [`Project`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::factory::ObjectFactory;
use crate::labels::labels_from_list;
use crate::limits::ObjectLimits;
use crate::types::{FieldType, ProjectType, RecordId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Language codes accepted for text projects.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "ar", "cs", "de", "el", "es", "fr", "he", "hi", "it", "ja", "ko", "nl", "pl", "pt",
    "ru", "sv", "tr", "zh-cn", "zh-tw",
];

/// Language reported for rows stored without one.
pub const DEFAULT_LANGUAGE: &str = "en";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A field as described by the client when creating a numbers project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
}

impl FieldSpec {
    pub fn number(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Number,
            choices: None,
        }
    }

    pub fn multichoice<S: Into<String>>(
        name: impl Into<String>,
        choices: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Multichoice,
            choices: Some(choices.into_iter().map(Into::into).collect()),
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A row of the `projects` table, plus its field rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProjectRow {
    pub id: RecordId,
    pub userid: String,
    pub classid: String,
    pub typeid: i16,
    pub name: String,
    pub language: Option<String>,
    pub labels: String,
    pub numfields: i16,
    /// Stored in `numbersprojectsfields`, loaded separately.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub fields: Vec<FieldRow>,
}

/// A row of the `numbersprojectsfields` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FieldRow {
    pub id: RecordId,
    pub projectid: RecordId,
    pub userid: String,
    pub classid: String,
    pub name: String,
    pub fieldtype: i16,
    /// Comma-joined options; only set for multichoice fields.
    pub choices: Option<String>,
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: RecordId,
    pub userid: String,
    pub classid: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub name: String,
    pub language: String,
    pub labels: Vec<String>,
    pub numfields: i16,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Empty unless `field_type` is multichoice.
    pub choices: Vec<String>,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl ObjectFactory {
    /// Validate client input and build the rows for a new project.
    ///
    /// Fields are only legal for numbers projects; text projects must name
    /// a supported language.
    pub fn create_project(
        &self,
        userid: &str,
        classid: &str,
        project_type: &str,
        name: &str,
        language: Option<&str>,
        fields: &[FieldSpec],
    ) -> Result<ProjectRow, CoreError> {
        if userid.is_empty() || classid.is_empty() || name.is_empty() {
            return Err(CoreError::MissingAttribute);
        }
        let project_type: ProjectType = project_type.parse()?;

        let language = match project_type {
            ProjectType::Text => match language {
                Some(lang) if SUPPORTED_LANGUAGES.contains(&lang) => Some(lang.to_string()),
                _ => return Err(CoreError::UnsupportedLanguage),
            },
            ProjectType::Numbers | ProjectType::Images => None,
        };

        match project_type {
            ProjectType::Numbers => {
                if fields.len() > self.limits().max_fields {
                    return Err(CoreError::TooManyFields);
                }
                for field in fields {
                    validate_field(field, self.limits())?;
                }
            }
            ProjectType::Text | ProjectType::Images => {
                if !fields.is_empty() {
                    return Err(CoreError::FieldsNotSupported);
                }
            }
        }

        // The column is a SMALLINT whatever max_fields is configured to.
        let numfields = i16::try_from(fields.len()).map_err(|_| CoreError::TooManyFields)?;

        let id = self.next_id();
        let field_rows = fields
            .iter()
            .map(|field| FieldRow {
                id: self.next_id(),
                projectid: id.clone(),
                userid: userid.to_string(),
                classid: classid.to_string(),
                name: field.name.clone(),
                fieldtype: field.field_type.id(),
                choices: match field.field_type {
                    FieldType::Multichoice => field.choices.as_ref().map(|c| c.join(",")),
                    FieldType::Number => None,
                },
            })
            .collect::<Vec<_>>();

        Ok(ProjectRow {
            id,
            userid: userid.to_string(),
            classid: classid.to_string(),
            typeid: project_type.typeid(),
            name: name.to_string(),
            language,
            labels: String::new(),
            numfields,
            fields: field_rows,
        })
    }
}

fn validate_field(field: &FieldSpec, limits: &ObjectLimits) -> Result<(), CoreError> {
    if field.name.trim().is_empty() {
        return Err(CoreError::MissingAttribute);
    }
    if field.field_type != FieldType::Multichoice {
        return Ok(());
    }

    let choices = field.choices.as_deref().unwrap_or_default();
    if choices.len() < limits.min_choices {
        return Err(CoreError::NotEnoughChoices);
    }
    if choices.len() > limits.max_choices {
        return Err(CoreError::TooManyChoices);
    }
    for choice in choices {
        if !is_valid_choice(choice, limits.max_choice_length) {
            return Err(CoreError::InvalidChoice);
        }
    }
    Ok(())
}

fn is_valid_choice(choice: &str, max_length: usize) -> bool {
    match choice.chars().next() {
        None => false,
        Some(first) if first.is_ascii_digit() => false,
        Some(_) => !choice.contains(',') && choice.chars().count() <= max_length,
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Rebuild a [`Project`] from its stored row.
pub fn project_from_row(row: ProjectRow) -> Result<Project, CoreError> {
    let project_type = ProjectType::from_typeid(row.typeid)?;
    let fields = row
        .fields
        .into_iter()
        .map(field_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Project {
        id: row.id,
        userid: row.userid,
        classid: row.classid,
        project_type,
        name: row.name,
        language: row
            .language
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        labels: labels_from_list(&row.labels),
        numfields: row.numfields,
        fields,
    })
}

/// Rebuild a [`Field`]; the `choices` column is only expanded for
/// multichoice fields.
pub fn field_from_row(row: FieldRow) -> Result<Field, CoreError> {
    let field_type = FieldType::from_id(row.fieldtype)?;
    let choices = match field_type {
        FieldType::Multichoice => row
            .choices
            .as_deref()
            .map(labels_from_list)
            .unwrap_or_default(),
        FieldType::Number => Vec::new(),
    };
    Ok(Field {
        id: row.id,
        name: row.name,
        field_type,
        choices,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
