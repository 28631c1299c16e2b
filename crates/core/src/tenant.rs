//! Class tenant policy: which project types a class may create and how
//! many users, projects and classifier-hours it is allowed.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::labels::labels_from_list;
use crate::types::ProjectType;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_MAX_USERS: i32 = 15;
pub const DEFAULT_MAX_PROJECTS_PER_USER: i32 = 2;
/// Hours a trained classifier is kept before expiry.
pub const DEFAULT_CLASSIFIER_EXPIRY_HOURS: i32 = 24;

static CLASS_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,36}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A row of the `tenants` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ClassRow {
    pub id: String,
    pub projecttypes: String,
    pub ismanaged: i16,
    pub maxusers: i32,
    pub maxprojectsperuser: i32,
    pub textclassifiersexpiry: i32,
    pub imageclassifiersexpiry: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassTenant {
    pub id: String,
    pub supported_project_types: Vec<ProjectType>,
    pub is_managed: bool,
    pub max_users: i32,
    pub max_projects_per_user: i32,
    pub text_classifier_expiry: i32,
    pub image_classifier_expiry: i32,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Validate a class id and build its default policy row.
pub fn create_class_tenant(classid: &str) -> Result<ClassRow, CoreError> {
    if classid.is_empty() {
        return Err(CoreError::MissingClassId);
    }
    if !CLASS_ID_RE.is_match(classid) {
        return Err(CoreError::InvalidClassId);
    }
    Ok(default_class_row(classid))
}

fn default_class_row(classid: &str) -> ClassRow {
    ClassRow {
        id: classid.to_string(),
        projecttypes: ProjectType::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(","),
        ismanaged: 0,
        maxusers: DEFAULT_MAX_USERS,
        maxprojectsperuser: DEFAULT_MAX_PROJECTS_PER_USER,
        textclassifiersexpiry: DEFAULT_CLASSIFIER_EXPIRY_HOURS,
        imageclassifiersexpiry: DEFAULT_CLASSIFIER_EXPIRY_HOURS,
    }
}

/// The policy that applies to a class with no stored tenant row.
pub fn default_class_tenant(classid: &str) -> ClassTenant {
    ClassTenant {
        id: classid.to_string(),
        supported_project_types: ProjectType::ALL.to_vec(),
        is_managed: false,
        max_users: DEFAULT_MAX_USERS,
        max_projects_per_user: DEFAULT_MAX_PROJECTS_PER_USER,
        text_classifier_expiry: DEFAULT_CLASSIFIER_EXPIRY_HOURS,
        image_classifier_expiry: DEFAULT_CLASSIFIER_EXPIRY_HOURS,
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

pub fn class_from_row(row: ClassRow) -> Result<ClassTenant, CoreError> {
    let mut supported_project_types = Vec::new();
    for name in labels_from_list(&row.projecttypes) {
        let project_type: ProjectType = name
            .parse()
            .map_err(|_| CoreError::CorruptRow(format!("projecttypes entry '{name}'")))?;
        if !supported_project_types.contains(&project_type) {
            supported_project_types.push(project_type);
        }
    }
    Ok(ClassTenant {
        id: row.id,
        supported_project_types,
        is_managed: row.ismanaged != 0,
        max_users: row.maxusers,
        max_projects_per_user: row.maxprojectsperuser,
        text_classifier_expiry: row.textclassifiersexpiry,
        image_classifier_expiry: row.imageclassifiersexpiry,
    })
}

pub fn class_to_row(tenant: &ClassTenant) -> ClassRow {
    ClassRow {
        id: tenant.id.clone(),
        projecttypes: tenant
            .supported_project_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(","),
        ismanaged: i16::from(tenant.is_managed),
        maxusers: tenant.max_users,
        maxprojectsperuser: tenant.max_projects_per_user,
        textclassifiersexpiry: tenant.text_classifier_expiry,
        imageclassifiersexpiry: tenant.image_classifier_expiry,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
