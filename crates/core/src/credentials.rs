//! Credentials for the external Bluemix services a class trains against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::factory::ObjectFactory;
use crate::types::RecordId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const VISREC_URL: &str = "https://gateway-a.watsonplatform.net/visual-recognition/api";
pub const CONV_URL: &str = "https://gateway.watsonplatform.net/conversation/api";

/// Visual recognition API keys are split into two halves of this length.
pub const API_KEY_HALF_LENGTH: usize = 20;

pub const MIN_CONV_USERNAME_LENGTH: usize = 32;
pub const MAX_CONV_USERNAME_LENGTH: usize = 36;
pub const MIN_CONV_PASSWORD_LENGTH: usize = 12;

// ---------------------------------------------------------------------------
// Service type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Visual recognition (image projects).
    Visrec,
    /// Conversation (text projects).
    Conv,
}

impl ServiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::Visrec => "visrec",
            ServiceType::Conv => "conv",
        }
    }

    pub fn url(self) -> &'static str {
        match self {
            ServiceType::Visrec => VISREC_URL,
            ServiceType::Conv => CONV_URL,
        }
    }
}

impl FromStr for ServiceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visrec" => Ok(ServiceType::Visrec),
            "conv" => Ok(ServiceType::Conv),
            _ => Err(CoreError::InvalidServiceType),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// **Note:** `password` is never serialized to responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BluemixCredentials {
    pub id: RecordId,
    pub classid: String,
    pub servicetype: ServiceType,
    pub url: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// A row of the `bluemixcredentials` table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BluemixCredentialsRow {
    pub id: RecordId,
    pub classid: String,
    pub servicetype: String,
    pub url: String,
    pub username: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl ObjectFactory {
    /// Validate and build service credentials.
    ///
    /// `visrec` takes a single API key (at least 40 characters) which is
    /// split into username and password halves. `conv` takes a username
    /// and password directly.
    pub fn create_bluemix_credentials(
        &self,
        servicetype: &str,
        classid: &str,
        apikey: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<BluemixCredentials, CoreError> {
        if servicetype.is_empty() || classid.is_empty() {
            return Err(CoreError::MissingAttribute);
        }
        let servicetype: ServiceType = servicetype.parse()?;

        let (username, password) = match servicetype {
            ServiceType::Visrec => {
                let apikey = present(apikey).ok_or(CoreError::MissingAttribute)?;
                split_api_key(apikey)?
            }
            ServiceType::Conv => {
                let (Some(username), Some(password)) = (present(username), present(password))
                else {
                    return Err(CoreError::MissingAttribute);
                };
                if !is_valid_conv_username(username)
                    || password.chars().count() < MIN_CONV_PASSWORD_LENGTH
                {
                    return Err(CoreError::InvalidCredentials);
                }
                (username.to_string(), password.to_string())
            }
        };

        Ok(BluemixCredentials {
            id: self.next_id(),
            classid: classid.to_string(),
            servicetype,
            url: servicetype.url().to_string(),
            username,
            password,
        })
    }
}

fn split_api_key(apikey: &str) -> Result<(String, String), CoreError> {
    let chars: Vec<char> = apikey.chars().collect();
    if chars.len() < API_KEY_HALF_LENGTH * 2 {
        return Err(CoreError::InvalidApiKey);
    }
    let username = chars[..API_KEY_HALF_LENGTH].iter().collect();
    let password = chars[API_KEY_HALF_LENGTH..API_KEY_HALF_LENGTH * 2].iter().collect();
    Ok((username, password))
}

/// 32 to 36 characters of letters, digits, and hyphens (UUID form).
fn is_valid_conv_username(username: &str) -> bool {
    let len = username.chars().count();
    (MIN_CONV_USERNAME_LENGTH..=MAX_CONV_USERNAME_LENGTH).contains(&len)
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

pub fn credentials_to_row(creds: &BluemixCredentials) -> BluemixCredentialsRow {
    BluemixCredentialsRow {
        id: creds.id.clone(),
        classid: creds.classid.clone(),
        servicetype: creds.servicetype.as_str().to_string(),
        url: creds.url.clone(),
        username: creds.username.clone(),
        password: creds.password.clone(),
    }
}

pub fn credentials_from_row(row: BluemixCredentialsRow) -> Result<BluemixCredentials, CoreError> {
    let servicetype = row
        .servicetype
        .parse()
        .map_err(|_| CoreError::CorruptRow(format!("servicetype '{}'", row.servicetype)))?;
    Ok(BluemixCredentials {
        id: row.id,
        classid: row.classid,
        servicetype,
        url: row.url,
        username: row.username,
        password: row.password,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
