//! Validation errors raised while constructing records.
//!
//! Display strings are returned verbatim to API clients, so they must stay
//! stable.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Missing required attributes")]
    MissingAttribute,

    #[error("Invalid project type {0}")]
    InvalidProjectType(String),

    #[error("Language not supported")]
    UnsupportedLanguage,

    #[error("Not enough choices provided")]
    NotEnoughChoices,

    #[error("Too many choices specified")]
    TooManyChoices,

    #[error("Invalid choice value")]
    InvalidChoice,

    #[error("Too many fields specified")]
    TooManyFields,

    #[error("Fields not supported for non-numbers projects")]
    FieldsNotSupported,

    #[error("Data contains non-numeric items")]
    NonNumericData,

    #[error("Number of data items exceeded maximum")]
    TooManyItems,

    #[error("Number of data items does not match project fields")]
    DataShapeMismatch,

    #[error("Image URL exceeds maximum allowed length ({max} characters)")]
    UrlTooLong { max: usize },

    #[error("Invalid service type")]
    InvalidServiceType,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing required class id")]
    MissingClassId,

    #[error("Not a valid class id")]
    InvalidClassId,

    #[error("No room for the label")]
    LabelCapacityExceeded,

    /// A persisted row could not be decoded back into a record.
    #[error("Invalid stored record: {0}")]
    CorruptRow(String),
}
