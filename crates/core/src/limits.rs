//! Validation ceilings applied by the [`ObjectFactory`](crate::factory::ObjectFactory).

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of fields in a numbers project.
pub const MAX_FIELDS: usize = 10;

/// Minimum number of choices for a multichoice field.
pub const MIN_CHOICES: usize = 2;

/// Maximum number of choices for a multichoice field.
pub const MAX_CHOICES: usize = 10;

/// Maximum length of a single multichoice option.
pub const MAX_CHOICE_LENGTH: usize = 20;

/// Maximum number of values in one numbers training item.
pub const MAX_NUMBER_ITEMS: usize = 10;

/// Width of the `imageurl` column.
pub const MAX_IMAGE_URL_LENGTH: usize = 1024;

/// Width of the project `labels` column.
pub const MAX_LABEL_LIST_LENGTH: usize = 500;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Every size ceiling enforced during record construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectLimits {
    pub max_fields: usize,
    pub min_choices: usize,
    pub max_choices: usize,
    pub max_choice_length: usize,
    pub max_number_items: usize,
    pub max_image_url_length: usize,
    pub max_label_list_length: usize,
}

impl Default for ObjectLimits {
    fn default() -> Self {
        Self {
            max_fields: MAX_FIELDS,
            min_choices: MIN_CHOICES,
            max_choices: MAX_CHOICES,
            max_choice_length: MAX_CHOICE_LENGTH,
            max_number_items: MAX_NUMBER_ITEMS,
            max_image_url_length: MAX_IMAGE_URL_LENGTH,
            max_label_list_length: MAX_LABEL_LIST_LENGTH,
        }
    }
}
