use mlkids_core::limits::ObjectLimits;
use mlkids_db::config::{parse_var, ConfigError};

/// Validation limits, each overridable from the environment.
///
/// | Env Var                          | Default |
/// |----------------------------------|---------|
/// | `MLKIDS_MAX_FIELDS`              | `10`    |
/// | `MLKIDS_MIN_CHOICES`             | `2`     |
/// | `MLKIDS_MAX_CHOICES`             | `10`    |
/// | `MLKIDS_MAX_CHOICE_LENGTH`       | `20`    |
/// | `MLKIDS_MAX_NUMBER_ITEMS`        | `10`    |
/// | `MLKIDS_MAX_IMAGE_URL_LENGTH`    | `1024`  |
/// | `MLKIDS_MAX_LABEL_LIST_LENGTH`   | `500`   |
pub fn limits_from_env() -> Result<ObjectLimits, ConfigError> {
    let defaults = ObjectLimits::default();
    Ok(ObjectLimits {
        max_fields: parse_var("MLKIDS_MAX_FIELDS", defaults.max_fields, "usize")?,
        min_choices: parse_var("MLKIDS_MIN_CHOICES", defaults.min_choices, "usize")?,
        max_choices: parse_var("MLKIDS_MAX_CHOICES", defaults.max_choices, "usize")?,
        max_choice_length: parse_var(
            "MLKIDS_MAX_CHOICE_LENGTH",
            defaults.max_choice_length,
            "usize",
        )?,
        max_number_items: parse_var(
            "MLKIDS_MAX_NUMBER_ITEMS",
            defaults.max_number_items,
            "usize",
        )?,
        max_image_url_length: parse_var(
            "MLKIDS_MAX_IMAGE_URL_LENGTH",
            defaults.max_image_url_length,
            "usize",
        )?,
        max_label_list_length: parse_var(
            "MLKIDS_MAX_LABEL_LIST_LENGTH",
            defaults.max_label_list_length,
            "usize",
        )?,
    })
}
