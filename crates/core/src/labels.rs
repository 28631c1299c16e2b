//! Training label sanitization and the comma-joined label-list codec used
//! by the project `labels` column.

use crate::error::CoreError;

/// Replace every character outside `[A-Za-z0-9]` with `_`.
///
/// ```
/// use mlkids_core::labels::create_label;
///
/// assert_eq!(create_label("It's over here?"), "It_s_over_here_");
/// ```
pub fn create_label(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Split a comma-joined label list, trimming each entry and dropping
/// empty ones. Order is preserved.
pub fn labels_from_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join labels into the single string stored in the `labels` column.
///
/// Fails with [`CoreError::LabelCapacityExceeded`] when the result would
/// not fit in `max_length` characters.
pub fn label_list_from_array<S: AsRef<str>>(
    labels: &[S],
    max_length: usize,
) -> Result<String, CoreError> {
    let joined = labels
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    if joined.chars().count() > max_length {
        return Err(CoreError::LabelCapacityExceeded);
    }
    Ok(joined)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
