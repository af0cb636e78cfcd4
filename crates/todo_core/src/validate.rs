//! Input rules for item text.

use crate::error::{TodoError, TodoResult};

/// Minimum length of an item's text, in characters.
pub const MIN_VALUE_CHARS: usize = 1;

/// Maximum length of an item's text, in characters.
pub const MAX_VALUE_CHARS: usize = 50;

/// Checks that `value` is between 1 and 50 characters long.
///
/// Length is counted in Unicode scalar values, not bytes.
pub fn validate_value(value: &str) -> TodoResult<()> {
    let chars = value.chars().count();
    if chars < MIN_VALUE_CHARS {
        return Err(TodoError::validation(format!(
            "\"value\" must be at least {} character long",
            MIN_VALUE_CHARS
        )));
    }
    if chars > MAX_VALUE_CHARS {
        return Err(TodoError::validation(format!(
            "\"value\" must be at most {} characters long, got {}",
            MAX_VALUE_CHARS, chars
        )));
    }
    Ok(())
}
