//! Title rules applied before a title reaches the store.

use crate::model::task::MAX_TITLE_CHARS;

/// Why a proposed title was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TitleError {
    #[error("Task title cannot be empty")]
    Empty,
    #[error("Task title is too long ({len} characters, max {max})")]
    TooLong { len: usize, max: usize },
}

/// Trim a raw title and check it is non-empty and at most
/// [`MAX_TITLE_CHARS`] characters.
pub fn validate_title(raw: &str) -> Result<String, TitleError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TitleError::Empty);
    }
    let len = title.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(TitleError::TooLong {
            len,
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(title.to_string())
}

/// Decide whether an edit draft should be committed.
///
/// Returns the trimmed draft when it is non-empty and differs from
/// `current`; `None` means the draft is discarded and the title kept.
pub fn prepare_edit(current: &str, draft: &str) -> Option<String> {
    let trimmed = draft.trim();
    if trimmed.is_empty() || trimmed == current {
        None
    } else {
        Some(trimmed.to_string())
    }
}
