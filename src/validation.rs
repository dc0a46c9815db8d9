//! Display-name validation for the LOGIN step.

/// Longest accepted display name, in characters.
pub const MAX_NAME_LEN: usize = 32;

/// Reasons a candidate display name is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("Name cannot be empty")]
    Empty,

    #[error("Name is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Name cannot contain spaces")]
    Whitespace,

    #[error("Name contains invalid characters")]
    ControlCharacters,
}

/// Validate a login line and return the name to bind.
///
/// Surrounding whitespace is ignored; inner whitespace is refused because
/// names are used as single tokens in chat listings and presence lists.
pub fn validate_display_name(raw: &str) -> Result<&str, NameError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(NameError::TooLong { max: MAX_NAME_LEN });
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(NameError::ControlCharacters);
    }
    if name.chars().any(char::is_whitespace) {
        return Err(NameError::Whitespace);
    }
    Ok(name)
}
