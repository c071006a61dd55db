use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

const MAX_SANITIZED_LEN: usize = 100;

/// Client supplied name that cannot be used to build a storage path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid file name '{name}': {reason}")]
pub struct InvalidNameError {
    pub name: String,
    pub reason: &'static str,
}

impl InvalidNameError {
    pub(crate) fn new(name: &str, reason: &'static str) -> Self {
        Self {
            name: name.escape_default().to_string(),
            reason,
        }
    }
}

/// Generates a storage name for an uploaded file.
///
/// The result is `<unix millis>-<random uuid>-<sanitized original>` so it is unique
/// across concurrent callers without consulting any registry of taken names.
pub fn generate(original: &str) -> Result<String, InvalidNameError> {
    validate(original)?;
    Ok(format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitize(original)
    ))
}

/// Rejects names that could escape the directory they are joined to.
pub fn validate(name: &str) -> Result<(), InvalidNameError> {
    if name.is_empty() {
        return Err(InvalidNameError::new(name, "name is empty"));
    }
    if name.contains('\0') {
        return Err(InvalidNameError::new(name, "name contains a null byte"));
    }
    if name.contains("..") {
        return Err(InvalidNameError::new(name, "name contains '..'"));
    }
    if name.contains(['/', '\\']) {
        return Err(InvalidNameError::new(name, "name contains a path separator"));
    }
    Ok(())
}

fn sanitize(name: &str) -> String {
    let mut result: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    // only ASCII is left so any byte index is a char boundary
    result.truncate(MAX_SANITIZED_LEN);
    result
}
