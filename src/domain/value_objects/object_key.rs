use crate::domain::errors::ValidationError;

const MAX_OBJECT_KEY_LEN: usize = 1024;

/// A key of an object stored in a bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new ObjectKey with validation
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if value.len() > MAX_OBJECT_KEY_LEN {
            return Err(ValidationError::ObjectKeyTooLong {
                actual: value.len(),
                max: MAX_OBJECT_KEY_LEN,
            });
        }

        Ok(Self(value))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_object_key() {
        assert!(ObjectKey::new("file.txt").is_ok());
        assert!(ObjectKey::new("folder/file.txt").is_ok());
        // Provider keys are arbitrary UTF-8, leading slashes included
        assert!(ObjectKey::new("/leading-slash").is_ok());
        assert!(ObjectKey::new("double//slash").is_ok());
    }

    #[test]
    fn test_invalid_object_key() {
        assert!(ObjectKey::new("").is_err());
        assert!(ObjectKey::new("x".repeat(1025)).is_err());
    }
}
