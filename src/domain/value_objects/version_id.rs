use crate::domain::errors::ValidationError;

/// Identifier of one historical version or delete marker of an object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionId(String);

impl VersionId {
    /// Version id the provider reports for objects written while versioning was off
    pub const NULL: &'static str = "null";

    /// Create a new VersionId with validation
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyVersionId);
        }

        Ok(Self(value))
    }

    /// Get the version ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the provider's placeholder version of an unversioned write
    pub fn is_null(&self) -> bool {
        self.0 == Self::NULL
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_version_id() {
        assert!(VersionId::new("3HL4kqtJlcpXroDTDmJ.rmSpXd3dIbrHY").is_ok());
        assert!(VersionId::new("550e8400-e29b-41d4-a716-446655440000").is_ok());
    }

    #[test]
    fn test_null_version_is_valid() {
        let id = VersionId::new(VersionId::NULL).unwrap();
        assert!(id.is_null());
    }

    #[test]
    fn test_invalid_version_id() {
        assert_eq!(VersionId::new("").unwrap_err(), ValidationError::EmptyVersionId);
    }
}
