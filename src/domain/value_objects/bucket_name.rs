use serde::Serialize;

use crate::domain::errors::ValidationError;

/// Upper bound on names the provider will hand back. Legacy buckets may carry
/// names longer than today's 63 character rule.
const MAX_BUCKET_NAME_LEN: usize = 255;

/// A bucket name as reported by the storage provider.
///
/// Names are treated as opaque: buckets created under older naming rules
/// (uppercase, underscores, dots) are still listed by the provider and must be
/// representable, so only emptiness and length are checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BucketName(String);

impl BucketName {
    /// Create a new BucketName
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyBucketName);
        }

        if value.len() > MAX_BUCKET_NAME_LEN {
            return Err(ValidationError::BucketNameTooLong {
                actual: value.len(),
                max: MAX_BUCKET_NAME_LEN,
            });
        }

        Ok(Self(value))
    }

    /// Get the bucket name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for BucketName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bucket_names() {
        assert!(BucketName::new("my-bucket").is_ok());
        assert!(BucketName::new("bucket123").is_ok());
        assert!(BucketName::new("my.dotted.bucket").is_ok());
        // Legacy us-east-1 names
        assert!(BucketName::new("Legacy_Bucket").is_ok());
    }

    #[test]
    fn test_invalid_bucket_names() {
        assert_eq!(
            BucketName::new("").unwrap_err(),
            ValidationError::EmptyBucketName
        );
        assert!(matches!(
            BucketName::new("a".repeat(256)),
            Err(ValidationError::BucketNameTooLong { actual: 256, .. })
        ));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut names = vec![
            BucketName::new("charlie").unwrap(),
            BucketName::new("alpha").unwrap(),
            BucketName::new("bravo").unwrap(),
        ];
        names.sort();
        let sorted: Vec<&str> = names.iter().map(BucketName::as_str).collect();
        assert_eq!(sorted, vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let name = BucketName::new("logs-bucket").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"logs-bucket\"");
    }
}
