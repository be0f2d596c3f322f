/// Validation errors for domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // BucketName validation errors
    EmptyBucketName,
    BucketNameTooLong { actual: usize, max: usize },

    // ObjectKey validation errors
    EmptyObjectKey,
    ObjectKeyTooLong { actual: usize, max: usize },

    // VersionId validation errors
    EmptyVersionId,

    // Stack validation errors
    EmptyStackName,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyBucketName => write!(f, "Bucket name cannot be empty"),
            ValidationError::BucketNameTooLong { actual, max } => {
                write!(
                    f,
                    "Bucket name too long: {} characters (max: {})",
                    actual, max
                )
            }

            ValidationError::EmptyObjectKey => write!(f, "Object key cannot be empty"),
            ValidationError::ObjectKeyTooLong { actual, max } => {
                write!(f, "Object key too long: {} bytes (max: {})", actual, max)
            }

            ValidationError::EmptyVersionId => write!(f, "Version ID cannot be empty"),

            ValidationError::EmptyStackName => write!(f, "Stack name cannot be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}
