/// A single provider call that could not complete.
///
/// Carries the provider's error code when one was reported so callers can
/// tell e.g. `AccessDenied` from `NoSuchBucket` without parsing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub operation: String,
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Check the provider error code
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} failed ({}): {}", self.operation, code, self.message),
            None => write!(f, "{} failed: {}", self.operation, self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Result type for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_and_without_code() {
        let plain = ProviderError::new("ListBuckets", "connection reset");
        assert_eq!(plain.to_string(), "ListBuckets failed: connection reset");

        let coded = ProviderError::new("DeleteBucket", "The bucket you tried to delete is not empty")
            .with_code("BucketNotEmpty");
        assert_eq!(
            coded.to_string(),
            "DeleteBucket failed (BucketNotEmpty): The bucket you tried to delete is not empty"
        );
        assert!(coded.has_code("BucketNotEmpty"));
        assert!(!plain.has_code("BucketNotEmpty"));
    }
}
