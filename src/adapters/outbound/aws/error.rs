use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use crate::domain::errors::ProviderError;

/// Code used when a provider response is missing data we rely on
pub const MALFORMED_RESPONSE: &str = "MalformedResponse";

/// Convert an SDK error of any AWS service into a provider error.
///
/// Service errors keep their error code (`AccessDenied`, `NoSuchBucket`, ...);
/// transport errors and timeouts carry no code and use the full error chain
/// as message.
pub fn provider_error<E, R>(operation: &str, err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    let code = err.code().map(str::to_string);
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };

    let error = ProviderError::new(operation, message);
    match code {
        Some(code) => error.with_code(code),
        None => error,
    }
}

pub fn malformed(operation: &str, message: impl Into<String>) -> ProviderError {
    ProviderError::new(operation, message).with_code(MALFORMED_RESPONSE)
}
