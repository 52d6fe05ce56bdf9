use crate::domain::sdk_error::SdkError;
use thiserror::Error;

/// Message delivered when tokenization yields no usable token.
pub const EMPTY_TOKEN_MESSAGE: &str = "Failed to tokenize payment method";

/// Failures of the payment form lifecycle.
///
/// `SdkLoad` and `Attach` end the current mount. `Tokenize` and `EmptyToken`
/// are recoverable: the form returns to `Ready` and may be submitted again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Failed to load payment SDK: {0}")]
    SdkLoad(SdkError),
    #[error("Failed to attach card input: {0}")]
    Attach(SdkError),
    #[error("{0}")]
    Tokenize(SdkError),
    #[error("Failed to tokenize payment method")]
    EmptyToken,
}

impl FormError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FormError::Tokenize(_) | FormError::EmptyToken)
    }

    /// The underlying provider error, if any.
    pub fn sdk_error(&self) -> Option<&SdkError> {
        match self {
            FormError::SdkLoad(e) | FormError::Attach(e) | FormError::Tokenize(e) => Some(e),
            FormError::EmptyToken => None,
        }
    }

    /// Message placed into a failed `PaymentResult`.
    pub fn failure_message(&self) -> String {
        match self {
            FormError::Tokenize(e) if e.message().trim().is_empty() => {
                EMPTY_TOKEN_MESSAGE.to_string()
            }
            FormError::Tokenize(e) => e.message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Rejected input when building domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount must be positive")]
    NonPositiveAmount,
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),
    #[error("Invalid metadata entry: {0}")]
    InvalidMetadata(String),
}

pub type Result<T> = std::result::Result<T, FormError>;
