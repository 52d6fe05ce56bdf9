use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error codes reported by a payment provider adapter.
///
/// Adapters should map the provider's own error names onto these codes when
/// they can. Classification prefers the code and only falls back to message
/// text when no code is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SdkErrorCode {
    /// Application or location id was not supplied.
    MissingCredentials,
    /// The provider rejected the application id.
    InvalidApplicationId,
    /// The provider rejected the location id.
    InvalidLocationId,
    /// The provider could not be reached.
    NetworkUnavailable,
    /// The provider script failed to load or initialize.
    ScriptLoadFailed,
    /// A provider call took too long.
    Timeout,
    /// The mount surface does not exist.
    ElementNotFound,
    /// The card input could not be tokenized.
    TokenizationFailed,
    #[serde(other)]
    Unknown,
}

impl SdkErrorCode {
    /// Maps a provider error name (e.g. `InvalidApplicationIdError`) to a code.
    pub fn from_provider_name(name: &str) -> Self {
        match name.trim_end_matches("Error") {
            "MissingCredentials" => Self::MissingCredentials,
            "InvalidApplicationId" => Self::InvalidApplicationId,
            "InvalidLocationId" => Self::InvalidLocationId,
            "Network" | "NetworkUnavailable" => Self::NetworkUnavailable,
            "Script" | "ScriptLoad" => Self::ScriptLoadFailed,
            "Timeout" => Self::Timeout,
            "ElementNotFound" => Self::ElementNotFound,
            "Tokenization" => Self::TokenizationFailed,
            _ => Self::Unknown,
        }
    }
}

/// An error raised by the external payment library.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct SdkError {
    #[serde(default)]
    pub code: Option<SdkErrorCode>,
    pub message: String,
}

impl SdkError {
    /// Creates an error carrying only the provider's message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Creates an error with a structured code.
    pub fn with_code(code: SdkErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<&SdkErrorCode> {
        self.code.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
