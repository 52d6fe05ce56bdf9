use crate::domain::sdk_error::{SdkError, SdkErrorCode};

pub const CONFIGURATION_MESSAGE: &str =
    "Payment system configuration error. Please contact support.";
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to connect to payment system. Please check your internet connection.";
pub const GENERIC_FALLBACK_MESSAGE: &str = "Failed to initialize payment form";

const CONFIGURATION_HINTS: &[&str] = &[
    "missing",
    "applicationid",
    "application id",
    "locationid",
    "location id",
    "invalid application",
    "configuration",
];

const CONNECTIVITY_HINTS: &[&str] = &[
    "network",
    "fetch",
    "failed to load",
    "script",
    "timeout",
    "timed out",
    "offline",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Connectivity,
    Generic,
}

/// Sorts an initialization failure into one of three buckets.
///
/// Structured codes win; message text is only consulted when the code is
/// absent or carries no category.
pub fn classify(error: &SdkError) -> ErrorCategory {
    match error.code() {
        Some(SdkErrorCode::MissingCredentials)
        | Some(SdkErrorCode::InvalidApplicationId)
        | Some(SdkErrorCode::InvalidLocationId) => ErrorCategory::Configuration,
        Some(SdkErrorCode::NetworkUnavailable)
        | Some(SdkErrorCode::ScriptLoadFailed)
        | Some(SdkErrorCode::Timeout) => ErrorCategory::Connectivity,
        _ => classify_message(error.message()),
    }
}

fn classify_message(message: &str) -> ErrorCategory {
    let message = message.to_ascii_lowercase();
    if CONFIGURATION_HINTS.iter().any(|hint| message.contains(hint)) {
        ErrorCategory::Configuration
    } else if CONNECTIVITY_HINTS.iter().any(|hint| message.contains(hint)) {
        ErrorCategory::Connectivity
    } else {
        ErrorCategory::Generic
    }
}

/// The message shown for a terminal initialization failure.
pub fn user_message(error: &SdkError) -> String {
    match classify(error) {
        ErrorCategory::Configuration => CONFIGURATION_MESSAGE.to_string(),
        ErrorCategory::Connectivity => CONNECTIVITY_MESSAGE.to_string(),
        ErrorCategory::Generic if error.message().trim().is_empty() => {
            GENERIC_FALLBACK_MESSAGE.to_string()
        }
        ErrorCategory::Generic => error.message().to_string(),
    }
}
