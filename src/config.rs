//! Configuration for the payments SDK, the card form and the admin client.

use crate::domain::sdk_error::{SdkError, SdkErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const APPLICATION_ID_ENV: &str = "SQUARE_APPLICATION_ID";
pub const LOCATION_ID_ENV: &str = "SQUARE_LOCATION_ID";
pub const ENVIRONMENT_ENV: &str = "SQUARE_ENVIRONMENT";
pub const ADMIN_URL_ENV: &str = "PAYFORM_ADMIN_URL";
pub const ADMIN_TOKEN_ENV: &str = "PAYFORM_ADMIN_TOKEN";

/// Provider environment (SANDBOX or PRODUCTION).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    /// URL of the provider's browser script for this environment.
    pub fn script_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://sandbox.web.squarecdn.com/v1/square.js",
            Environment::Production => "https://web.squarecdn.com/v1/square.js",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Merchant identifiers the provider needs before it can be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkCredentials {
    pub application_id: String,
    pub location_id: String,
    #[serde(default)]
    pub environment: Environment,
}

impl SdkCredentials {
    pub fn new(application_id: impl Into<String>, location_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            location_id: location_id.into(),
            environment: Environment::default(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Reads credentials from the process environment.
    ///
    /// Missing ids are left blank; `validate` reports them.
    pub fn from_env() -> Self {
        let environment = match std::env::var(ENVIRONMENT_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("{e}; falling back to sandbox");
                Environment::Sandbox
            }),
            Err(_) => Environment::Sandbox,
        };

        Self {
            application_id: std::env::var(APPLICATION_ID_ENV).unwrap_or_default(),
            location_id: std::env::var(LOCATION_ID_ENV).unwrap_or_default(),
            environment,
        }
    }

    pub fn validate(&self) -> Result<(), SdkError> {
        let mut missing = Vec::new();
        if self.application_id.trim().is_empty() {
            missing.push("application id");
        }
        if self.location_id.trim().is_empty() {
            missing.push("location id");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SdkError::with_code(
                SdkErrorCode::MissingCredentials,
                format!("MISSING_CREDENTIALS: {} not configured", missing.join(" and ")),
            ))
        }
    }
}

/// The fixed visual configuration applied to every card input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStyle {
    pub border_color: String,
    pub focus_border_color: String,
    pub error_color: String,
    pub border_radius: String,
    pub font_size: String,
    pub text_color: String,
    pub placeholder_color: String,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            border_color: "#E0E0E0".to_string(),
            focus_border_color: "#006AFF".to_string(),
            error_color: "#D92D20".to_string(),
            border_radius: "6px".to_string(),
            font_size: "16px".to_string(),
            text_color: "#1A1A1A".to_string(),
            placeholder_color: "#9E9E9E".to_string(),
        }
    }
}

impl CardStyle {
    /// Selector-keyed style map in the shape the provider expects.
    pub fn to_provider_style(&self) -> Value {
        json!({
            ".input-container": {
                "borderColor": self.border_color,
                "borderRadius": self.border_radius,
            },
            ".input-container.is-focus": {
                "borderColor": self.focus_border_color,
            },
            ".message-text.is-error": {
                "color": self.error_color,
            },
            "input": {
                "fontSize": self.font_size,
                "color": self.text_color,
            },
            "input::placeholder": {
                "color": self.placeholder_color,
            },
        })
    }
}

/// Settings for a mounted payment form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOptions {
    /// Selector of the region the card input is attached to.
    pub mount_selector: String,
    /// Deferral before attach so the mount surface can render.
    pub attach_delay: Duration,
    pub style: CardStyle,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            mount_selector: "#card-container".to_string(),
            attach_delay: Duration::from_millis(100),
            style: CardStyle::default(),
        }
    }
}

/// Connection settings for the admin REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub base_url: Url,
    pub api_token: String,
    pub timeout: Duration,
}

impl AdminConfig {
    pub fn new(base_url: Url, api_token: impl Into<String>) -> Self {
        Self {
            base_url,
            api_token: api_token.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Reads `PAYFORM_ADMIN_URL` and `PAYFORM_ADMIN_TOKEN`.
    pub fn from_env() -> Result<Self, crate::interfaces::admin::AdminError> {
        use crate::interfaces::admin::AdminError;

        let url = std::env::var(ADMIN_URL_ENV)
            .map_err(|_| AdminError::MissingConfig(ADMIN_URL_ENV))?;
        let token = std::env::var(ADMIN_TOKEN_ENV)
            .map_err(|_| AdminError::MissingConfig(ADMIN_TOKEN_ENV))?;

        Ok(Self::new(Url::parse(&url)?, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reports_missing_ids() {
        let err = SdkCredentials::new("", " ").validate().unwrap_err();
        assert_eq!(err.code(), Some(&SdkErrorCode::MissingCredentials));
        assert!(err.message().contains("MISSING"));
        assert!(err.message().contains("application id and location id"));

        assert!(SdkCredentials::new("sq0idp-app", "L1").validate().is_ok());
    }

    #[test]
    fn test_environment_parse_and_script_url() {
        assert_eq!("PRODUCTION".parse::<Environment>(), Ok(Environment::Production));
        assert!("staging".parse::<Environment>().is_err());
        assert!(Environment::Sandbox.script_url().contains("sandbox"));
        assert!(!Environment::Production.script_url().contains("sandbox"));
    }

    #[test]
    fn test_card_style_shape() {
        let style = CardStyle::default().to_provider_style();
        assert_eq!(style[".input-container"]["borderRadius"], "6px");
        assert_eq!(style["input"]["fontSize"], "16px");
    }
}
