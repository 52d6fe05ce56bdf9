use super::sdk_error::SdkError;
use crate::config::{CardStyle, SdkCredentials};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// What the provider returns from a tokenize call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TokenizeOutcome {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub details: Value,
}

impl TokenizeOutcome {
    pub fn token(token: impl Into<String>, details: Value) -> Self {
        Self {
            token: Some(token.into()),
            details,
        }
    }
}

/// An interactive card input created by the provider.
///
/// `configure` is synchronous; `attach`, `tokenize` and `destroy` may suspend.
#[async_trait]
pub trait CardInput: Send + Sync {
    fn configure(&self, style: &CardStyle) -> Result<(), SdkError>;
    async fn attach(&self, selector: &str) -> Result<(), SdkError>;
    async fn tokenize(&self) -> Result<TokenizeOutcome, SdkError>;
    async fn destroy(&self) -> Result<(), SdkError>;
}

/// A loaded provider runtime.
pub trait PaymentsCapability: Send + Sync {
    fn card(&self) -> Result<CardInputHandle, SdkError>;
}

/// Loads the provider runtime. Implemented once per payment provider.
#[async_trait]
pub trait PaymentsSdkProvider: Send + Sync {
    async fn load(&self, credentials: &SdkCredentials) -> Result<CapabilityHandle, SdkError>;
}

pub type CardInputHandle = Arc<dyn CardInput>;
pub type CapabilityHandle = Arc<dyn PaymentsCapability>;
pub type ProviderBox = Box<dyn PaymentsSdkProvider>;
pub type ProviderFactory = Box<dyn Fn() -> ProviderBox + Send + Sync>;
