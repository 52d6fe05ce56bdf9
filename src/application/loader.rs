use crate::config::SdkCredentials;
use crate::domain::ports::{CapabilityHandle, ProviderBox};
use crate::domain::sdk_error::SdkError;
use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

static GLOBAL_LOADER: OnceLock<Arc<SdkLoader>> = OnceLock::new();

/// Obtains the payments capability from a provider, at most once.
///
/// The first `load` call drives the provider; concurrent callers wait on that
/// same attempt. The outcome, success or failure, is kept for the lifetime of
/// the loader, so the provider script is never requested twice.
pub struct SdkLoader {
    provider: ProviderBox,
    credentials: SdkCredentials,
    capability: OnceCell<Result<CapabilityHandle, SdkError>>,
}

impl SdkLoader {
    pub fn new(provider: ProviderBox, credentials: SdkCredentials) -> Self {
        Self {
            provider,
            credentials,
            capability: OnceCell::new(),
        }
    }

    /// Returns the process-wide loader, creating it with `init` on first use.
    ///
    /// Later calls ignore `init`. The global loader is never torn down.
    pub fn global(init: impl FnOnce() -> SdkLoader) -> Arc<SdkLoader> {
        GLOBAL_LOADER.get_or_init(|| Arc::new(init())).clone()
    }

    pub fn credentials(&self) -> &SdkCredentials {
        &self.credentials
    }

    pub async fn load(&self) -> Result<CapabilityHandle, SdkError> {
        if let Some(outcome) = self.capability.get() {
            debug!("payments SDK already resolved");
            return outcome.clone();
        }

        self.capability
            .get_or_init(|| self.load_uncached())
            .await
            .clone()
    }

    /// Whether a capability has been loaded successfully.
    pub fn is_loaded(&self) -> bool {
        matches!(self.capability.get(), Some(Ok(_)))
    }

    async fn load_uncached(&self) -> Result<CapabilityHandle, SdkError> {
        self.credentials.validate()?;

        info!(
            script = self.credentials.environment.script_url(),
            "loading payments SDK"
        );
        match self.provider.load(&self.credentials).await {
            Ok(capability) => {
                debug!("payments SDK loaded");
                Ok(capability)
            }
            Err(e) => {
                warn!(error = %e, "payments SDK failed to load");
                Err(e)
            }
        }
    }
}
