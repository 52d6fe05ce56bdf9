use super::classify;
use super::loader::SdkLoader;
use crate::config::FormOptions;
use crate::domain::payment::{PaymentConfig, PaymentResult};
use crate::domain::ports::CardInputHandle;
use crate::domain::state::{FormState, FormView};
use crate::error::{FormError, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Receives the outcome of every tokenize attempt.
pub type ResultCallback = Arc<dyn Fn(PaymentResult) + Send + Sync>;

/// Drives one mounted card form from loading to a tokenized credential.
///
/// The form owns its card input exclusively. State moves
/// `Loading -> Ready <-> Processing`, or `Loading -> ErroredUnrecoverable`,
/// and is published on a watch channel for the host to render.
///
/// Teardown is explicit: call [`PaymentForm::unmount`] before dropping the
/// form so the card input is released.
pub struct PaymentForm {
    config: PaymentConfig,
    options: FormOptions,
    loader: Arc<SdkLoader>,
    on_result: ResultCallback,
    state: watch::Sender<FormState>,
    card: Mutex<Option<CardInputHandle>>,
    inline_error: Mutex<Option<String>>,
    disabled: AtomicBool,
    started: AtomicBool,
    liveness: CancellationToken,
}

impl PaymentForm {
    /// Creates a form in `Loading`. Nothing happens until [`initialize`](Self::initialize).
    pub fn new(
        config: PaymentConfig,
        loader: Arc<SdkLoader>,
        options: FormOptions,
        on_result: impl Fn(PaymentResult) + Send + Sync + 'static,
    ) -> Self {
        let (state, _) = watch::channel(FormState::Loading);
        Self {
            config,
            options,
            loader,
            on_result: Arc::new(on_result),
            state,
            card: Mutex::new(None),
            inline_error: Mutex::new(None),
            disabled: AtomicBool::new(false),
            started: AtomicBool::new(false),
            liveness: CancellationToken::new(),
        }
    }

    /// Creates a form and runs its initialization on the tokio runtime.
    pub fn mount(
        config: PaymentConfig,
        loader: Arc<SdkLoader>,
        options: FormOptions,
        on_result: impl Fn(PaymentResult) + Send + Sync + 'static,
    ) -> (Arc<Self>, JoinHandle<FormState>) {
        let form = Arc::new(Self::new(config, loader, options, on_result));
        let task = tokio::spawn({
            let form = form.clone();
            async move { form.initialize().await }
        });
        (form, task)
    }

    pub fn config(&self) -> &PaymentConfig {
        &self.config
    }

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    pub fn can_submit(&self) -> bool {
        self.state.borrow().is_ready() && !self.is_disabled() && self.is_mounted()
    }

    /// False once the form has been unmounted.
    pub fn is_mounted(&self) -> bool {
        !self.liveness.is_cancelled()
    }

    pub fn has_card(&self) -> bool {
        self.lock_card().is_some()
    }

    pub fn view(&self) -> FormView {
        FormView::new(
            &self.state(),
            self.is_disabled() || !self.is_mounted(),
            self.lock_inline_error().clone(),
            &self.config.display_amount(),
        )
    }

    /// Loads the SDK and attaches the card input, then settles on `Ready` or
    /// `ErroredUnrecoverable`. Runs at most once per form.
    ///
    /// If the form is unmounted meanwhile, whatever the pending steps produce
    /// is discarded and the state is left untouched.
    pub async fn initialize(&self) -> FormState {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("payment form already initialized");
            return self.state();
        }

        match self.materialize_card().await {
            Ok(Some(card)) => self.install_card(card).await,
            Ok(None) => debug!("payment form unmounted during initialization, result discarded"),
            Err(e) if self.liveness.is_cancelled() => {
                debug!(error = %e, "payment form unmounted, initialization error discarded");
            }
            Err(e) => {
                let message = e
                    .sdk_error()
                    .map(classify::user_message)
                    .unwrap_or_else(|| e.to_string());
                warn!(error = %e, %message, "payment form initialization failed");
                self.state
                    .send_replace(FormState::ErroredUnrecoverable { message });
            }
        }

        self.state()
    }

    /// Tokenizes the card input and reports the outcome through the callback.
    ///
    /// Does nothing unless the form is `Ready` and enabled; a call made while
    /// another is in flight is dropped. Never fails: every error becomes a
    /// failed [`PaymentResult`]. Returns whether a tokenize attempt ran.
    pub async fn submit(&self) -> bool {
        if !self.is_mounted() {
            debug!("submit ignored, form unmounted");
            return false;
        }
        if self.is_disabled() {
            debug!("submit ignored, form disabled");
            return false;
        }

        let entered = self.state.send_if_modified(|state| {
            if state.is_ready() {
                *state = FormState::Processing;
                true
            } else {
                false
            }
        });
        if !entered {
            debug!(state = %self.state(), "submit ignored");
            return false;
        }

        let Some(card) = self.lock_card().clone() else {
            debug!("submit ignored, card input already released");
            self.state.send_replace(FormState::Ready);
            return false;
        };

        *self.lock_inline_error() = None;
        info!(amount = %self.config.display_amount(), "tokenizing card input");

        let result = match Self::tokenize(&card).await {
            Ok((token, details)) => PaymentResult::success(token, details),
            Err(e) => {
                warn!(error = %e, "tokenize failed");
                let message = e.failure_message();
                *self.lock_inline_error() = Some(message.clone());
                PaymentResult::failure(message)
            }
        };

        if self.is_mounted() {
            self.state.send_if_modified(|state| {
                if *state == FormState::Processing {
                    *state = FormState::Ready;
                    true
                } else {
                    false
                }
            });
        }

        (self.on_result)(result);
        true
    }

    /// Tears the form down. Safe to call in any state and more than once.
    ///
    /// The card input, if any, is released exactly once; a failing release is
    /// logged and otherwise ignored.
    pub async fn unmount(&self) {
        self.liveness.cancel();
        let card = self.lock_card().take();
        match card {
            Some(card) => {
                debug!("releasing card input");
                Self::release(&card).await;
            }
            None => debug!("no card input to release"),
        }
    }

    async fn materialize_card(&self) -> Result<Option<CardInputHandle>> {
        let capability = self.loader.load().await.map_err(FormError::SdkLoad)?;
        if self.liveness.is_cancelled() {
            return Ok(None);
        }

        debug!("creating card input");
        let card = capability.card().map_err(FormError::Attach)?;
        if let Err(e) = card.configure(&self.options.style) {
            Self::release(&card).await;
            return Err(FormError::Attach(e));
        }

        tokio::select! {
            _ = self.liveness.cancelled() => {
                Self::release(&card).await;
                return Ok(None);
            }
            _ = tokio::time::sleep(self.options.attach_delay) => {}
        }

        debug!(selector = %self.options.mount_selector, "attaching card input");
        let attached = card.attach(&self.options.mount_selector).await;
        if self.liveness.is_cancelled() {
            Self::release(&card).await;
            return Ok(None);
        }

        match attached {
            Ok(()) => Ok(Some(card)),
            Err(e) => {
                Self::release(&card).await;
                Err(FormError::Attach(e))
            }
        }
    }

    async fn install_card(&self, card: CardInputHandle) {
        let stale = {
            let mut slot = self.lock_card();
            if self.liveness.is_cancelled() {
                Some(card)
            } else {
                *slot = Some(card);
                self.state.send_replace(FormState::Ready);
                None
            }
        };

        match stale {
            Some(card) => {
                debug!("payment form unmounted before card input was installed");
                Self::release(&card).await;
            }
            None => info!("payment form ready"),
        }
    }

    async fn tokenize(card: &CardInputHandle) -> Result<(String, Value)> {
        let outcome = card.tokenize().await.map_err(FormError::Tokenize)?;
        match outcome.token {
            Some(token) if !token.trim().is_empty() => Ok((token, outcome.details)),
            _ => Err(FormError::EmptyToken),
        }
    }

    async fn release(card: &CardInputHandle) {
        if let Err(e) = card.destroy().await {
            warn!(error = %e, "failed to release card input");
        }
    }

    fn lock_card(&self) -> MutexGuard<'_, Option<CardInputHandle>> {
        self.card.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_inline_error(&self) -> MutexGuard<'_, Option<String>> {
        self.inline_error.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SdkCredentials;
    use crate::domain::sdk_error::SdkError;
    use crate::infrastructure::simulated::SimulatedPayments;
    use std::time::Duration;

    fn form_with(sdk: &SimulatedPayments) -> (PaymentForm, Arc<Mutex<Vec<PaymentResult>>>) {
        let loader = Arc::new(SdkLoader::new(
            Box::new(sdk.clone()),
            SdkCredentials::new("sq0idp-test", "LOC-1"),
        ));
        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = results.clone();
        let options = FormOptions {
            attach_delay: Duration::ZERO,
            ..FormOptions::default()
        };
        let form = PaymentForm::new(
            PaymentConfig::new(2599, "USD").unwrap(),
            loader,
            options,
            move |result| sink.lock().unwrap().push(result),
        );
        (form, results)
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let sdk = SimulatedPayments::new();
        let (form, _) = form_with(&sdk);

        assert_eq!(form.initialize().await, FormState::Ready);
        assert_eq!(form.initialize().await, FormState::Ready);
        assert_eq!(sdk.calls().cards, 1);
        assert_eq!(sdk.calls().attaches, 1);
    }

    #[tokio::test]
    async fn test_configure_failure_releases_card() {
        let sdk = SimulatedPayments::new().fail_configure(SdkError::new("bad style"));
        let (form, _) = form_with(&sdk);

        let state = form.initialize().await;
        assert!(state.is_terminal());
        assert!(!form.has_card());
        assert_eq!(sdk.calls().destroys, 1);
        assert_eq!(sdk.calls().attaches, 0);
    }

    #[tokio::test]
    async fn test_failed_tokenize_sets_inline_error_until_next_submit() {
        let sdk = SimulatedPayments::new()
            .fail_tokenize(SdkError::new("Card declined"))
            .tokenize_token("tok_retry");
        let (form, results) = form_with(&sdk);
        form.initialize().await;

        form.submit().await;
        assert_eq!(form.view().inline_error.as_deref(), Some("Card declined"));

        form.submit().await;
        assert_eq!(form.view().inline_error, None);
        assert_eq!(results.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_submit_without_card_restores_ready() {
        let sdk = SimulatedPayments::new();
        let (form, results) = form_with(&sdk);
        form.initialize().await;

        // Card released between the Ready check and the card read.
        form.lock_card().take();

        assert!(!form.submit().await);
        assert_eq!(form.state(), FormState::Ready);
        assert!(results.lock().unwrap().is_empty());
        assert_eq!(sdk.calls().tokenizes, 0);
    }
}
