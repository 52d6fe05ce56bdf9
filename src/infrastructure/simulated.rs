use crate::config::{CardStyle, SdkCredentials};
use crate::domain::ports::{
    CapabilityHandle, CardInput, CardInputHandle, PaymentsCapability, PaymentsSdkProvider,
    TokenizeOutcome,
};
use crate::domain::sdk_error::{SdkError, SdkErrorCode};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

pub const DEFAULT_TOKEN: &str = "cnon:card-nonce-ok";
pub const DEFAULT_SURFACE: &str = "#card-container";

/// Number of calls each provider operation has received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulatedCalls {
    pub loads: usize,
    pub cards: usize,
    pub configures: usize,
    pub attaches: usize,
    pub tokenizes: usize,
    pub destroys: usize,
}

#[derive(Default)]
struct Counters {
    loads: AtomicUsize,
    cards: AtomicUsize,
    configures: AtomicUsize,
    attaches: AtomicUsize,
    tokenizes: AtomicUsize,
    destroys: AtomicUsize,
}

struct Script {
    load_error: Option<SdkError>,
    card_error: Option<SdkError>,
    configure_error: Option<SdkError>,
    attach_error: Option<SdkError>,
    destroy_error: Option<SdkError>,
    surfaces: HashSet<String>,
    tokenize_outcomes: VecDeque<Result<TokenizeOutcome, SdkError>>,
    load_gate: Option<Arc<Notify>>,
    tokenize_gate: Option<Arc<Notify>>,
    last_style: Option<CardStyle>,
    attached_to: Option<String>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            load_error: None,
            card_error: None,
            configure_error: None,
            attach_error: None,
            destroy_error: None,
            surfaces: HashSet::from([DEFAULT_SURFACE.to_string()]),
            tokenize_outcomes: VecDeque::new(),
            load_gate: None,
            tokenize_gate: None,
            last_style: None,
            attached_to: None,
        }
    }
}

#[derive(Default)]
struct Shared {
    calls: Counters,
    script: Mutex<Script>,
}

/// An in-process payments provider with scripted behaviour.
///
/// Every clone shares the same script and call counters, so a test can keep
/// one handle while the loader owns another. Tokenize outcomes are consumed
/// in order; once the queue is empty each tokenize yields [`DEFAULT_TOKEN`].
/// Gates hold `load` or `tokenize` suspended until released.
#[derive(Clone, Default)]
pub struct SimulatedPayments {
    shared: Arc<Shared>,
}

impl SimulatedPayments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_load(self, error: SdkError) -> Self {
        self.script().load_error = Some(error);
        self
    }

    pub fn fail_card(self, error: SdkError) -> Self {
        self.script().card_error = Some(error);
        self
    }

    pub fn fail_configure(self, error: SdkError) -> Self {
        self.script().configure_error = Some(error);
        self
    }

    pub fn fail_attach(self, error: SdkError) -> Self {
        self.script().attach_error = Some(error);
        self
    }

    pub fn fail_destroy(self, error: SdkError) -> Self {
        self.script().destroy_error = Some(error);
        self
    }

    /// Removes every mount surface, so attach fails with `ElementNotFound`.
    pub fn without_surfaces(self) -> Self {
        self.script().surfaces.clear();
        self
    }

    pub fn with_surface(self, selector: &str) -> Self {
        self.script().surfaces.insert(selector.to_string());
        self
    }

    pub fn tokenize_token(self, token: &str) -> Self {
        self.push_tokenize(Ok(TokenizeOutcome::token(token, default_details())))
    }

    /// Next tokenize resolves without a token.
    pub fn tokenize_empty(self) -> Self {
        self.push_tokenize(Ok(TokenizeOutcome::default()))
    }

    pub fn fail_tokenize(self, error: SdkError) -> Self {
        self.push_tokenize(Err(error))
    }

    pub fn push_tokenize(self, outcome: Result<TokenizeOutcome, SdkError>) -> Self {
        self.script().tokenize_outcomes.push_back(outcome);
        self
    }

    /// Holds `load` until `gate` is notified.
    pub fn gate_load(self, gate: Arc<Notify>) -> Self {
        self.script().load_gate = Some(gate);
        self
    }

    /// Holds every `tokenize` until `gate` is notified.
    pub fn gate_tokenize(self, gate: Arc<Notify>) -> Self {
        self.script().tokenize_gate = Some(gate);
        self
    }

    pub fn calls(&self) -> SimulatedCalls {
        let c = &self.shared.calls;
        SimulatedCalls {
            loads: c.loads.load(Ordering::SeqCst),
            cards: c.cards.load(Ordering::SeqCst),
            configures: c.configures.load(Ordering::SeqCst),
            attaches: c.attaches.load(Ordering::SeqCst),
            tokenizes: c.tokenizes.load(Ordering::SeqCst),
            destroys: c.destroys.load(Ordering::SeqCst),
        }
    }

    /// Style applied by the most recent `configure`.
    pub fn last_style(&self) -> Option<CardStyle> {
        self.script().last_style.clone()
    }

    /// Selector the card input is currently attached to.
    pub fn attached_to(&self) -> Option<String> {
        self.script().attached_to.clone()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        lock_script(&self.shared)
    }
}

fn lock_script(shared: &Shared) -> MutexGuard<'_, Script> {
    shared.script.lock().unwrap_or_else(|e| e.into_inner())
}

fn default_details() -> Value {
    json!({
        "method": "Card",
        "card": {
            "brand": "VISA",
            "last4": "1111",
            "expMonth": 12,
            "expYear": 2030
        }
    })
}

#[async_trait]
impl PaymentsSdkProvider for SimulatedPayments {
    async fn load(&self, _credentials: &SdkCredentials) -> Result<CapabilityHandle, SdkError> {
        self.shared.calls.loads.fetch_add(1, Ordering::SeqCst);

        let gate = self.script().load_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.script().load_error.clone() {
            Some(e) => Err(e),
            None => Ok(Arc::new(SimulatedCapability {
                shared: self.shared.clone(),
            })),
        }
    }
}

struct SimulatedCapability {
    shared: Arc<Shared>,
}

impl PaymentsCapability for SimulatedCapability {
    fn card(&self) -> Result<CardInputHandle, SdkError> {
        self.shared.calls.cards.fetch_add(1, Ordering::SeqCst);
        match lock_script(&self.shared).card_error.clone() {
            Some(e) => Err(e),
            None => Ok(Arc::new(SimulatedCard {
                shared: self.shared.clone(),
            })),
        }
    }
}

struct SimulatedCard {
    shared: Arc<Shared>,
}

#[async_trait]
impl CardInput for SimulatedCard {
    fn configure(&self, style: &CardStyle) -> Result<(), SdkError> {
        self.shared.calls.configures.fetch_add(1, Ordering::SeqCst);
        let mut script = lock_script(&self.shared);
        if let Some(e) = script.configure_error.clone() {
            return Err(e);
        }
        script.last_style = Some(style.clone());
        Ok(())
    }

    async fn attach(&self, selector: &str) -> Result<(), SdkError> {
        self.shared.calls.attaches.fetch_add(1, Ordering::SeqCst);
        let mut script = lock_script(&self.shared);
        if let Some(e) = script.attach_error.clone() {
            return Err(e);
        }
        if !script.surfaces.contains(selector) {
            return Err(SdkError::with_code(
                SdkErrorCode::ElementNotFound,
                format!("Element {selector} was not found"),
            ));
        }
        script.attached_to = Some(selector.to_string());
        Ok(())
    }

    async fn tokenize(&self) -> Result<TokenizeOutcome, SdkError> {
        self.shared.calls.tokenizes.fetch_add(1, Ordering::SeqCst);

        let gate = lock_script(&self.shared).tokenize_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        lock_script(&self.shared)
            .tokenize_outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(TokenizeOutcome::token(DEFAULT_TOKEN, default_details())))
    }

    async fn destroy(&self) -> Result<(), SdkError> {
        self.shared.calls.destroys.fetch_add(1, Ordering::SeqCst);
        let mut script = lock_script(&self.shared);
        script.attached_to = None;
        match script.destroy_error.clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> SdkCredentials {
        SdkCredentials::new("sq0idp-test", "LOC-1")
    }

    #[tokio::test]
    async fn test_attach_requires_surface() {
        let sdk = SimulatedPayments::new().without_surfaces();
        let capability = sdk.load(&credentials()).await.ok().unwrap();
        let card = capability.card().ok().unwrap();

        let err = card.attach(DEFAULT_SURFACE).await.unwrap_err();
        assert_eq!(err.code(), Some(&SdkErrorCode::ElementNotFound));
        assert_eq!(sdk.attached_to(), None);
    }

    #[tokio::test]
    async fn test_tokenize_outcomes_consumed_in_order() {
        let sdk = SimulatedPayments::new()
            .tokenize_token("tok_first")
            .tokenize_empty();
        let capability = sdk.load(&credentials()).await.ok().unwrap();
        let card = capability.card().ok().unwrap();

        let first = card.tokenize().await.unwrap();
        assert_eq!(first.token.as_deref(), Some("tok_first"));
        let second = card.tokenize().await.unwrap();
        assert_eq!(second.token, None);
        let third = card.tokenize().await.unwrap();
        assert_eq!(third.token.as_deref(), Some(DEFAULT_TOKEN));
        assert_eq!(sdk.calls().tokenizes, 3);
    }

    #[tokio::test]
    async fn test_clones_share_counters() {
        let sdk = SimulatedPayments::new();
        let other = sdk.clone();
        other.load(&credentials()).await.ok().unwrap();
        assert_eq!(sdk.calls().loads, 1);
    }
}
