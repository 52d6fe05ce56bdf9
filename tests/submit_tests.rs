mod common;

use common::*;
use payform::domain::payment::PaymentResult;
use payform::domain::ports::TokenizeOutcome;
use payform::domain::sdk_error::SdkError;
use payform::domain::state::FormState;
use payform::infrastructure::simulated::SimulatedPayments;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::test]
async fn test_successful_checkout_passes_token_through() {
    let details = json!({
        "method": "Card",
        "card": {"brand": "MASTERCARD", "last4": "4444", "expMonth": 1, "expYear": 2031},
        "billing": {"postalCode": "94103"}
    });
    let sdk = SimulatedPayments::new()
        .push_tokenize(Ok(TokenizeOutcome::token("tok_abc", details.clone())));
    let (form, results) = new_form(&sdk, fast_options());
    assert_eq!(form.initialize().await, FormState::Ready);

    assert!(form.submit().await);

    assert_eq!(results.all(), vec![PaymentResult::success("tok_abc", details)]);
    assert_eq!(form.state(), FormState::Ready);
    assert_eq!(
        serde_json::to_value(&results.all()[0]).unwrap()["token"],
        "tok_abc"
    );
}

#[tokio::test]
async fn test_empty_token_is_reported_as_failure() {
    let sdk = SimulatedPayments::new()
        .tokenize_empty()
        .push_tokenize(Ok(TokenizeOutcome::token("   ", json!(null))));
    let (form, results) = new_form(&sdk, fast_options());
    form.initialize().await;

    assert!(form.submit().await);
    assert!(form.submit().await);

    assert_eq!(
        results.all(),
        vec![
            PaymentResult::failure("Failed to tokenize payment method"),
            PaymentResult::failure("Failed to tokenize payment method"),
        ]
    );
    assert_eq!(form.state(), FormState::Ready);
}

#[tokio::test]
async fn test_tokenize_error_is_recoverable() {
    let sdk = SimulatedPayments::new()
        .fail_tokenize(SdkError::new("Card declined"))
        .tokenize_token("tok_second_try");
    let (form, results) = new_form(&sdk, fast_options());
    form.initialize().await;

    assert!(form.submit().await);
    assert_eq!(form.state(), FormState::Ready);
    assert_eq!(form.view().inline_error.as_deref(), Some("Card declined"));
    assert!(form.view().submit_enabled);

    assert!(form.submit().await);

    let all = results.all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].error(), Some("Card declined"));
    assert_eq!(all[1].token(), Some("tok_second_try"));
    // The same card input is reused for the retry.
    assert_eq!(sdk.calls().cards, 1);
    assert_eq!(sdk.calls().tokenizes, 2);
}

#[tokio::test]
async fn test_submit_while_loading_is_noop() {
    let gate = Arc::new(Notify::new());
    let sdk = SimulatedPayments::new().gate_load(gate.clone());
    let (form, results) = new_form(&sdk, fast_options());

    let init = tokio::spawn({
        let form = form.clone();
        async move { form.initialize().await }
    });
    wait_until(|| sdk.calls().loads == 1).await;

    assert!(!form.submit().await);
    assert_eq!(form.state(), FormState::Loading);

    gate.notify_one();
    assert_eq!(init.await.unwrap(), FormState::Ready);
    assert_eq!(results.len(), 0);
    assert_eq!(sdk.calls().tokenizes, 0);
}

#[tokio::test]
async fn test_submit_in_terminal_state_is_noop() {
    let sdk = SimulatedPayments::new().fail_load(SdkError::new("network error"));
    let (form, results) = new_form(&sdk, fast_options());
    form.initialize().await;

    assert!(!form.submit().await);
    assert!(form.state().is_terminal());
    assert_eq!(results.len(), 0);
}

#[tokio::test]
async fn test_concurrent_submit_runs_one_tokenize() {
    let gate = Arc::new(Notify::new());
    let sdk = SimulatedPayments::new().gate_tokenize(gate.clone());
    let (form, results) = new_form(&sdk, fast_options());
    form.initialize().await;

    let first = tokio::spawn({
        let form = form.clone();
        async move { form.submit().await }
    });
    wait_until(|| form.state() == FormState::Processing).await;

    assert!(!form.submit().await);
    assert!(!form.submit().await);
    assert!(!form.can_submit());
    assert_eq!(form.view().button_label, "Processing...");

    gate.notify_one();
    assert!(first.await.unwrap());

    assert_eq!(sdk.calls().tokenizes, 1);
    assert_eq!(results.len(), 1);
    assert_eq!(form.state(), FormState::Ready);
}

#[tokio::test]
async fn test_disabled_form_ignores_submit() {
    let sdk = SimulatedPayments::new();
    let (form, results) = new_form(&sdk, fast_options());
    form.initialize().await;

    form.set_disabled(true);
    assert!(!form.can_submit());
    assert!(!form.view().submit_enabled);
    assert!(!form.submit().await);
    assert_eq!(results.len(), 0);

    form.set_disabled(false);
    assert!(form.submit().await);
    assert_eq!(results.len(), 1);
}
