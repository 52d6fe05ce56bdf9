#![allow(dead_code)]

use payform::application::form::PaymentForm;
use payform::application::loader::SdkLoader;
use payform::config::{FormOptions, SdkCredentials};
use payform::domain::payment::{PaymentConfig, PaymentResult};
use payform::infrastructure::simulated::SimulatedPayments;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn credentials() -> SdkCredentials {
    SdkCredentials::new("sq0idp-test-app", "LTEST123")
}

pub fn checkout_config() -> PaymentConfig {
    PaymentConfig::new(2599, "USD").unwrap()
}

pub fn fast_options() -> FormOptions {
    FormOptions {
        attach_delay: Duration::ZERO,
        ..FormOptions::default()
    }
}

pub fn loader_for(sdk: &SimulatedPayments) -> Arc<SdkLoader> {
    Arc::new(SdkLoader::new(Box::new(sdk.clone()), credentials()))
}

/// Collects every `PaymentResult` delivered to the form's callback.
#[derive(Clone, Default)]
pub struct Results(Arc<Mutex<Vec<PaymentResult>>>);

impl Results {
    pub fn all(&self) -> Vec<PaymentResult> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    fn push(&self, result: PaymentResult) {
        self.0.lock().unwrap().push(result);
    }
}

pub fn new_form(sdk: &SimulatedPayments, options: FormOptions) -> (Arc<PaymentForm>, Results) {
    let results = Results::default();
    let sink = results.clone();
    let form = PaymentForm::new(checkout_config(), loader_for(sdk), options, move |r| {
        sink.push(r)
    });
    (Arc::new(form), results)
}

/// Yields to spawned tasks until `condition` holds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}
