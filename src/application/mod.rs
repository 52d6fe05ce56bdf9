//! Application layer orchestrating the payment form lifecycle.
//!
//! `SdkLoader` resolves the provider capability once and shares it between
//! forms. `PaymentForm` owns one card input and drives it through loading,
//! ready, processing and terminal error states, funnelling every outcome into
//! a `PaymentResult` callback.

pub mod classify;
pub mod form;
pub mod loader;
