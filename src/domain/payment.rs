use crate::error::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A positive amount expressed in minor currency units (e.g. cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    pub fn new(minor_units: i64) -> Result<Self, ValidationError> {
        if minor_units > 0 {
            Ok(Self(minor_units))
        } else {
            Err(ValidationError::NonPositiveAmount)
        }
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// Converts to a decimal in major units using the currency's exponent.
    pub fn to_decimal(&self, currency: &Currency) -> Decimal {
        Decimal::new(self.0, currency.minor_unit_digits())
    }
}

impl TryFrom<i64> for Amount {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// A three-letter, upper-case currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(ValidationError::InvalidCurrency(code.to_string()))
        }
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Number of digits after the decimal point in the currency's major unit.
    pub fn minor_unit_digits(&self) -> u32 {
        match self.0.as_str() {
            "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF"
            | "UGX" | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
            "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
            _ => 2,
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the caller wants to charge. Never mutated by the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub amount: Amount,
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl PaymentConfig {
    pub fn new(minor_units: i64, currency: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            amount: Amount::new(minor_units)?,
            currency: Currency::new(currency)?,
            metadata: BTreeMap::new(),
        })
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Human readable amount, e.g. `25.99 USD`.
    pub fn display_amount(&self) -> String {
        format!("{} {}", self.amount.to_decimal(&self.currency), self.currency)
    }
}

/// Parses a `key=value` metadata entry.
pub fn parse_metadata_entry(entry: &str) -> Result<(String, String), ValidationError> {
    match entry.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ValidationError::InvalidMetadata(entry.to_string())),
    }
}

/// Outcome of one tokenize attempt, delivered to the caller exactly once.
///
/// Serializes as `{"success":true,"token":..,"details":..}` or
/// `{"success":false,"error":..}`. `details` is the provider's payload,
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "PaymentResultWire", try_from = "PaymentResultWire")]
pub enum PaymentResult {
    Success { token: String, details: Value },
    Failure { error: String },
}

impl PaymentResult {
    pub fn success(token: impl Into<String>, details: Value) -> Self {
        PaymentResult::Success {
            token: token.into(),
            details,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        PaymentResult::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PaymentResult::Success { .. })
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            PaymentResult::Success { token, .. } => Some(token),
            PaymentResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PaymentResult::Success { .. } => None,
            PaymentResult::Failure { error } => Some(error),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PaymentResultWire {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<PaymentResult> for PaymentResultWire {
    fn from(result: PaymentResult) -> Self {
        match result {
            PaymentResult::Success { token, details } => Self {
                success: true,
                token: Some(token),
                details: (!details.is_null()).then_some(details),
                error: None,
            },
            PaymentResult::Failure { error } => Self {
                success: false,
                token: None,
                details: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<PaymentResultWire> for PaymentResult {
    type Error = String;

    fn try_from(wire: PaymentResultWire) -> Result<Self, Self::Error> {
        if wire.success {
            let token = wire
                .token
                .ok_or_else(|| "successful payment result without token".to_string())?;
            Ok(PaymentResult::success(token, wire.details.unwrap_or(Value::Null)))
        } else {
            Ok(PaymentResult::failure(wire.error.unwrap_or_default()))
        }
    }
}
