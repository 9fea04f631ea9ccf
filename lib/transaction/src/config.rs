use dimx_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long to wait for the payment gateway, and how often to try
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaymentPolicy {
    pub timeout_ms: u64,
    pub max_attempts: u32,
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            max_attempts: 1,
        }
    }
}

impl PaymentPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Configuration for a transaction engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransactionConfig {
    /// Shared HMAC key for integrity proofs
    pub signing_key: String,
    /// Approval probability of the simulated payment gateway
    pub payment_success_rate: f64,
    pub payment: PaymentPolicy,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            signing_key: "dimx-local-signing-key".to_string(),
            payment_success_rate: 0.95,
            payment: PaymentPolicy::default(),
        }
    }
}

impl TransactionConfig {
    pub fn with_signing_key(mut self, key: impl Into<String>) -> Self {
        self.signing_key = key.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.signing_key.is_empty() {
            return Err(Error::InvalidConfig("signing_key must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.payment_success_rate) {
            return Err(Error::InvalidConfig(format!(
                "payment_success_rate must be in [0, 1], got {}",
                self.payment_success_rate
            )));
        }
        if self.payment.max_attempts == 0 {
            return Err(Error::InvalidConfig("payment.max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}
