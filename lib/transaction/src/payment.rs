use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub transaction_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentReceipt {
    pub reference: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaymentError {
    /// Final answer from the gateway; not retried
    #[error("Payment declined: {0}")]
    Declined(String),

    /// Transient failure; retried while attempts remain
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can charge a buyer
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// Approves each charge with a fixed probability
#[derive(Debug, Clone)]
pub struct SimulatedPayment {
    success_rate: f64,
}

impl SimulatedPayment {
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPayment {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        tokio::task::yield_now().await;
        if rand::random::<f64>() < self.success_rate {
            Ok(PaymentReceipt {
                reference: Uuid::new_v4().to_string(),
            })
        } else {
            Err(PaymentError::Declined(format!(
                "simulated decline for {}",
                request.transaction_id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PaymentRequest {
        PaymentRequest {
            transaction_id: "tx".to_string(),
            buyer_id: "b".to_string(),
            seller_id: "s".to_string(),
            amount: 10.0,
            currency: "USD".to_string(),
        }
    }

    #[tokio::test]
    async fn test_always_approves() {
        let gateway = SimulatedPayment::new(1.0);
        for _ in 0..20 {
            assert!(gateway.charge(&request()).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_always_declines() {
        let gateway = SimulatedPayment::new(0.0);
        assert!(matches!(
            gateway.charge(&request()).await,
            Err(PaymentError::Declined(_))
        ));
    }
}
