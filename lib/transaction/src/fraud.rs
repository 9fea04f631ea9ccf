//! Fraud heuristics
//!
//! Each rule inspects a freshly priced transaction and may raise one
//! finding. Rules are independent and evaluated in order; a single `Block`
//! finding rejects the transaction.

use dimx_core::Transaction;
use serde::Serialize;

/// Length of the rapid-transaction window, in seconds
pub const RAPID_WINDOW_SECS: i64 = 5 * 60;
/// Transactions per buyer allowed inside the window
pub const RAPID_MAX_TRANSACTIONS: usize = 5;
pub const DISTANCE_WARN: f64 = 1000.0;
pub const PRICE_DEVIATION_WARN: f64 = 0.5;
pub const PRICE_DEVIATION_BLOCK: f64 = 1.0;
/// Final price that raises a warning when the expected price is zero
pub const ZERO_PRICE_WARN_ABOVE: f64 = 10.0;
pub const TRUST_WARN: f64 = 0.2;
pub const TRUST_BLOCK: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudFinding {
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl FraudFinding {
    fn new(rule: &'static str, severity: Severity, message: String) -> Self {
        Self { rule, severity, message }
    }
}

/// What a rule gets to look at
#[derive(Debug, Clone, Copy)]
pub struct FraudContext<'a> {
    pub transaction: &'a Transaction,
    /// Buyer transactions already stored within the rapid window
    pub recent_buyer_transactions: usize,
}

pub trait FraudRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &FraudContext<'_>) -> Option<FraudFinding>;
}

pub struct RapidTransactions;

impl FraudRule for RapidTransactions {
    fn name(&self) -> &'static str {
        "rapid_transactions"
    }

    fn evaluate(&self, ctx: &FraudContext<'_>) -> Option<FraudFinding> {
        let count = ctx.recent_buyer_transactions + 1;
        (count > RAPID_MAX_TRANSACTIONS).then(|| {
            FraudFinding::new(
                self.name(),
                Severity::Warning,
                format!(
                    "Rapid multiple transactions: {} from buyer {} within {} minutes",
                    count,
                    ctx.transaction.buyer.id,
                    RAPID_WINDOW_SECS / 60
                ),
            )
        })
    }
}

pub struct ExcessiveDistance;

impl FraudRule for ExcessiveDistance {
    fn name(&self) -> &'static str {
        "excessive_distance"
    }

    fn evaluate(&self, ctx: &FraudContext<'_>) -> Option<FraudFinding> {
        let distance = ctx.transaction.trust.distance;
        (distance > DISTANCE_WARN).then(|| {
            FraudFinding::new(
                self.name(),
                Severity::Warning,
                format!("Unusual buyer-seller distance: {:.2}", distance),
            )
        })
    }
}

pub struct PriceDeviation;

impl FraudRule for PriceDeviation {
    fn name(&self) -> &'static str {
        "price_deviation"
    }

    fn evaluate(&self, ctx: &FraudContext<'_>) -> Option<FraudFinding> {
        let expected = ctx.transaction.pricing.base;
        let actual = ctx.transaction.pricing.final_price;

        if expected == 0.0 {
            return (actual > ZERO_PRICE_WARN_ABOVE).then(|| {
                FraudFinding::new(
                    self.name(),
                    Severity::Warning,
                    format!("Zero-priced product charged {:.2}", actual),
                )
            });
        }

        let deviation = (actual - expected).abs() / expected;
        let severity = if deviation > PRICE_DEVIATION_BLOCK {
            Severity::Block
        } else if deviation > PRICE_DEVIATION_WARN {
            Severity::Warning
        } else {
            return None;
        };
        Some(FraudFinding::new(
            self.name(),
            severity,
            format!(
                "Price deviation of {:.0}% (expected {:.2}, final {:.2})",
                deviation * 100.0,
                expected,
                actual
            ),
        ))
    }
}

pub struct LowTrust;

impl FraudRule for LowTrust {
    fn name(&self) -> &'static str {
        "low_trust"
    }

    fn evaluate(&self, ctx: &FraudContext<'_>) -> Option<FraudFinding> {
        let trust = ctx.transaction.trust.trust;
        let severity = if trust < TRUST_BLOCK {
            Severity::Block
        } else if trust < TRUST_WARN {
            Severity::Warning
        } else {
            return None;
        };
        Some(FraudFinding::new(
            self.name(),
            severity,
            format!("Low trust score: {:.3}", trust),
        ))
    }
}

/// The standard rule set, in evaluation order
pub fn default_rules() -> Vec<Box<dyn FraudRule>> {
    vec![
        Box::new(RapidTransactions),
        Box::new(ExcessiveDistance),
        Box::new(PriceDeviation),
        Box::new(LowTrust),
    ]
}

/// All findings for one transaction
#[derive(Debug, Clone, Default, Serialize)]
pub struct FraudReport {
    pub findings: Vec<FraudFinding>,
}

impl FraudReport {
    pub fn evaluate(rules: &[Box<dyn FraudRule>], ctx: &FraudContext<'_>) -> Self {
        Self {
            findings: rules.iter().filter_map(|rule| rule.evaluate(ctx)).collect(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Block)
    }

    pub fn messages(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.message.clone()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimx_core::{
        Coordinates, EntityMeta, PartySnapshot, Pricing, SecurityProof, TransactionStatus,
        TrustMetrics,
    };

    fn transaction(base: f64, final_price: f64, distance: f64, trust: f64) -> Transaction {
        let party = |id: &str| PartySnapshot {
            id: id.to_string(),
            coordinates: Coordinates::new(),
        };
        Transaction {
            meta: EntityMeta::new("tx", Coordinates::new()),
            buyer: party("buyer"),
            seller: party("seller"),
            product: party("product"),
            quantity: 1,
            pricing: Pricing {
                base,
                adjustments: Vec::new(),
                final_price,
                currency: "USD".to_string(),
            },
            status: TransactionStatus::Pending,
            trust: TrustMetrics {
                distance,
                trust,
                ..TrustMetrics::default()
            },
            proof: SecurityProof {
                hash: String::new(),
                signature: String::new(),
                verified: false,
            },
        }
    }

    fn report(tx: &Transaction, recent: usize) -> FraudReport {
        let ctx = FraudContext {
            transaction: tx,
            recent_buyer_transactions: recent,
        };
        FraudReport::evaluate(&default_rules(), &ctx)
    }

    #[test]
    fn test_clean_transaction() {
        let tx = transaction(100.0, 101.0, 10.0, 0.8);
        assert!(report(&tx, 0).is_clean());
    }

    #[test]
    fn test_rapid_transactions_on_sixth() {
        let tx = transaction(100.0, 100.0, 10.0, 0.8);
        assert!(report(&tx, 4).is_clean());
        let r = report(&tx, 5);
        assert_eq!(r.findings.len(), 1);
        assert!(r.findings[0].message.contains("Rapid multiple transactions"));
        assert!(!r.is_blocked());
    }

    #[test]
    fn test_distance_warning() {
        let tx = transaction(100.0, 100.0, 1000.5, 0.8);
        let r = report(&tx, 0);
        assert_eq!(r.findings[0].rule, "excessive_distance");
        assert_eq!(r.findings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_price_deviation_levels() {
        assert!(report(&transaction(100.0, 150.0, 0.0, 0.8), 0).is_clean());

        let warn = report(&transaction(100.0, 160.0, 0.0, 0.8), 0);
        assert_eq!(warn.findings[0].severity, Severity::Warning);

        let block = report(&transaction(100.0, 201.0, 0.0, 0.8), 0);
        assert!(block.is_blocked());
    }

    #[test]
    fn test_zero_price_branch() {
        assert!(report(&transaction(0.0, 10.0, 0.0, 0.8), 0).is_clean());
        let r = report(&transaction(0.0, 10.5, 0.0, 0.8), 0);
        assert_eq!(r.findings[0].rule, "price_deviation");
        assert!(!r.is_blocked());
    }

    #[test]
    fn test_trust_levels() {
        let warn = report(&transaction(1.0, 1.0, 0.0, 0.15), 0);
        assert_eq!(warn.findings[0].severity, Severity::Warning);
        let block = report(&transaction(1.0, 1.0, 0.0, 0.05), 0);
        assert!(block.is_blocked());
    }
}
