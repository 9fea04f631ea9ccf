use crate::config::TransactionConfig;
use crate::error::{Result, TransactionError};
use crate::fraud::{
    default_rules, FraudContext, FraudFinding, FraudReport, FraudRule, RAPID_WINDOW_SECS,
};
use crate::ledger::TransactionLedger;
use crate::payment::{PaymentError, PaymentGateway, PaymentRequest, SimulatedPayment};
use crate::pricing::compute_pricing;
use crate::proof::ProofSigner;
use crate::trust::compute_trust;
use crate::validation::{validate, TransactionContext, ValidationError};
use dimx_core::{
    Catalog, Entity, EntityMeta, Error as CoreError, PartySnapshot, SecurityProof,
    Transaction, TransactionStatus, UserStore,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a creation attempt.
///
/// - validation failure: no transaction, `errors` lists every violation
/// - blocked by fraud rules: the transaction is returned for inspection but not stored
/// - success: the stored transaction, with any fraud warnings
#[derive(Debug, Clone, Serialize)]
pub struct TransactionOutcome {
    pub transaction: Option<Transaction>,
    pub success: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
    pub findings: Vec<FraudFinding>,
}

impl TransactionOutcome {
    fn rejected(errors: Vec<ValidationError>) -> Self {
        Self {
            transaction: None,
            success: false,
            errors,
            warnings: Vec::new(),
            findings: Vec::new(),
        }
    }
}

/// Creates, prices, signs and settles transactions between users
pub struct TransactionEngine {
    config: TransactionConfig,
    catalog: Arc<Catalog>,
    users: Arc<UserStore>,
    ledger: TransactionLedger,
    rules: Vec<Box<dyn FraudRule>>,
    signer: ProofSigner,
    payment: Arc<dyn PaymentGateway>,
}

impl TransactionEngine {
    pub fn new(
        config: TransactionConfig,
        catalog: Arc<Catalog>,
        users: Arc<UserStore>,
    ) -> dimx_core::Result<Self> {
        config.validate()?;
        Ok(Self {
            signer: ProofSigner::new(&config.signing_key),
            payment: Arc::new(SimulatedPayment::new(config.payment_success_rate)),
            rules: default_rules(),
            ledger: TransactionLedger::new(),
            config,
            catalog,
            users,
        })
    }

    #[must_use]
    pub fn with_payment_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.payment = gateway;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: Vec<Box<dyn FraudRule>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    /// Validate, price, sign and screen a purchase. Stock is reserved only
    /// when the transaction is stored.
    pub fn create_transaction(&self, ctx: TransactionContext) -> TransactionOutcome {
        let buyer = self.users.get(&ctx.buyer_id);
        let seller = self.users.get(&ctx.seller_id);
        let product = self.catalog.get(&ctx.product_id);

        let errors = validate(&ctx, buyer.as_ref(), seller.as_ref(), product.as_ref());
        let (Some(buyer), Some(seller), Some(product)) = (buyer, seller, product) else {
            return TransactionOutcome::rejected(errors);
        };
        if !errors.is_empty() {
            debug!(
                buyer = %ctx.buyer_id,
                errors = errors.len(),
                "Transaction rejected by validation"
            );
            return TransactionOutcome::rejected(errors);
        }

        let trust = compute_trust(&buyer, &seller);
        let pricing = compute_pricing(&product, &buyer, &seller, ctx.quantity);

        let mut tx = Transaction {
            meta: EntityMeta::generated(product.coordinates().clone()),
            buyer: PartySnapshot::of(&buyer),
            seller: PartySnapshot::of(&seller),
            product: PartySnapshot::of(&product),
            quantity: ctx.quantity,
            pricing,
            status: TransactionStatus::Pending,
            trust,
            proof: SecurityProof {
                hash: String::new(),
                signature: String::new(),
                verified: false,
            },
        };
        tx.proof = match self.signer.sign(&tx) {
            Ok(proof) => proof,
            Err(e) => {
                warn!(error = %e, "Failed to sign transaction");
                return TransactionOutcome::rejected(Vec::new());
            }
        };

        let since = tx.created_at() - chrono::Duration::seconds(RAPID_WINDOW_SECS);
        let report = FraudReport::evaluate(
            &self.rules,
            &FraudContext {
                transaction: &tx,
                recent_buyer_transactions: self.ledger.count_buyer_since(&tx.buyer.id, since),
            },
        );
        let warnings = report.messages();

        if report.is_blocked() {
            warn!(
                transaction_id = %tx.id(),
                buyer = %tx.buyer.id,
                findings = ?warnings,
                "Transaction blocked by fraud rules"
            );
            return TransactionOutcome {
                transaction: Some(tx),
                success: false,
                errors: Vec::new(),
                warnings,
                findings: report.findings,
            };
        }
        for finding in &report.findings {
            warn!(transaction_id = %tx.id(), rule = finding.rule, "{}", finding.message);
        }

        match self.catalog.reserve(&product.meta.id, ctx.quantity) {
            Ok(_) => {}
            Err(CoreError::InsufficientAvailability { requested, available, .. }) => {
                return TransactionOutcome::rejected(vec![
                    ValidationError::InsufficientAvailability { requested, available },
                ]);
            }
            Err(_) => {
                return TransactionOutcome::rejected(vec![ValidationError::ProductNotFound {
                    id: ctx.product_id,
                }]);
            }
        }

        self.ledger.insert(tx.clone());
        info!(
            transaction_id = %tx.id(),
            buyer = %tx.buyer.id,
            seller = %tx.seller.id,
            final_price = tx.pricing.final_price,
            trust = tx.trust.trust,
            "Transaction created"
        );

        TransactionOutcome {
            transaction: Some(tx),
            success: true,
            errors: Vec::new(),
            warnings,
            findings: report.findings,
        }
    }

    /// Charge a pending transaction. Returns `true` when confirmed, `false`
    /// when the payment failed and the transaction was cancelled.
    pub async fn process_transaction(&self, id: &str) -> Result<bool> {
        let claim = self.ledger.claim(id)?;
        let paid = self.collect_payment(claim.transaction()).await;

        let status = if paid {
            TransactionStatus::Confirmed
        } else {
            TransactionStatus::Cancelled
        };
        let settled = claim.settle(status)?;

        if paid {
            self.users.update(&settled.buyer.id, |buyer| {
                buyer.record_purchase(settled.product.id.clone(), settled.quantity)
            });
            self.users.update(&settled.seller.id, |seller| seller.record_sale());
        } else if let Err(e) = self.catalog.release(&settled.product.id, settled.quantity) {
            warn!(transaction_id = %id, error = %e, "Failed to release reserved stock");
        }

        info!(transaction_id = %id, status = %status, "Transaction processed");
        Ok(paid)
    }

    async fn collect_payment(&self, tx: &Transaction) -> bool {
        let request = PaymentRequest {
            transaction_id: tx.id().to_string(),
            buyer_id: tx.buyer.id.clone(),
            seller_id: tx.seller.id.clone(),
            amount: tx.pricing.final_price,
            currency: tx.pricing.currency.clone(),
        };
        let policy = &self.config.payment;

        for attempt in 1..=policy.max_attempts {
            match tokio::time::timeout(policy.timeout(), self.payment.charge(&request)).await {
                Ok(Ok(receipt)) => {
                    debug!(
                        transaction_id = %request.transaction_id,
                        reference = %receipt.reference,
                        "Payment approved"
                    );
                    return true;
                }
                Ok(Err(PaymentError::Declined(reason))) => {
                    warn!(transaction_id = %request.transaction_id, %reason, "Payment declined");
                    return false;
                }
                Ok(Err(PaymentError::Unavailable(reason))) => {
                    warn!(
                        transaction_id = %request.transaction_id,
                        attempt,
                        %reason,
                        "Payment gateway unavailable"
                    );
                }
                Err(_) => {
                    warn!(transaction_id = %request.transaction_id, attempt, "Payment timed out");
                }
            }
        }
        false
    }

    pub fn get_transaction(&self, id: &str) -> Option<Transaction> {
        self.ledger.get(id)
    }

    /// Newest-first transactions where the user is buyer or seller
    pub fn transaction_history(&self, user_id: &str, limit: usize) -> Vec<Transaction> {
        self.ledger.history(user_id, limit)
    }

    /// Recompute the proof from stored fields and compare
    pub fn verify_transaction_integrity(&self, id: &str) -> Result<bool> {
        let tx = self
            .ledger
            .get(id)
            .ok_or_else(|| TransactionError::NotFound(id.to_string()))?;
        self.signer.verify(&tx)
    }
}
