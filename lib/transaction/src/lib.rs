//! # dimx Transaction
//!
//! Trust-weighted purchases between users in the coordinate space.
//!
//! Creating a transaction validates the request (every violation is reported
//! at once), scores trust between buyer and seller, prices the product with
//! per-dimension adjustments, signs the result and runs the fraud rules.
//! A `Block` finding returns the transaction for inspection without storing it.
//!
//! ```text
//! validate ─> trust ─> price ─> sign ─> fraud rules ─> reserve stock ─> ledger
//!                                                                          │
//!                      confirmed / cancelled <── payment gateway <── process
//! ```
//!
//! Proofs are a SHA-256 hash and an HMAC-SHA256 signature over a canonical
//! JSON rendering of the id, parties, quantity, creation time and final price.

pub mod config;
pub mod engine;
pub mod error;
pub mod fraud;
pub mod ledger;
pub mod payment;
pub mod pricing;
pub mod proof;
pub mod trust;
pub mod validation;

pub use config::{PaymentPolicy, TransactionConfig};
pub use engine::{TransactionEngine, TransactionOutcome};
pub use error::{Result, TransactionError};
pub use fraud::{default_rules, FraudContext, FraudFinding, FraudReport, FraudRule, Severity};
pub use ledger::{Claim, TransactionLedger};
pub use payment::{PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest, SimulatedPayment};
pub use pricing::compute_pricing;
pub use proof::{canonical_bytes, ProofSigner};
pub use trust::compute_trust;
pub use validation::{validate, TransactionContext, ValidationError};
