use crate::error::{Result, TransactionError};
use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Utc};
use dimx_core::{Entity, Transaction, TransactionStatus};
use parking_lot::RwLock;

#[derive(Debug, Clone)]
struct ParticipantEntry {
    at: DateTime<Utc>,
    transaction_id: String,
    as_buyer: bool,
}

#[derive(Default)]
struct LedgerInner {
    transactions: AHashMap<String, Transaction>,
    /// Per-user entries in insertion (time) order
    by_participant: AHashMap<String, Vec<ParticipantEntry>>,
    in_flight: AHashSet<String>,
}

/// In-memory transaction store with a per-participant time index
#[derive(Default)]
pub struct TransactionLedger {
    inner: RwLock<LedgerInner>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tx: Transaction) {
        let mut inner = self.inner.write();
        let id = tx.id().to_string();
        let at = tx.created_at();
        inner
            .by_participant
            .entry(tx.buyer.id.clone())
            .or_default()
            .push(ParticipantEntry {
                at,
                transaction_id: id.clone(),
                as_buyer: true,
            });
        inner
            .by_participant
            .entry(tx.seller.id.clone())
            .or_default()
            .push(ParticipantEntry {
                at,
                transaction_id: id.clone(),
                as_buyer: false,
            });
        inner.transactions.insert(id, tx);
    }

    pub fn get(&self, id: &str) -> Option<Transaction> {
        self.inner.read().transactions.get(id).cloned()
    }

    /// Mutate a stored transaction in place. Any change to proof-covered
    /// fields makes it fail integrity verification.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut Transaction) -> R) -> Option<R> {
        self.inner.write().transactions.get_mut(id).map(f)
    }

    /// Transactions bought by `buyer_id` at or after `since`
    pub fn count_buyer_since(&self, buyer_id: &str, since: DateTime<Utc>) -> usize {
        self.inner
            .read()
            .by_participant
            .get(buyer_id)
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .take_while(|e| e.at >= since)
                    .filter(|e| e.as_buyer)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Up to `limit` transactions where the user is buyer or seller, newest first
    pub fn history(&self, user_id: &str, limit: usize) -> Vec<Transaction> {
        let inner = self.inner.read();
        inner
            .by_participant
            .get(user_id)
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .filter_map(|e| inner.transactions.get(&e.transaction_id))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Mark a pending transaction as being processed, so two callers cannot
    /// both charge it. The mark is held by the returned guard and cleared
    /// when the guard drops, settled or not.
    pub fn claim(&self, id: &str) -> Result<Claim<'_>> {
        let mut inner = self.inner.write();
        let tx = inner
            .transactions
            .get(id)
            .ok_or_else(|| TransactionError::NotFound(id.to_string()))?;
        if tx.status != TransactionStatus::Pending {
            return Err(TransactionError::NotPending {
                id: id.to_string(),
                status: tx.status,
            });
        }
        let tx = tx.clone();
        if !inner.in_flight.insert(id.to_string()) {
            return Err(TransactionError::AlreadyProcessing(id.to_string()));
        }
        Ok(Claim { ledger: self, transaction: tx })
    }

    fn release_claim(&self, id: &str) {
        self.inner.write().in_flight.remove(id);
    }

    #[cfg(test)]
    fn is_in_flight(&self, id: &str) -> bool {
        self.inner.read().in_flight.contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().transactions.is_empty()
    }
}

/// Exclusive right to settle one pending transaction.
///
/// Dropping the claim without settling (for example when the processing
/// future is cancelled) leaves the transaction pending and claimable again.
pub struct Claim<'a> {
    ledger: &'a TransactionLedger,
    transaction: Transaction,
}

impl Claim<'_> {
    /// Copy of the transaction as it was when claimed
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Move the transaction to its terminal status
    pub fn settle(self, status: TransactionStatus) -> Result<Transaction> {
        let id = self.transaction.id();
        let mut inner = self.ledger.inner.write();
        let tx = inner
            .transactions
            .get_mut(id)
            .ok_or_else(|| TransactionError::NotFound(id.to_string()))?;
        tx.status = status;
        tx.proof.verified = status == TransactionStatus::Confirmed;
        tx.meta.touch();
        Ok(tx.clone())
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.ledger.release_claim(self.transaction.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimx_core::{
        Coordinates, EntityMeta, PartySnapshot, Pricing, SecurityProof, TrustMetrics,
    };

    fn transaction(id: &str) -> Transaction {
        let party = |id: &str| PartySnapshot {
            id: id.to_string(),
            coordinates: Coordinates::new(),
        };
        Transaction {
            meta: EntityMeta::new(id, Coordinates::new()),
            buyer: party("buyer"),
            seller: party("seller"),
            product: party("product"),
            quantity: 1,
            pricing: Pricing {
                base: 1.0,
                adjustments: Vec::new(),
                final_price: 1.0,
                currency: "USD".to_string(),
            },
            status: TransactionStatus::Pending,
            trust: TrustMetrics::default(),
            proof: SecurityProof {
                hash: String::new(),
                signature: String::new(),
                verified: false,
            },
        }
    }

    #[test]
    fn test_claim_is_exclusive_while_held() {
        let ledger = TransactionLedger::new();
        ledger.insert(transaction("tx"));

        let claim = ledger.claim("tx").unwrap();
        assert!(ledger.is_in_flight("tx"));
        assert!(matches!(ledger.claim("tx"), Err(TransactionError::AlreadyProcessing(_))));

        drop(claim);
        assert!(!ledger.is_in_flight("tx"));
        assert!(ledger.claim("tx").is_ok());
    }

    #[test]
    fn test_settle_is_terminal() {
        let ledger = TransactionLedger::new();
        ledger.insert(transaction("tx"));

        let settled = ledger.claim("tx").unwrap().settle(TransactionStatus::Confirmed).unwrap();
        assert_eq!(settled.status, TransactionStatus::Confirmed);
        assert!(settled.proof.verified);
        assert_eq!(settled.meta.version, 1);
        assert!(!ledger.is_in_flight("tx"));
        assert!(matches!(ledger.claim("tx"), Err(TransactionError::NotPending { .. })));
    }

    #[test]
    fn test_unknown_id() {
        assert!(matches!(
            TransactionLedger::new().claim("missing"),
            Err(TransactionError::NotFound(_))
        ));
    }
}
