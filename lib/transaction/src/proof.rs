use crate::error::{Result, TransactionError};
use chrono::SecondsFormat;
use dimx_core::{Entity, SecurityProof, Transaction};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// The fields covered by the proof, in serialization order
#[derive(Serialize)]
struct CanonicalTransaction<'a> {
    id: &'a str,
    buyer_id: &'a str,
    seller_id: &'a str,
    product_id: &'a str,
    quantity: u32,
    created_at: String,
    final_price: f64,
}

/// Canonical bytes of a transaction: compact JSON with a fixed field order
/// and a millisecond-precision UTC timestamp
pub fn canonical_bytes(tx: &Transaction) -> Result<Vec<u8>> {
    let canonical = CanonicalTransaction {
        id: tx.id(),
        buyer_id: &tx.buyer.id,
        seller_id: &tx.seller.id,
        product_id: &tx.product.id,
        quantity: tx.quantity,
        created_at: tx.created_at().to_rfc3339_opts(SecondsFormat::Millis, true),
        final_price: tx.pricing.final_price,
    };
    serde_json::to_vec(&canonical).map_err(|e| TransactionError::Proof(e.to_string()))
}

/// Produces and checks SHA-256 / HMAC-SHA256 proofs under a shared key
#[derive(Clone)]
pub struct ProofSigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for ProofSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofSigner").field("key", &"<redacted>").finish()
    }
}

impl ProofSigner {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|_| TransactionError::Proof("Invalid signing key".to_string()))
    }

    /// Fresh, unverified proof for `tx`
    pub fn sign(&self, tx: &Transaction) -> Result<SecurityProof> {
        let bytes = canonical_bytes(tx)?;
        let hash = hex::encode(Sha256::digest(&bytes));

        let mut mac = self.mac()?;
        mac.update(&bytes);
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(SecurityProof {
            hash,
            signature,
            verified: false,
        })
    }

    /// Recompute hash and signature from the stored fields and compare
    pub fn verify(&self, tx: &Transaction) -> Result<bool> {
        let bytes = canonical_bytes(tx)?;
        if hex::encode(Sha256::digest(&bytes)) != tx.proof.hash {
            return Ok(false);
        }

        let Ok(signature) = hex::decode(&tx.proof.signature) else {
            return Ok(false);
        };
        let mut mac = self.mac()?;
        mac.update(&bytes);
        // Constant-time comparison
        Ok(mac.verify_slice(&signature).is_ok())
    }
}
