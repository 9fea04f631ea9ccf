//! Composite trust between two counterparties
//!
//! trust = 0.3·proximity + 0.3·similarity + 0.3·reputation + 0.1·history, where
//! proximity = 1 − min(1, distance / 100).

use dimx_core::{cosine_similarity, euclidean_distance, Entity, TrustMetrics, User};

const PROXIMITY_WEIGHT: f64 = 0.3;
const SIMILARITY_WEIGHT: f64 = 0.3;
const REPUTATION_WEIGHT: f64 = 0.3;
const HISTORY_WEIGHT: f64 = 0.1;

/// Distance at which proximity bottoms out
const DISTANCE_SCALE: f64 = 100.0;
const MAX_REPUTATION: f64 = 5.0;
/// Combined transaction count at which history saturates
const HISTORY_SATURATION: f64 = 100.0;

pub fn compute_trust(buyer: &User, seller: &User) -> TrustMetrics {
    let distance = euclidean_distance(buyer.coordinates(), seller.coordinates());
    let similarity = cosine_similarity(&buyer.profile.preferences, seller.coordinates());
    let reputation = (buyer.reputation.score + seller.reputation.score) / 2.0 / MAX_REPUTATION;
    let history = ((buyer.purchase_count() as f64
        + seller.reputation.transaction_count as f64)
        / HISTORY_SATURATION)
        .min(1.0);

    let proximity = 1.0 - (distance / DISTANCE_SCALE).min(1.0);
    let trust = PROXIMITY_WEIGHT * proximity
        + SIMILARITY_WEIGHT * similarity
        + REPUTATION_WEIGHT * reputation
        + HISTORY_WEIGHT * history;

    TrustMetrics {
        distance,
        similarity,
        reputation,
        history,
        trust,
    }
}
