use dimx_core::{Entity, PriceAdjustment, Pricing, Product, User};

/// Share of the buyer/seller gap on a dimension added to the price
pub const DIMENSION_ADJUSTMENT_RATE: f64 = 0.01;

/// Price `quantity` units of `product` for this buyer/seller pair.
///
/// Every dimension of the buyer contributes 1% of the absolute buyer/seller
/// gap on that dimension, plus the product's explicit override for it.
/// Zero adjustments are omitted from the breakdown.
pub fn compute_pricing(product: &Product, buyer: &User, seller: &User, quantity: u32) -> Pricing {
    let base = product.price.base * quantity as f64;

    let adjustments: Vec<PriceAdjustment> = buyer
        .coordinates()
        .iter()
        .filter_map(|(dim, buyer_value)| {
            let gap = (buyer_value - seller.coordinates().get(dim)).abs();
            let explicit = product.price.dimension_overrides.get(dim).copied().unwrap_or(0.0);
            let amount = DIMENSION_ADJUSTMENT_RATE * gap + explicit;
            (amount != 0.0).then(|| PriceAdjustment {
                name: format!("dimension:{}", dim),
                amount,
            })
        })
        .collect();

    let total: f64 = adjustments.iter().map(|a| a.amount).sum();
    Pricing {
        base,
        adjustments,
        final_price: (base + total).max(0.0),
        currency: product.price.currency.clone(),
    }
}
