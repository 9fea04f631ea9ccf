use dimx_core::{Entity, Product, User};
use serde::Serialize;
use thiserror::Error;

/// One reason a transaction cannot be created
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Buyer not found: {id}")]
    BuyerNotFound { id: String },

    #[error("Seller not found: {id}")]
    SellerNotFound { id: String },

    #[error("Product not found: {id}")]
    ProductNotFound { id: String },

    #[error("Buyer and seller must be different users")]
    SameParty,

    #[error("Quantity must be greater than zero")]
    InvalidQuantity,

    #[error("Product price must not be negative: {price}")]
    NegativePrice { price: f64 },

    #[error("Requested {requested} units but only {available} available")]
    InsufficientAvailability { requested: u32, available: u32 },

    #[error("{role} {id} has no coordinates")]
    MissingCoordinates { role: &'static str, id: String },
}

/// Request to buy `quantity` units of a product from a seller
#[derive(Debug, Clone, PartialEq, serde::Deserialize, Serialize)]
pub struct TransactionContext {
    pub buyer_id: String,
    pub seller_id: String,
    pub product_id: String,
    pub quantity: u32,
}

impl TransactionContext {
    pub fn new(
        buyer_id: impl Into<String>,
        seller_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            buyer_id: buyer_id.into(),
            seller_id: seller_id.into(),
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Run every check and collect all violations
pub fn validate(
    ctx: &TransactionContext,
    buyer: Option<&User>,
    seller: Option<&User>,
    product: Option<&Product>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if buyer.is_none() {
        errors.push(ValidationError::BuyerNotFound { id: ctx.buyer_id.clone() });
    }
    if seller.is_none() {
        errors.push(ValidationError::SellerNotFound { id: ctx.seller_id.clone() });
    }
    if product.is_none() {
        errors.push(ValidationError::ProductNotFound { id: ctx.product_id.clone() });
    }
    if ctx.buyer_id == ctx.seller_id {
        errors.push(ValidationError::SameParty);
    }
    if ctx.quantity == 0 {
        errors.push(ValidationError::InvalidQuantity);
    }

    if let Some(product) = product {
        if product.price.base < 0.0 {
            errors.push(ValidationError::NegativePrice { price: product.price.base });
        }
        if ctx.quantity > product.availability {
            errors.push(ValidationError::InsufficientAvailability {
                requested: ctx.quantity,
                available: product.availability,
            });
        }
    }

    let participants: [(&'static str, Option<&dyn Entity>); 3] = [
        ("Buyer", buyer.map(|u| u as &dyn Entity)),
        ("Seller", seller.map(|u| u as &dyn Entity)),
        ("Product", product.map(|p| p as &dyn Entity)),
    ];
    for (role, entity) in participants {
        if let Some(entity) = entity {
            if entity.coordinates().is_empty() {
                errors.push(ValidationError::MissingCoordinates {
                    role,
                    id: entity.id().to_string(),
                });
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimx_core::{Coordinates, Price, SellerSummary};

    fn coords() -> Coordinates {
        Coordinates::from_pairs([("x", 1.0)]).unwrap()
    }

    fn product(price: f64, availability: u32) -> Product {
        Product::new(
            "p",
            "Thing",
            coords(),
            Price::new(price),
            SellerSummary {
                id: "s".to_string(),
                reputation: 4.0,
                coordinates: Coordinates::new(),
            },
        )
        .with_availability(availability)
    }

    #[test]
    fn test_valid_request() {
        let buyer = User::new("b", "B", coords());
        let seller = User::new("s", "S", coords());
        let ctx = TransactionContext::new("b", "s", "p", 1);
        assert!(validate(&ctx, Some(&buyer), Some(&seller), Some(&product(10.0, 1))).is_empty());
    }

    #[test]
    fn test_all_violations_reported_together() {
        let buyer = User::new("b", "B", Coordinates::new());
        let ctx = TransactionContext::new("b", "b", "p", 0);
        let errors = validate(&ctx, Some(&buyer), None, Some(&product(-1.0, 0)));

        assert!(errors.contains(&ValidationError::SellerNotFound { id: "b".into() }));
        assert!(errors.contains(&ValidationError::SameParty));
        assert!(errors.contains(&ValidationError::InvalidQuantity));
        assert!(errors.contains(&ValidationError::NegativePrice { price: -1.0 }));
        assert!(errors.contains(&ValidationError::MissingCoordinates {
            role: "Buyer",
            id: "b".into()
        }));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_quantity_over_availability() {
        let buyer = User::new("b", "B", coords());
        let seller = User::new("s", "S", coords());
        let ctx = TransactionContext::new("b", "s", "p", 3);
        let errors = validate(&ctx, Some(&buyer), Some(&seller), Some(&product(10.0, 2)));
        assert_eq!(
            errors,
            vec![ValidationError::InsufficientAvailability { requested: 3, available: 2 }]
        );
    }
}
