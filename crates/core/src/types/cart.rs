//! Cart snapshot types.
//!
//! A [`CartSnapshot`] is the authoritative-at-a-point-in-time list of cart
//! lines as last fetched from the backend. The backend is the system of
//! record: snapshots are replaced wholesale after every successful cart
//! mutation, never patched locally.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// Errors produced when a cart line violates its invariants.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CartLineError {
    /// Quantity must be at least 1.
    #[error("quantity must be at least 1 (got {0})")]
    ZeroQuantity(u32),
    /// A sale price may not exceed the unit price.
    #[error("sale price {sale} exceeds unit price {unit}")]
    SaleAboveUnit {
        /// The offending sale price.
        sale: Decimal,
        /// The regular unit price.
        unit: Decimal,
    },
}

/// One line of a cart: a product, a quantity, and server-resolved pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product this line refers to.
    pub product_id: ProductId,
    /// Absolute quantity (never a delta). Must be >= 1.
    pub quantity: u32,
    /// Regular unit price.
    pub unit_price: Decimal,
    /// Discounted price, when the backend resolved one. Never above
    /// `unit_price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Decimal>,
}

impl CartLine {
    /// Check the line invariants: `quantity >= 1` and
    /// `sale_price <= unit_price` when a sale price is present.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), CartLineError> {
        if self.quantity == 0 {
            return Err(CartLineError::ZeroQuantity(self.quantity));
        }
        if let Some(sale) = self.sale_price
            && sale > self.unit_price
        {
            return Err(CartLineError::SaleAboveUnit {
                sale,
                unit: self.unit_price,
            });
        }
        Ok(())
    }

    /// The price actually charged per unit: the sale price when present,
    /// the unit price otherwise.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.unit_price)
    }

    /// Line total (`effective_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.effective_price() * Decimal::from(self.quantity)
    }
}

/// An ordered sequence of cart lines, as last fetched from the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// The cart lines, in backend order.
    pub lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// True when the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items across all lines (the cart badge number).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Cart total using each line's effective price.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Validate every line.
    ///
    /// # Errors
    ///
    /// Returns the first line invariant violation found.
    pub fn validate(&self) -> Result<(), CartLineError> {
        self.lines.iter().try_for_each(CartLine::validate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Price in cents, e.g. `cents(450)` is 4.50.
    fn cents(c: i64) -> Decimal {
        Decimal::new(c, 2)
    }

    fn line(product: i64, qty: u32, unit: Decimal, sale: Option<Decimal>) -> CartLine {
        CartLine {
            product_id: ProductId::new(product),
            quantity: qty,
            unit_price: unit,
            sale_price: sale,
        }
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let l = line(1, 0, cents(450), None);
        assert_eq!(l.validate(), Err(CartLineError::ZeroQuantity(0)));
    }

    #[test]
    fn test_sale_above_unit_rejected() {
        let l = line(1, 2, cents(450), Some(cents(500)));
        assert!(matches!(
            l.validate(),
            Err(CartLineError::SaleAboveUnit { .. })
        ));
    }

    #[test]
    fn test_sale_equal_to_unit_allowed() {
        let l = line(1, 2, cents(450), Some(cents(450)));
        assert!(l.validate().is_ok());
    }

    #[test]
    fn test_effective_price_prefers_sale() {
        let l = line(1, 3, cents(1000), Some(cents(800)));
        assert_eq!(l.effective_price(), cents(800));
        assert_eq!(l.line_total(), cents(2400));
    }

    #[test]
    fn test_snapshot_totals() {
        let snapshot = CartSnapshot {
            lines: vec![
                line(1, 2, cents(300), None),
                line(2, 1, cents(1250), Some(cents(1000))),
            ],
        };
        assert_eq!(snapshot.item_count(), 3);
        assert_eq!(snapshot.total(), cents(1600));
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CartSnapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.item_count(), 0);
        assert_eq!(snapshot.total(), Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_serde_round_trip() {
        let snapshot = CartSnapshot {
            lines: vec![line(42, 3, cents(725), Some(cents(600)))],
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: CartSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_missing_sale_price_deserializes_as_none() {
        let json = r#"{"lines":[{"product_id":1,"quantity":2,"unit_price":"3.00"}]}"#;
        let snapshot: CartSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.lines[0].sale_price, None);
    }
}
