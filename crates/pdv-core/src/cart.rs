//! # Cart
//!
//! The in-progress, unsaved line-item list building toward one Sale.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart State Machine                               │
//! │                                                                         │
//! │   ┌─────────┐  add_line_item   ┌──────────┐  checkout + record   ┌────┐ │
//! │   │  Empty  │ ───────────────► │ Building │ ───────────────────► │Done│ │
//! │   └─────────┘ ◄─────────────── └──────────┘                      └─┬──┘ │
//! │        ▲       remove last line      │ ▲                            │    │
//! │        │                             └─┘ add / remove / set qty     │    │
//! │        └──────────────────────── clear() ◄──────────────────────────┘    │
//! │                                                                         │
//! │  Derived on every read (never stored):                                  │
//! │    total  = Σ line.total                                                │
//! │    change = payment > total ? payment − total : 0                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Recording the sale and clearing afterwards belongs to the caller: the
//! cart only produces the [`NewSale`] snapshot, so a failed write leaves the
//! lines in place for a retry. After a successful write the caller hands the
//! snapshot's lines to [`Cart::settle`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{LineItem, NewSale, Product};
use crate::validation::validate_quantity;

/// A line in the cart.
///
/// The product name and unit price are frozen when the product is first
/// added; later catalog edits do not reprice the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    #[ts(type = "number")]
    pub product_id: i64,
    pub name: String,
    pub unit_price: f64,
    #[ts(type = "number")]
    pub quantity: i64,
    pub total: f64,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            total: product.price * quantity as f64,
        }
    }

    fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.total = self.unit_price * quantity as f64;
    }

    fn to_line_item(&self) -> LineItem {
        LineItem {
            product_id: Some(self.product_id),
            name: self.name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            total: self.total,
        }
    }
}

/// Whether the cart has anything to sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CartState {
    /// No line items.
    Empty,
    /// At least one line item, not yet paid.
    Building,
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product adds quantity)
/// - Every line has `quantity > 0` and `total == unit_price × quantity`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a product, or merges into the existing line for that product.
    ///
    /// Merging **adds** the quantity and recomputes the line total from the
    /// frozen unit price.
    pub fn add_line_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let merged = line
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| ValidationError::TooLarge {
                    field: "quantity".to_string(),
                })?;
            line.set_quantity(merged);
            return Ok(());
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Removes the line at `index`; other lines keep their order.
    pub fn remove_line_item(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.lines.remove(index))
    }

    /// Replaces the quantity of the line at `index`.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        let err = self.out_of_range(index);
        let line = self.lines.get_mut(index).ok_or(err)?;
        line.set_quantity(quantity);
        Ok(())
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn state(&self) -> CartState {
        if self.lines.is_empty() {
            CartState::Empty
        } else {
            CartState::Building
        }
    }

    /// Σ line totals.
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.total).sum()
    }

    /// Change owed for `payment`; never negative.
    pub fn change(&self, payment: f64) -> f64 {
        change_for(payment, self.total())
    }

    /// Builds the ledger entry for this cart without clearing it.
    ///
    /// Only valid while `Building`.
    pub fn checkout(&self, payment: f64, date: impl Into<String>) -> CoreResult<NewSale> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let items: Vec<LineItem> = self.lines.iter().map(CartLine::to_line_item).collect();
        let total = self.total();

        Ok(NewSale {
            items: serde_json::to_value(items).map_err(|e| CoreError::Encoding(e.to_string()))?,
            total,
            payment,
            change: change_for(payment, total),
            date: date.into(),
        })
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Takes the `sold` lines out of the cart after their sale was recorded.
    ///
    /// Each sold line subtracts its quantity from the line for the same
    /// product; lines that reach zero are dropped. Whatever was added while
    /// the sale was being written stays in the cart.
    pub fn settle(&mut self, sold: &[CartLine]) {
        for sold_line in sold {
            let Some(pos) = self
                .lines
                .iter()
                .position(|l| l.product_id == sold_line.product_id)
            else {
                continue;
            };

            let remaining = self.lines[pos].quantity - sold_line.quantity;
            if remaining > 0 {
                self.lines[pos].set_quantity(remaining);
            } else {
                self.lines.remove(pos);
            }
        }
    }

    fn out_of_range(&self, index: usize) -> CoreError {
        CoreError::LineOutOfRange {
            index,
            len: self.lines.len(),
        }
    }
}

/// `max(0, payment − total)`.
pub fn change_for(payment: f64, total: f64) -> f64 {
    if payment > total {
        payment - total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_product(id: i64, price: f64) -> Product {
        Product::new(id, format!("Product {}", id), price, 10)
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        cart.add_line_item(&test_product(1, 9.5), 2).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total(), 19.0);
        assert_eq!(cart.state(), CartState::Building);
    }

    #[test]
    fn test_cart_add_same_product_merges_by_addition() {
        let mut cart = Cart::new();
        let product = test_product(1, 15.0);

        cart.add_line_item(&product, 2).unwrap();
        cart.add_line_item(&product, 3).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.lines()[0].total, 5.0 * 15.0);
    }

    #[test]
    fn test_cart_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        let err = cart.add_line_item(&test_product(1, 1.0), 0).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_overflow_is_rejected() {
        let mut cart = Cart::new();
        let product = test_product(1, 1.0);
        cart.add_line_item(&product, i64::MAX).unwrap();

        let err = cart.add_line_item(&product, 1).unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation(ValidationError::TooLarge {
                field: "quantity".to_string()
            })
        );
        assert_eq!(cart.lines()[0].quantity, i64::MAX);
    }

    #[test]
    fn test_remove_line_keeps_order() {
        let mut cart = Cart::new();
        for id in 1..=3 {
            cart.add_line_item(&test_product(id, 1.0), 1).unwrap();
        }

        let removed = cart.remove_line_item(1).unwrap();
        assert_eq!(removed.product_id, 2);
        let ids: Vec<i64> = cart.lines().iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![1, 3]);

        assert_eq!(
            cart.remove_line_item(5),
            Err(CoreError::LineOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_set_quantity_recomputes_line_total() {
        let mut cart = Cart::new();
        cart.add_line_item(&test_product(1, 2.5), 1).unwrap();
        cart.set_quantity(0, 4).unwrap();

        assert_eq!(cart.lines()[0].total, 10.0);
        assert!(cart.set_quantity(0, 0).is_err());
    }

    #[test]
    fn test_change_computation() {
        assert_eq!(change_for(100.0, 80.0), 20.0);
        assert_eq!(change_for(50.0, 80.0), 0.0);
        assert_eq!(change_for(80.0, 80.0), 0.0);
    }

    #[test]
    fn test_checkout_snapshot() {
        let mut cart = Cart::new();
        cart.add_line_item(&test_product(1, 30.0), 2).unwrap();
        cart.add_line_item(&test_product(2, 20.0), 1).unwrap();

        let sale = cart.checkout(100.0, "8/9/2025, 3:28:41 PM").unwrap();
        assert_eq!(sale.total, 80.0);
        assert_eq!(sale.change, 20.0);
        assert_eq!(sale.items[0]["name"], json!("Product 1"));
        assert_eq!(sale.items[0]["total"], json!(60.0));

        // Snapshot only: the cart is still there until the caller clears it.
        assert_eq!(cart.state(), CartState::Building);
    }

    #[test]
    fn test_settle_keeps_lines_added_after_checkout() {
        let mut cart = Cart::new();
        cart.add_line_item(&test_product(1, 10.0), 2).unwrap();
        cart.add_line_item(&test_product(2, 5.0), 1).unwrap();
        let sold = cart.lines().to_vec();

        // Scanned while the sale was being written.
        cart.add_line_item(&test_product(1, 10.0), 3).unwrap();
        cart.add_line_item(&test_product(3, 1.0), 4).unwrap();

        cart.settle(&sold);

        let left: Vec<(i64, i64)> = cart.lines().iter().map(|l| (l.product_id, l.quantity)).collect();
        assert_eq!(left, vec![(1, 3), (3, 4)]);
        assert_eq!(cart.lines()[0].total, 30.0);
    }

    #[test]
    fn test_settle_everything_sold_empties_cart() {
        let mut cart = Cart::new();
        cart.add_line_item(&test_product(1, 10.0), 2).unwrap();
        let sold = cart.lines().to_vec();

        cart.settle(&sold);
        assert_eq!(cart.state(), CartState::Empty);
    }

    #[test]
    fn test_checkout_empty_cart_fails() {
        assert_eq!(Cart::new().checkout(10.0, "now"), Err(CoreError::EmptyCart));
    }
}
