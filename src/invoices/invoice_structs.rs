// src/invoices/invoice_structs.rs

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::carts::cart_structs::CartLine;
use crate::pricing::pricing_engine::{cart_totals, line_total, Priced};
use crate::products::products_structs::Product;
use crate::shared::shop_error::ShopError;

/// An immutable, price-frozen record of a checkout.
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: i32,
    #[serde(rename = "user")]
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub total_price: BigDecimal,
    pub total_discount: BigDecimal,
    pub final_amount: BigDecimal,
    pub items: Vec<InvoiceLine>,
}

/// A frozen line. `product` carries the current catalog entry for display only;
/// `price`, `discount` and `total_price` are the values at checkout.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceLine {
    pub id: i32,
    pub product: Product,
    pub quantity: i32,
    pub price: BigDecimal,
    pub discount: BigDecimal,
    pub total_price: BigDecimal,
}

/// What checkout is about to persist, computed before any write.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub total_price: BigDecimal,
    pub total_discount: BigDecimal,
    pub final_amount: BigDecimal,
    pub lines: Vec<InvoiceLineDraft>,
}

#[derive(Debug, Clone)]
pub struct InvoiceLineDraft {
    /// Cart line this snapshot was taken from; deleted by the same transaction.
    pub cart_line_id: i32,
    pub product: Product,
    pub quantity: i32,
    pub price: BigDecimal,
    pub discount: BigDecimal,
    pub total_price: BigDecimal,
}

impl Priced for InvoiceLineDraft {
    fn list_price(&self) -> &BigDecimal {
        &self.price
    }

    fn discount_percent(&self) -> &BigDecimal {
        &self.discount
    }

    fn quantity(&self) -> i32 {
        self.quantity
    }
}

impl InvoiceDraft {
    /// Copies price and discount out of every line and freezes the totals.
    ///
    /// Totals are summed over the copies, not the cart lines, so the header
    /// always agrees with the persisted lines.
    pub fn snapshot(lines: &[CartLine]) -> Result<Self, ShopError> {
        if lines.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let lines: Vec<InvoiceLineDraft> = lines
            .iter()
            .map(|line| InvoiceLineDraft {
                cart_line_id: line.id,
                product: line.product.clone(),
                quantity: line.quantity,
                price: line.product.price.clone(),
                discount: line.product.discount.clone(),
                total_price: line_total(&line.product.price, &line.product.discount, line.quantity),
            })
            .collect();

        let totals = cart_totals(&lines);
        let final_amount = &totals.total_price - &totals.total_discount;
        Ok(InvoiceDraft {
            total_price: totals.total_price,
            total_discount: totals.total_discount,
            final_amount,
            lines,
        })
    }

    pub fn cart_line_ids(&self) -> Vec<i32> {
        self.lines.iter().map(|line| line.cart_line_id).collect()
    }

    /// Attaches the identifiers assigned by the store. `line_ids` follows the
    /// order of `self.lines`.
    pub fn into_invoice(
        self,
        id: i32,
        user_id: i32,
        created_at: DateTime<Utc>,
        line_ids: Vec<i32>,
    ) -> Invoice {
        let items = self
            .lines
            .into_iter()
            .zip(line_ids)
            .map(|(line, line_id)| InvoiceLine {
                id: line_id,
                product: line.product,
                quantity: line.quantity,
                price: line.price,
                discount: line.discount,
                total_price: line.total_price,
            })
            .collect();

        Invoice {
            id,
            user_id,
            created_at,
            total_price: self.total_price,
            total_discount: self.total_discount,
            final_amount: self.final_amount,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::Zero;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn cart_line(id: i32, price: &str, discount: &str, quantity: i32) -> CartLine {
        CartLine {
            id,
            cart_id: 1,
            product: Product {
                id: 100 + id,
                name: format!("item {}", id),
                price: dec(price),
                discount: dec(discount),
            },
            quantity,
        }
    }

    #[test]
    fn snapshot_of_an_empty_cart_is_refused() {
        assert!(matches!(InvoiceDraft::snapshot(&[]), Err(ShopError::EmptyCart)));
    }

    #[test]
    fn snapshot_freezes_prices_and_totals() {
        let draft = InvoiceDraft::snapshot(&[
            cart_line(1, "100.00", "10", 2),
            cart_line(2, "50.00", "0", 1),
        ])
        .unwrap();

        assert_eq!(draft.total_price, dec("230"));
        assert_eq!(draft.total_discount, dec("20"));
        assert_eq!(draft.final_amount, dec("210"));
        assert_eq!(draft.cart_line_ids(), vec![1, 2]);

        let first = &draft.lines[0];
        assert_eq!(first.product.id, 101);
        assert_eq!(first.quantity, 2);
        assert_eq!(first.price, dec("100.00"));
        assert_eq!(first.discount, dec("10"));
        assert_eq!(first.total_price, dec("180"));
    }

    #[test]
    fn header_total_is_the_sum_of_line_totals() {
        let draft = InvoiceDraft::snapshot(&[
            cart_line(1, "19.99", "12.5", 3),
            cart_line(2, "0.05", "50", 7),
            cart_line(3, "8.40", "100", 2),
        ])
        .unwrap();

        let summed = draft
            .lines
            .iter()
            .fold(BigDecimal::zero(), |acc, line| acc + &line.total_price);
        assert_eq!(draft.total_price, summed);
        assert_eq!(draft.final_amount, &draft.total_price - &draft.total_discount);
    }

    #[test]
    fn into_invoice_keeps_line_order_and_ids() {
        let draft = InvoiceDraft::snapshot(&[
            cart_line(5, "10.00", "0", 1),
            cart_line(9, "20.00", "0", 1),
        ])
        .unwrap();
        let created_at = Utc::now();
        let invoice = draft.into_invoice(42, 7, created_at, vec![500, 501]);

        assert_eq!(invoice.id, 42);
        assert_eq!(invoice.user_id, 7);
        assert_eq!(invoice.created_at, created_at);
        assert_eq!(invoice.items[0].id, 500);
        assert_eq!(invoice.items[0].product.id, 105);
        assert_eq!(invoice.items[1].id, 501);
        assert_eq!(invoice.items[1].product.id, 109);
    }
}
