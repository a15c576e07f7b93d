// src/carts/cart_structs.rs

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::pricing::pricing_engine::{cart_totals, line_discount, line_total, Priced};
use crate::products::products_structs::Product;
use crate::shared::shop_error::ShopError;

/// Most units a single quantity request may ask for.
pub const MAX_QUANTITY_PER_REQUEST: i32 = 10;

/// A user's cart. One per user, created on first access.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Cart {
    pub id: i32,
    pub user_id: i32,
}

/// A cart line joined with the product's current catalog values.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: i32,
    pub cart_id: i32,
    pub product: Product,
    pub quantity: i32,
}

impl Priced for CartLine {
    fn list_price(&self) -> &BigDecimal {
        &self.product.price
    }

    fn discount_percent(&self) -> &BigDecimal {
        &self.product.discount
    }

    fn quantity(&self) -> i32 {
        self.quantity
    }
}

/// A cart line as returned to the client, priced live.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub id: i32,
    pub product: Product,
    pub quantity: i32,
    pub total_price: BigDecimal,
    pub total_discount: BigDecimal,
}

impl CartLineView {
    /// Prices the line from the product's current price and discount.
    pub fn live(line: CartLine) -> Self {
        let total_price = line_total(line.list_price(), line.discount_percent(), line.quantity);
        let total_discount = line_discount(line.list_price(), line.discount_percent(), line.quantity);
        CartLineView {
            id: line.id,
            product: line.product,
            quantity: line.quantity,
            total_price,
            total_discount,
        }
    }
}

/// The whole cart with totals derived at read time. Never stored.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub id: i32,
    #[serde(rename = "user")]
    pub user_id: i32,
    pub items: Vec<CartLineView>,
    pub total_price: BigDecimal,
    pub total_discount: BigDecimal,
}

impl CartView {
    pub fn live(cart: &Cart, lines: Vec<CartLine>) -> Self {
        let totals = cart_totals(&lines);
        CartView {
            id: cart.id,
            user_id: cart.user_id,
            items: lines.into_iter().map(CartLineView::live).collect(),
            total_price: totals.total_price,
            total_discount: totals.total_discount,
        }
    }
}

/// Body of the add and remove requests.
#[derive(Debug, Deserialize)]
pub struct ProductRef {
    pub product_id: i32,
}

/// Body of the update-quantity request.
#[derive(Debug, Deserialize)]
pub struct QuantityUpdate {
    pub product_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

impl QuantityUpdate {
    /// Request-level ceiling. Non-positive values pass: they mean "remove the line".
    pub fn validate(&self) -> Result<(), ShopError> {
        if self.quantity > MAX_QUANTITY_PER_REQUEST {
            return Err(ShopError::InvalidInput(format!(
                "You can add a maximum of {} products at a time.",
                MAX_QUANTITY_PER_REQUEST
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn line(id: i32, price: &str, discount: &str, quantity: i32) -> CartLine {
        CartLine {
            id,
            cart_id: 1,
            product: Product {
                id: id * 10,
                name: format!("product {}", id),
                price: dec(price),
                discount: dec(discount),
            },
            quantity,
        }
    }

    #[test]
    fn view_prices_every_line_and_the_cart() {
        let cart = Cart { id: 1, user_id: 7 };
        let view = CartView::live(&cart, vec![line(1, "100.00", "10", 2), line(2, "50.00", "0", 1)]);

        assert_eq!(view.user_id, 7);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].total_price, dec("180"));
        assert_eq!(view.items[0].total_discount, dec("20"));
        assert_eq!(view.items[1].total_price, dec("50"));
        assert_eq!(view.total_price, dec("230"));
        assert_eq!(view.total_discount, dec("20"));
    }

    #[test]
    fn view_serializes_the_owner_as_user() {
        let view = CartView::live(&Cart { id: 3, user_id: 9 }, Vec::new());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["user"], 9);
        assert_eq!(json["items"].as_array().map(Vec::len), Some(0));
    }

    #[rstest]
    #[case(10, true)]
    #[case(1, true)]
    #[case(0, true)]
    #[case(-3, true)]
    #[case(11, false)]
    fn quantity_ceiling_applies_per_request(#[case] quantity: i32, #[case] accepted: bool) {
        let update = QuantityUpdate { product_id: 1, quantity };
        assert_eq!(update.validate().is_ok(), accepted);
    }

    #[test]
    fn quantity_defaults_to_one() {
        let update: QuantityUpdate = serde_json::from_str(r#"{"product_id": 4}"#).unwrap();
        assert_eq!(update.quantity, 1);
    }
}
