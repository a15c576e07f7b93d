// src/products/products_structs.rs

use bigdecimal::BigDecimal;
use serde::Serialize;
use sqlx::FromRow;

/// A catalog product as stored in the database.
/// Read-only for the cart and invoice code.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: BigDecimal,
    /// Percent off `price`, within 0..=100.
    pub discount: BigDecimal,
}
