// src/store/shop_store.rs

use async_trait::async_trait;

use crate::carts::cart_structs::{Cart, CartLine};
use crate::invoices::invoice_structs::{Invoice, InvoiceDraft};
use crate::products::products_structs::Product;
use crate::shared::shop_error::ShopError;

/// Pure function turning the locked cart lines into the invoice to persist.
pub type InvoiceSnapshot = dyn Fn(&[CartLine]) -> Result<InvoiceDraft, ShopError> + Send + Sync;

/// Everything the cart and invoice operations need from persistence.
///
/// Cart lines are always returned joined with the product's *current* catalog
/// values and ordered by line id (insertion order).
#[async_trait]
pub trait ShopStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, ShopError>;

    async fn find_product(&self, product_id: i32) -> Result<Option<Product>, ShopError>;

    async fn find_cart(&self, user_id: i32) -> Result<Option<Cart>, ShopError>;

    /// Returns the user's cart, creating it on first access.
    async fn get_or_create_cart(&self, user_id: i32) -> Result<Cart, ShopError>;

    /// Adds one unit of `product_id`, creating the line with quantity 1 when absent.
    /// Must be a single atomic write so concurrent increments are never lost.
    async fn increment_line(&self, cart_id: i32, product_id: i32) -> Result<CartLine, ShopError>;

    /// Overwrites the quantity of an existing line. `None` when there is no such line.
    /// Callers only pass positive quantities.
    async fn set_line_quantity(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<CartLine>, ShopError>;

    /// Deletes a line. Returns whether a line was there to delete.
    async fn delete_line(&self, cart_id: i32, product_id: i32) -> Result<bool, ShopError>;

    async fn cart_lines(&self, cart_id: i32) -> Result<Vec<CartLine>, ShopError>;

    /// Converts the user's cart into an invoice inside one transaction.
    ///
    /// The cart and its lines are locked, handed to `snapshot`, and the
    /// resulting header and lines are inserted before exactly the snapshotted
    /// cart lines are deleted. Any failure leaves the store untouched.
    async fn checkout(&self, user_id: i32, snapshot: &InvoiceSnapshot) -> Result<Invoice, ShopError>;

    /// Invoice `invoice_id` if it belongs to `user_id`.
    async fn find_invoice(&self, user_id: i32, invoice_id: i32) -> Result<Option<Invoice>, ShopError>;
}
