// src/lib.rs

use std::sync::Arc;

use actix_web::web;

pub mod carts;      // Cart mutations and live totals
pub mod config;     // Environment configuration
pub mod invoices;   // Checkout and invoices
pub mod pricing;    // Discount arithmetic
pub mod products;   // Catalog reads
pub mod shared;     // Response envelope and errors
pub mod store;      // Persistence port and adapters
pub mod users;      // Caller identity

use shared::shop_error::ShopError;
use store::ShopStore;

/// State shared by every route.
pub struct AppState {
    pub store: Arc<dyn ShopStore>,
    pub jwt_secret: String, // verifies the identity provider's tokens
}

/// Registers every route together with the extractor configuration that turns
/// malformed bodies and paths into `invalid_input` errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ShopError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ShopError::InvalidInput(err.to_string()).into()),
    )
    // Catalog
    .service(products::products_router::list_products)
    .service(products::products_router::find_product)
    // Cart
    .service(carts::cart_router::view_cart)
    .service(carts::cart_router::add_to_cart)
    .service(carts::cart_router::remove_from_cart)
    .service(carts::cart_router::update_quantity)
    // Invoices
    .service(invoices::invoice_router::generate_invoice)
    .service(invoices::invoice_router::view_invoice);
}
