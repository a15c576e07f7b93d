// src/store/mod.rs

// Persistence port used by the cart and invoice operations
pub mod shop_store;
// PostgreSQL adapter
pub mod pg_store;
// In-memory adapter for tests
#[cfg(any(test, feature = "test-support"))]
pub mod memory_store;

pub use pg_store::PgShopStore;
pub use shop_store::{InvoiceSnapshot, ShopStore};

#[cfg(any(test, feature = "test-support"))]
pub use memory_store::MemoryShopStore;
