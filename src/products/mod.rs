// src/products/mod.rs

// Product row and response shapes
pub mod products_structs;
// Read-only catalog routes
pub mod products_router;
