// src/pricing/mod.rs

// Pure price arithmetic shared by carts and invoices
pub mod pricing_engine;
