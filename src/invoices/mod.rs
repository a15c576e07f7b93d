// src/invoices/mod.rs

// Invoice records and the checkout snapshot
pub mod invoice_structs;
// Checkout and invoice lookup
pub mod invoice_service;
// HTTP routes of the invoices
pub mod invoice_router;
