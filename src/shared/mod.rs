// src/shared/mod.rs

// Response envelope shared by every module
pub mod shared_structs;
// Error taxonomy and its HTTP mapping
pub mod shop_error;
