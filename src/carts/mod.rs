// src/carts/mod.rs

// Cart rows, live-priced views and request bodies
pub mod cart_structs;
// Cart operations, each scoped to one user
pub mod cart_service;
// HTTP routes of the cart
pub mod cart_router;
