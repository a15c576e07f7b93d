// src/users/mod.rs

// JWT claims issued by the identity provider
pub mod user_structs;
// Extractor that turns a bearer token into the calling user
pub mod auth_middleware;
