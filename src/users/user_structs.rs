// src/users/user_structs.rs

use serde::{Deserialize, Serialize};

/// The JWT claims this API relies on. Other claims issued by the identity
/// provider are ignored.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // user id
    pub exp: i64, // expiry, unix timestamp
}
