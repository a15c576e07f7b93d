// src/shared/shared_structs.rs

use serde::Serialize;

/// Envelope used for every error payload of the API.
#[derive(Serialize)]
pub struct GenericResponse {
    pub status: String,
    /// Stable, machine-readable outcome code (`not_found`, `empty_cart`, ...).
    pub code: String,
    pub message: String,
}

impl GenericResponse {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        GenericResponse {
            status: "error".to_string(),
            code: code.to_string(),
            message: message.into(),
        }
    }
}
