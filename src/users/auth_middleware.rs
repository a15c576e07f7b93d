// src/users/auth_middleware.rs

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::{debug, error};

use super::user_structs::Claims;
use crate::shared::shop_error::ShopError;
use crate::AppState;

/// The caller, as vouched for by a valid bearer token.
///
/// Taking this extractor as a handler argument is the authorization check of
/// that route: the handler only runs when a valid token was presented, and
/// the resulting `user_id` is passed explicitly to every cart and invoice
/// operation.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
}

impl FromRequest for AuthenticatedUser {
    type Error = ShopError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ShopError> {
    let Some(app_state) = req.app_data::<web::Data<AppState>>() else {
        error!("AppState missing from the app; cannot validate tokens");
        return Err(ShopError::Internal("AppState is not registered".to_string()));
    };

    let header_value = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| ShopError::Unauthorized("Authentication credentials were not provided.".to_string()))?;

    let header_str = header_value
        .to_str()
        .map_err(|_| ShopError::Unauthorized("Invalid authentication token.".to_string()))?;

    let token = header_str.strip_prefix("Bearer ").ok_or_else(|| {
        ShopError::Unauthorized("Invalid token format. Expected 'Bearer <token>'.".to_string())
    })?;

    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(app_state.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        debug!(error = ?e, "rejected bearer token");
        let message = match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token expired.",
            jsonwebtoken::errors::ErrorKind::InvalidSignature => "Invalid token signature.",
            jsonwebtoken::errors::ErrorKind::InvalidToken => "Malformed token.",
            _ => "Invalid authentication token.",
        };
        ShopError::Unauthorized(message.to_string())
    })?;

    Ok(AuthenticatedUser {
        user_id: token_data.claims.sub,
    })
}
