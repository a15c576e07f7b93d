// src/carts/cart_router.rs

use actix_web::{delete, get, patch, post, web, HttpResponse};

use super::cart_service::{self, QuantityOutcome};
use super::cart_structs::{ProductRef, QuantityUpdate};
use crate::shared::shop_error::ShopError;
use crate::users::auth_middleware::AuthenticatedUser;
use crate::AppState;

/// Current cart of the caller with live totals.
#[get("/cart/view")]
pub async fn view_cart(
    data: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ShopError> {
    let cart = cart_service::view_cart(data.store.as_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

/// Adds one unit of the product to the cart.
#[post("/cart/add_to_cart")]
pub async fn add_to_cart(
    data: web::Data<AppState>,
    user: AuthenticatedUser,
    item: web::Json<ProductRef>,
) -> Result<HttpResponse, ShopError> {
    let line = cart_service::add_to_cart(data.store.as_ref(), user.user_id, item.product_id).await?;
    Ok(HttpResponse::Ok().json(line))
}

/// Removes the product's line from the cart.
#[delete("/cart/remove_product")]
pub async fn remove_from_cart(
    data: web::Data<AppState>,
    user: AuthenticatedUser,
    item: web::Json<ProductRef>,
) -> Result<HttpResponse, ShopError> {
    cart_service::remove_from_cart(data.store.as_ref(), user.user_id, item.product_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sets the quantity of a line; answers 204 when the line was deleted.
#[patch("/cart/update-quantity")]
pub async fn update_quantity(
    data: web::Data<AppState>,
    user: AuthenticatedUser,
    update: web::Json<QuantityUpdate>,
) -> Result<HttpResponse, ShopError> {
    update.validate()?;

    let outcome = cart_service::set_line_quantity(
        data.store.as_ref(),
        user.user_id,
        update.product_id,
        update.quantity,
    )
    .await?;

    match outcome {
        QuantityOutcome::Updated(line) => Ok(HttpResponse::Ok().json(line)),
        QuantityOutcome::Removed => Ok(HttpResponse::NoContent().finish()),
    }
}
