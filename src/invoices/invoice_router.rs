// src/invoices/invoice_router.rs

use actix_web::{get, web, HttpResponse};

use super::invoice_service;
use crate::shared::shop_error::ShopError;
use crate::users::auth_middleware::AuthenticatedUser;
use crate::AppState;

/// Checks out the caller's cart.
///
/// Kept as GET for compatibility with existing clients even though it creates
/// a record; answers 201 with the new invoice.
#[get("/invoice/generate")]
pub async fn generate_invoice(
    data: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ShopError> {
    let invoice = invoice_service::generate_invoice(data.store.as_ref(), user.user_id).await?;
    Ok(HttpResponse::Created().json(invoice))
}

/// One invoice of the caller.
#[get("/invoice/{invoice_id}/detail")]
pub async fn view_invoice(
    data: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ShopError> {
    let invoice_id = path.into_inner();
    let invoice = invoice_service::view_invoice(data.store.as_ref(), user.user_id, invoice_id).await?;
    Ok(HttpResponse::Ok().json(invoice))
}
