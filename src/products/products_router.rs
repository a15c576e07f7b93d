// src/products/products_router.rs

use actix_web::{get, web, HttpResponse};

use crate::shared::shop_error::ShopError;
use crate::AppState;

/// Lists every product of the catalog, ordered by id.
#[get("/products")]
pub async fn list_products(data: web::Data<AppState>) -> Result<HttpResponse, ShopError> {
    let products = data.store.list_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

/// Fetches one product by id.
#[get("/products/{id}")]
pub async fn find_product(
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ShopError> {
    let product_id = path.into_inner();
    match data.store.find_product(product_id).await? {
        Some(product) => Ok(HttpResponse::Ok().json(product)),
        None => Err(ShopError::NotFound(format!("Product {} not found.", product_id))),
    }
}
