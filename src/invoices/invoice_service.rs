// src/invoices/invoice_service.rs

use tracing::info;

use super::invoice_structs::{Invoice, InvoiceDraft};
use crate::shared::shop_error::ShopError;
use crate::store::ShopStore;

/// Turns the user's cart into an invoice and empties the cart, atomically.
///
/// Prices, discounts and totals are copied out of the cart at this moment
/// (see [`InvoiceDraft::snapshot`]) and never recomputed afterwards.
pub async fn generate_invoice(store: &dyn ShopStore, user_id: i32) -> Result<Invoice, ShopError> {
    let invoice = store.checkout(user_id, &InvoiceDraft::snapshot).await?;
    info!(
        user_id,
        invoice_id = invoice.id,
        lines = invoice.items.len(),
        final_amount = %invoice.final_amount,
        "invoice generated"
    );
    Ok(invoice)
}

/// An invoice of the caller. Invoices of other users are reported exactly
/// like missing ones.
pub async fn view_invoice(
    store: &dyn ShopStore,
    user_id: i32,
    invoice_id: i32,
) -> Result<Invoice, ShopError> {
    store
        .find_invoice(user_id, invoice_id)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("Invoice {} not found.", invoice_id)))
}
