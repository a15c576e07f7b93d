// src/carts/cart_service.rs

use tracing::info;

use super::cart_structs::{CartLineView, CartView};
use crate::shared::shop_error::ShopError;
use crate::store::ShopStore;

/// Result of a quantity update.
#[derive(Debug)]
pub enum QuantityOutcome {
    Updated(CartLineView),
    /// The requested quantity was zero or less and the line was deleted.
    Removed,
}

fn product_not_found(product_id: i32) -> ShopError {
    ShopError::NotFound(format!("Product {} not found.", product_id))
}

fn line_not_found(product_id: i32) -> ShopError {
    ShopError::NotFound(format!("Product {} is not in the cart.", product_id))
}

async fn ensure_product(store: &dyn ShopStore, product_id: i32) -> Result<(), ShopError> {
    match store.find_product(product_id).await? {
        Some(_) => Ok(()),
        None => Err(product_not_found(product_id)),
    }
}

/// Adds one unit of a product to the user's cart, creating the cart and the
/// line on first use.
pub async fn add_to_cart(
    store: &dyn ShopStore,
    user_id: i32,
    product_id: i32,
) -> Result<CartLineView, ShopError> {
    ensure_product(store, product_id).await?;
    let cart = store.get_or_create_cart(user_id).await?;
    let line = store.increment_line(cart.id, product_id).await?;
    info!(user_id, product_id, quantity = line.quantity, "product added to cart");
    Ok(CartLineView::live(line))
}

/// Deletes the line for a product whatever its quantity.
/// Removing a line that is not there is an error, not a no-op.
pub async fn remove_from_cart(
    store: &dyn ShopStore,
    user_id: i32,
    product_id: i32,
) -> Result<(), ShopError> {
    ensure_product(store, product_id).await?;
    let cart = store
        .find_cart(user_id)
        .await?
        .ok_or_else(|| line_not_found(product_id))?;

    if !store.delete_line(cart.id, product_id).await? {
        return Err(line_not_found(product_id));
    }
    info!(user_id, product_id, "product removed from cart");
    Ok(())
}

/// Sets the quantity of an existing line. Zero or less deletes the line.
/// There is no upper bound here; the per-request ceiling belongs to request validation.
pub async fn set_line_quantity(
    store: &dyn ShopStore,
    user_id: i32,
    product_id: i32,
    quantity: i32,
) -> Result<QuantityOutcome, ShopError> {
    ensure_product(store, product_id).await?;
    let cart = store
        .find_cart(user_id)
        .await?
        .ok_or_else(|| line_not_found(product_id))?;

    if quantity <= 0 {
        if !store.delete_line(cart.id, product_id).await? {
            return Err(line_not_found(product_id));
        }
        info!(user_id, product_id, "quantity dropped to zero, line removed");
        return Ok(QuantityOutcome::Removed);
    }

    let line = store
        .set_line_quantity(cart.id, product_id, quantity)
        .await?
        .ok_or_else(|| line_not_found(product_id))?;
    Ok(QuantityOutcome::Updated(CartLineView::live(line)))
}

/// The user's cart priced with current product values.
pub async fn view_cart(store: &dyn ShopStore, user_id: i32) -> Result<CartView, ShopError> {
    let cart = store.get_or_create_cart(user_id).await?;
    let lines = store.cart_lines(cart.id).await?;
    Ok(CartView::live(&cart, lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::products_structs::Product;
    use crate::store::MemoryShopStore;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    const USER: i32 = 7;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn store_with_product() -> (MemoryShopStore, Product) {
        let store = MemoryShopStore::new();
        let product = store.insert_product("Linen shirt", dec("100.00"), dec("10"));
        (store, product)
    }

    #[actix_web::test]
    async fn adding_twice_increments_one_line() {
        let (store, product) = store_with_product();

        let first = add_to_cart(&store, USER, product.id).await.unwrap();
        let second = add_to_cart(&store, USER, product.id).await.unwrap();

        assert_eq!(first.quantity, 1);
        assert_eq!(second.id, first.id);
        assert_eq!(second.quantity, 2);
        assert_eq!(second.total_price, dec("180"));
        assert_eq!(second.total_discount, dec("20"));
        assert_eq!(view_cart(&store, USER).await.unwrap().items.len(), 1);
    }

    #[actix_web::test]
    async fn adding_an_unknown_product_is_not_found() {
        let store = MemoryShopStore::new();
        let err = add_to_cart(&store, USER, 999).await.unwrap_err();
        assert!(matches!(err, ShopError::NotFound(_)));
        assert_eq!(store.cart_line_count(), 0);
    }

    #[actix_web::test]
    async fn removing_an_absent_line_is_not_found() {
        let (store, product) = store_with_product();
        add_to_cart(&store, USER, product.id).await.unwrap();

        remove_from_cart(&store, USER, product.id).await.unwrap();
        let again = remove_from_cart(&store, USER, product.id).await.unwrap_err();

        assert!(matches!(again, ShopError::NotFound(_)));
    }

    #[actix_web::test]
    async fn removing_deletes_whatever_the_quantity() {
        let (store, product) = store_with_product();
        for _ in 0..3 {
            add_to_cart(&store, USER, product.id).await.unwrap();
        }
        remove_from_cart(&store, USER, product.id).await.unwrap();
        assert!(view_cart(&store, USER).await.unwrap().items.is_empty());
    }

    #[actix_web::test]
    async fn removing_from_a_cart_that_never_existed_is_not_found() {
        let (store, product) = store_with_product();
        let err = remove_from_cart(&store, USER, product.id).await.unwrap_err();
        assert!(matches!(err, ShopError::NotFound(_)));
    }

    #[actix_web::test]
    async fn zero_quantity_deletes_the_line() {
        let (store, product) = store_with_product();
        add_to_cart(&store, USER, product.id).await.unwrap();

        let outcome = set_line_quantity(&store, USER, product.id, 0).await.unwrap();

        assert!(matches!(outcome, QuantityOutcome::Removed));
        assert!(view_cart(&store, USER).await.unwrap().items.is_empty());
    }

    #[actix_web::test]
    async fn negative_quantity_deletes_the_line() {
        let (store, product) = store_with_product();
        add_to_cart(&store, USER, product.id).await.unwrap();

        let outcome = set_line_quantity(&store, USER, product.id, -4).await.unwrap();

        assert!(matches!(outcome, QuantityOutcome::Removed));
        assert_eq!(store.cart_line_count(), 0);
    }

    #[actix_web::test]
    async fn positive_quantity_is_set_without_upper_bound() {
        let (store, product) = store_with_product();
        add_to_cart(&store, USER, product.id).await.unwrap();

        let outcome = set_line_quantity(&store, USER, product.id, 25).await.unwrap();

        match outcome {
            QuantityOutcome::Updated(line) => {
                assert_eq!(line.quantity, 25);
                assert_eq!(line.total_price, dec("2250"));
                assert_eq!(line.total_discount, dec("250"));
            }
            QuantityOutcome::Removed => panic!("line should have been kept"),
        }
    }

    #[actix_web::test]
    async fn updating_a_line_that_is_not_there_is_not_found() {
        let (store, product) = store_with_product();
        let other = store.insert_product("Scarf", dec("20.00"), dec("0"));
        add_to_cart(&store, USER, other.id).await.unwrap();

        let update = set_line_quantity(&store, USER, product.id, 3).await.unwrap_err();
        let delete = set_line_quantity(&store, USER, product.id, 0).await.unwrap_err();

        assert!(matches!(update, ShopError::NotFound(_)));
        assert!(matches!(delete, ShopError::NotFound(_)));
    }

    #[actix_web::test]
    async fn view_creates_an_empty_cart_on_first_access() {
        let store = MemoryShopStore::new();
        let cart = view_cart(&store, USER).await.unwrap();
        assert_eq!(cart.user_id, USER);
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_price, dec("0"));
    }

    #[actix_web::test]
    async fn view_uses_the_current_product_price() {
        let (store, product) = store_with_product();
        add_to_cart(&store, USER, product.id).await.unwrap();

        store.set_product_price(product.id, dec("150.00"));
        let cart = view_cart(&store, USER).await.unwrap();

        assert_eq!(cart.items[0].product.price, dec("150.00"));
        assert_eq!(cart.items[0].total_price, dec("135"));
        assert_eq!(cart.total_price, dec("135"));
        assert_eq!(cart.total_discount, dec("15"));
    }

    #[actix_web::test]
    async fn carts_are_per_user() {
        let (store, product) = store_with_product();
        add_to_cart(&store, USER, product.id).await.unwrap();

        let other = view_cart(&store, USER + 1).await.unwrap();
        assert!(other.items.is_empty());
        let err = remove_from_cart(&store, USER + 1, product.id).await.unwrap_err();
        assert!(matches!(err, ShopError::NotFound(_)));
    }

    #[actix_web::test]
    async fn incrementing_a_product_that_no_longer_exists_is_not_found() {
        let store = MemoryShopStore::new();
        let cart = store.get_or_create_cart(USER).await.unwrap();

        let err = store.increment_line(cart.id, 404).await.unwrap_err();

        assert!(matches!(err, ShopError::NotFound(_)));
        assert_eq!(store.cart_line_count(), 0);
    }
}
