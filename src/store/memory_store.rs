// src/store/memory_store.rs

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;

use super::shop_store::{InvoiceSnapshot, ShopStore};
use crate::carts::cart_structs::{Cart, CartLine};
use crate::invoices::invoice_structs::{Invoice, InvoiceLine};
use crate::products::products_structs::Product;
use crate::shared::shop_error::ShopError;

/// In-memory `ShopStore` for tests.
///
/// A single mutex guards all tables, so every operation (checkout included) is
/// serialized. Checkout works on a copy of the tables and only swaps it in on
/// success, which gives it the same all-or-nothing behaviour as the database
/// transaction.
#[derive(Default)]
pub struct MemoryShopStore {
    state: Mutex<MemoryState>,
}

#[derive(Default, Clone)]
struct MemoryState {
    last_id: i32,
    products: BTreeMap<i32, Product>,
    carts: BTreeMap<i32, Cart>,
    cart_items: BTreeMap<i32, StoredCartItem>,
    invoices: BTreeMap<i32, StoredInvoice>,
    invoice_items: BTreeMap<i32, StoredInvoiceItem>,
    /// Checkout fails after inserting this many invoice lines.
    fail_after_invoice_lines: Option<usize>,
}

#[derive(Clone)]
struct StoredCartItem {
    id: i32,
    cart_id: i32,
    product_id: i32,
    quantity: i32,
}

#[derive(Clone)]
struct StoredInvoice {
    id: i32,
    user_id: i32,
    created_at: chrono::DateTime<Utc>,
    total_price: BigDecimal,
    total_discount: BigDecimal,
    final_amount: BigDecimal,
}

#[derive(Clone)]
struct StoredInvoiceItem {
    id: i32,
    invoice_id: i32,
    product_id: i32,
    quantity: i32,
    price: BigDecimal,
    discount: BigDecimal,
    total_price: BigDecimal,
}

impl MemoryState {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn product(&self, product_id: i32) -> Result<Product, ShopError> {
        self.products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| ShopError::Database(sqlx::Error::RowNotFound))
    }

    fn cart_of(&self, user_id: i32) -> Option<Cart> {
        self.carts.values().find(|cart| cart.user_id == user_id).cloned()
    }

    fn line(&self, item: &StoredCartItem) -> Result<CartLine, ShopError> {
        Ok(CartLine {
            id: item.id,
            cart_id: item.cart_id,
            product: self.product(item.product_id)?,
            quantity: item.quantity,
        })
    }

    fn item_id(&self, cart_id: i32, product_id: i32) -> Option<i32> {
        self.cart_items
            .values()
            .find(|item| item.cart_id == cart_id && item.product_id == product_id)
            .map(|item| item.id)
    }

    fn lines_of(&self, cart_id: i32) -> Result<Vec<CartLine>, ShopError> {
        self.cart_items
            .values()
            .filter(|item| item.cart_id == cart_id)
            .map(|item| self.line(item))
            .collect()
    }

    fn invoice(&self, stored: &StoredInvoice) -> Result<Invoice, ShopError> {
        let items = self
            .invoice_items
            .values()
            .filter(|item| item.invoice_id == stored.id)
            .map(|item| {
                Ok(InvoiceLine {
                    id: item.id,
                    product: self.product(item.product_id)?,
                    quantity: item.quantity,
                    price: item.price.clone(),
                    discount: item.discount.clone(),
                    total_price: item.total_price.clone(),
                })
            })
            .collect::<Result<Vec<_>, ShopError>>()?;

        Ok(Invoice {
            id: stored.id,
            user_id: stored.user_id,
            created_at: stored.created_at,
            total_price: stored.total_price.clone(),
            total_discount: stored.total_discount.clone(),
            final_amount: stored.final_amount.clone(),
            items,
        })
    }
}

impl MemoryShopStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a product to the catalog.
    pub fn insert_product(&self, name: &str, price: BigDecimal, discount: BigDecimal) -> Product {
        let mut state = self.lock();
        let product = Product {
            id: state.next_id(),
            name: name.to_string(),
            price,
            discount,
        };
        state.products.insert(product.id, product.clone());
        product
    }

    /// Changes a product's list price, as the catalog administration would.
    pub fn set_product_price(&self, product_id: i32, price: BigDecimal) {
        if let Some(product) = self.lock().products.get_mut(&product_id) {
            product.price = price;
        }
    }

    /// Makes the next checkouts fail after `count` invoice lines were written.
    pub fn fail_after_invoice_lines(&self, count: usize) {
        self.lock().fail_after_invoice_lines = Some(count);
    }

    pub fn invoice_count(&self) -> usize {
        self.lock().invoices.len()
    }

    pub fn invoice_line_count(&self) -> usize {
        self.lock().invoice_items.len()
    }

    pub fn cart_line_count(&self) -> usize {
        self.lock().cart_items.len()
    }
}

#[async_trait]
impl ShopStore for MemoryShopStore {
    async fn list_products(&self) -> Result<Vec<Product>, ShopError> {
        Ok(self.lock().products.values().cloned().collect())
    }

    async fn find_product(&self, product_id: i32) -> Result<Option<Product>, ShopError> {
        Ok(self.lock().products.get(&product_id).cloned())
    }

    async fn find_cart(&self, user_id: i32) -> Result<Option<Cart>, ShopError> {
        Ok(self.lock().cart_of(user_id))
    }

    async fn get_or_create_cart(&self, user_id: i32) -> Result<Cart, ShopError> {
        let mut state = self.lock();
        if let Some(cart) = state.cart_of(user_id) {
            return Ok(cart);
        }
        let cart = Cart {
            id: state.next_id(),
            user_id,
        };
        state.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn increment_line(&self, cart_id: i32, product_id: i32) -> Result<CartLine, ShopError> {
        let mut state = self.lock();
        if !state.products.contains_key(&product_id) {
            return Err(ShopError::NotFound(format!("Product {} not found.", product_id)));
        }
        let id = match state.item_id(cart_id, product_id) {
            Some(id) => {
                if let Some(item) = state.cart_items.get_mut(&id) {
                    item.quantity += 1;
                }
                id
            }
            None => {
                let id = state.next_id();
                state.cart_items.insert(
                    id,
                    StoredCartItem {
                        id,
                        cart_id,
                        product_id,
                        quantity: 1,
                    },
                );
                id
            }
        };
        let item = state
            .cart_items
            .get(&id)
            .cloned()
            .ok_or_else(|| ShopError::Database(sqlx::Error::RowNotFound))?;
        state.line(&item)
    }

    async fn set_line_quantity(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<CartLine>, ShopError> {
        let mut state = self.lock();
        let Some(id) = state.item_id(cart_id, product_id) else {
            return Ok(None);
        };
        let item = match state.cart_items.get_mut(&id) {
            Some(item) => {
                item.quantity = quantity;
                item.clone()
            }
            None => return Ok(None),
        };
        state.line(&item).map(Some)
    }

    async fn delete_line(&self, cart_id: i32, product_id: i32) -> Result<bool, ShopError> {
        let mut state = self.lock();
        let Some(id) = state.item_id(cart_id, product_id) else {
            return Ok(false);
        };
        Ok(state.cart_items.remove(&id).is_some())
    }

    async fn cart_lines(&self, cart_id: i32) -> Result<Vec<CartLine>, ShopError> {
        self.lock().lines_of(cart_id)
    }

    async fn checkout(&self, user_id: i32, snapshot: &InvoiceSnapshot) -> Result<Invoice, ShopError> {
        let mut state = self.lock();

        let Some(cart) = state.cart_of(user_id) else {
            return Err(ShopError::EmptyCart);
        };
        let lines = state.lines_of(cart.id)?;
        let draft = snapshot(&lines)?;

        // Work on a copy; the live tables change only once everything succeeded.
        let mut staged = state.clone();
        let invoice_id = staged.next_id();
        let created_at = Utc::now();
        staged.invoices.insert(
            invoice_id,
            StoredInvoice {
                id: invoice_id,
                user_id,
                created_at,
                total_price: draft.total_price.clone(),
                total_discount: draft.total_discount.clone(),
                final_amount: draft.final_amount.clone(),
            },
        );

        let mut line_ids = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            if staged.fail_after_invoice_lines == Some(line_ids.len()) {
                return Err(ShopError::Database(sqlx::Error::Protocol(
                    "injected failure while writing invoice lines".to_string(),
                )));
            }
            let line_id = staged.next_id();
            staged.invoice_items.insert(
                line_id,
                StoredInvoiceItem {
                    id: line_id,
                    invoice_id,
                    product_id: line.product.id,
                    quantity: line.quantity,
                    price: line.price.clone(),
                    discount: line.discount.clone(),
                    total_price: line.total_price.clone(),
                },
            );
            line_ids.push(line_id);
        }

        for cart_line_id in draft.cart_line_ids() {
            staged.cart_items.remove(&cart_line_id);
        }

        *state = staged;
        Ok(draft.into_invoice(invoice_id, user_id, created_at, line_ids))
    }

    async fn find_invoice(&self, user_id: i32, invoice_id: i32) -> Result<Option<Invoice>, ShopError> {
        let state = self.lock();
        match state.invoices.get(&invoice_id) {
            Some(stored) if stored.user_id == user_id => state.invoice(stored).map(Some),
            _ => Ok(None),
        }
    }
}
