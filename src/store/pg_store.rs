// src/store/pg_store.rs

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use tracing::warn;

use super::shop_store::{InvoiceSnapshot, ShopStore};
use crate::carts::cart_structs::{Cart, CartLine};
use crate::invoices::invoice_structs::{Invoice, InvoiceLine};
use crate::products::products_structs::Product;
use crate::shared::shop_error::ShopError;

/// SQLSTATE of a foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// `ShopStore` backed by PostgreSQL. Expects the tables from `schema.sql`.
pub struct PgShopStore {
    db_pool: Pool<Postgres>,
}

impl PgShopStore {
    pub fn new(db_pool: Pool<Postgres>) -> Self {
        PgShopStore { db_pool }
    }
}

/// A `cart_items` row joined with its product.
#[derive(FromRow)]
struct CartLineRow {
    id: i32,
    cart_id: i32,
    quantity: i32,
    product_id: i32,
    product_name: String,
    product_price: BigDecimal,
    product_discount: BigDecimal,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        CartLine {
            id: row.id,
            cart_id: row.cart_id,
            quantity: row.quantity,
            product: Product {
                id: row.product_id,
                name: row.product_name,
                price: row.product_price,
                discount: row.product_discount,
            },
        }
    }
}

#[derive(FromRow)]
struct InvoiceRow {
    id: i32,
    user_id: i32,
    created_at: DateTime<Utc>,
    total_price: BigDecimal,
    total_discount: BigDecimal,
    final_amount: BigDecimal,
}

#[derive(FromRow)]
struct InvoiceLineRow {
    id: i32,
    quantity: i32,
    price: BigDecimal,
    discount: BigDecimal,
    total_price: BigDecimal,
    product_id: i32,
    product_name: String,
    product_price: BigDecimal,
    product_discount: BigDecimal,
}

impl From<InvoiceLineRow> for InvoiceLine {
    fn from(row: InvoiceLineRow) -> Self {
        InvoiceLine {
            id: row.id,
            product: Product {
                id: row.product_id,
                name: row.product_name,
                price: row.product_price,
                discount: row.product_discount,
            },
            quantity: row.quantity,
            price: row.price,
            discount: row.discount,
            total_price: row.total_price,
        }
    }
}

#[async_trait]
impl ShopStore for PgShopStore {
    async fn list_products(&self) -> Result<Vec<Product>, ShopError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, discount FROM products ORDER BY id",
        )
        .fetch_all(&self.db_pool)
        .await?;
        Ok(products)
    }

    async fn find_product(&self, product_id: i32) -> Result<Option<Product>, ShopError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, discount FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(product)
    }

    async fn find_cart(&self, user_id: i32) -> Result<Option<Cart>, ShopError> {
        let cart = sqlx::query_as::<_, Cart>("SELECT id, user_id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(cart)
    }

    async fn get_or_create_cart(&self, user_id: i32) -> Result<Cart, ShopError> {
        // The no-op update makes RETURNING yield the existing row as well.
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO carts (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING id, user_id",
        )
        .bind(user_id)
        .fetch_one(&self.db_pool)
        .await?;
        Ok(cart)
    }

    async fn increment_line(&self, cart_id: i32, product_id: i32) -> Result<CartLine, ShopError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            "WITH line AS ( \
                 INSERT INTO cart_items (cart_id, product_id, quantity) VALUES ($1, $2, 1) \
                 ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = cart_items.quantity + 1 \
                 RETURNING id, cart_id, product_id, quantity \
             ) \
             SELECT line.id, line.cart_id, line.quantity, p.id AS product_id, p.name AS product_name, \
                    p.price AS product_price, p.discount AS product_discount \
             FROM line JOIN products p ON p.id = line.product_id",
        )
        .bind(cart_id)
        .bind(product_id)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|err| match &err {
            // The product was deleted after the caller looked it up.
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
                ShopError::NotFound(format!("Product {} not found.", product_id))
            }
            _ => ShopError::from(err),
        })?;
        Ok(row.into())
    }

    async fn set_line_quantity(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<CartLine>, ShopError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            "WITH line AS ( \
                 UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND product_id = $2 \
                 RETURNING id, cart_id, product_id, quantity \
             ) \
             SELECT line.id, line.cart_id, line.quantity, p.id AS product_id, p.name AS product_name, \
                    p.price AS product_price, p.discount AS product_discount \
             FROM line JOIN products p ON p.id = line.product_id",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(row.map(CartLine::from))
    }

    async fn delete_line(&self, cart_id: i32, product_id: i32) -> Result<bool, ShopError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(&self.db_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn cart_lines(&self, cart_id: i32) -> Result<Vec<CartLine>, ShopError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT ci.id, ci.cart_id, ci.quantity, p.id AS product_id, p.name AS product_name, \
                    p.price AS product_price, p.discount AS product_discount \
             FROM cart_items ci JOIN products p ON p.id = ci.product_id \
             WHERE ci.cart_id = $1 ORDER BY ci.id",
        )
        .bind(cart_id)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    /// Checkout runs in a single transaction:
    /// 1. Locks the cart row (`FOR UPDATE`) so concurrent checkouts and cart
    ///    mutations of this user wait for us.
    /// 2. Locks and reads the lines, then builds the snapshot.
    /// 3. Inserts the invoice header and one row per snapshotted line.
    /// 4. Deletes exactly the snapshotted lines and commits.
    ///
    /// Returning early drops the transaction, which rolls it back.
    async fn checkout(&self, user_id: i32, snapshot: &InvoiceSnapshot) -> Result<Invoice, ShopError> {
        let mut transaction = self.db_pool.begin().await?;

        let cart = sqlx::query_as::<_, Cart>(
            "SELECT id, user_id FROM carts WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *transaction)
        .await?;

        // A user who never touched the cart has nothing to invoice either.
        let Some(cart) = cart else {
            transaction.rollback().await?;
            return Err(ShopError::EmptyCart);
        };

        let lines: Vec<CartLine> = sqlx::query_as::<_, CartLineRow>(
            "SELECT ci.id, ci.cart_id, ci.quantity, p.id AS product_id, p.name AS product_name, \
                    p.price AS product_price, p.discount AS product_discount \
             FROM cart_items ci JOIN products p ON p.id = ci.product_id \
             WHERE ci.cart_id = $1 ORDER BY ci.id FOR UPDATE OF ci",
        )
        .bind(cart.id)
        .fetch_all(&mut *transaction)
        .await?
        .into_iter()
        .map(CartLine::from)
        .collect();

        let draft = snapshot(&lines)?;

        let (invoice_id, created_at): (i32, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO invoices (user_id, total_price, total_discount, final_amount) \
             VALUES ($1, $2, $3, $4) RETURNING id, created_at",
        )
        .bind(user_id)
        .bind(&draft.total_price)
        .bind(&draft.total_discount)
        .bind(&draft.final_amount)
        .fetch_one(&mut *transaction)
        .await?;

        let mut line_ids = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let line_id: i32 = sqlx::query_scalar(
                "INSERT INTO invoice_items (invoice_id, product_id, quantity, price, discount, total_price) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
            )
            .bind(invoice_id)
            .bind(line.product.id)
            .bind(line.quantity)
            .bind(&line.price)
            .bind(&line.discount)
            .bind(&line.total_price)
            .fetch_one(&mut *transaction)
            .await?;
            line_ids.push(line_id);
        }

        let cleared = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND id = ANY($2)")
            .bind(cart.id)
            .bind(draft.cart_line_ids())
            .execute(&mut *transaction)
            .await?
            .rows_affected();

        if cleared != draft.lines.len() as u64 {
            warn!(user_id, cleared, expected = draft.lines.len(), "cart changed during checkout");
            transaction.rollback().await?;
            return Err(ShopError::Conflict(
                "The cart changed while the invoice was being generated. Please retry.".to_string(),
            ));
        }

        transaction.commit().await?;

        Ok(draft.into_invoice(invoice_id, user_id, created_at, line_ids))
    }

    async fn find_invoice(&self, user_id: i32, invoice_id: i32) -> Result<Option<Invoice>, ShopError> {
        let header = sqlx::query_as::<_, InvoiceRow>(
            "SELECT id, user_id, created_at, total_price, total_discount, final_amount \
             FROM invoices WHERE id = $1 AND user_id = $2",
        )
        .bind(invoice_id)
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, InvoiceLineRow>(
            "SELECT ii.id, ii.quantity, ii.price, ii.discount, ii.total_price, \
                    p.id AS product_id, p.name AS product_name, \
                    p.price AS product_price, p.discount AS product_discount \
             FROM invoice_items ii JOIN products p ON p.id = ii.product_id \
             WHERE ii.invoice_id = $1 ORDER BY ii.id",
        )
        .bind(header.id)
        .fetch_all(&self.db_pool)
        .await?
        .into_iter()
        .map(InvoiceLine::from)
        .collect();

        Ok(Some(Invoice {
            id: header.id,
            user_id: header.user_id,
            created_at: header.created_at,
            total_price: header.total_price,
            total_discount: header.total_discount,
            final_amount: header.final_amount,
            items,
        }))
    }
}
