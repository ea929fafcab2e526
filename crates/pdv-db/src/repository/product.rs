//! # Product Repository
//!
//! Catalog CRUD. `metadata` is an opaque JSON object kept in a TEXT column;
//! it is never merged key by key, only replaced or cleared.
//!
//! ## Partial Update
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PUT /products/7  { "price": 12.5, "metadata": null }                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductPatch { price: Some(12.5), metadata: Some(None), .. }           │
//! │       │                                                                 │
//! │       ▼  QueryBuilder, one SET clause per present field                 │
//! │  UPDATE products SET price = ?, metadata = ? WHERE id = ?               │
//! │       │                                                                 │
//! │       ├── no field present   → DbError::NoFieldsToUpdate                │
//! │       └── 0 rows affected    → DbError::NotFound                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pdv_core::{Metadata, NewProduct, Product, ProductPatch};
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: f64,
    stock: i64,
    metadata: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let metadata = match row.metadata {
            Some(text) => decode_metadata(row.id, &text)?,
            None => None,
        };

        Ok(Product {
            id: row.id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            metadata,
        })
    }
}

fn decode_metadata(id: i64, text: &str) -> DbResult<Option<Metadata>> {
    let corrupt = |reason: String| DbError::CorruptRow {
        table: "products",
        column: "metadata",
        id,
        reason,
    };

    match serde_json::from_str::<Value>(text).map_err(|e| corrupt(e.to_string()))? {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        other => Err(corrupt(format!("expected an object, found {}", other))),
    }
}

fn encode_metadata(metadata: Option<&Metadata>) -> DbResult<Option<String>> {
    metadata
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| DbError::Internal(e.to_string()))
}

const SELECT_PRODUCT: &str = "SELECT id, name, price, stock, metadata FROM products";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let id = repo.create(&NewProduct::new("Agua 1L").price(12.0)).await?;
/// let product = repo.get(id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products, newest first. No pagination.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} ORDER BY id DESC"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listed products");
        rows.into_iter().map(Product::try_from).collect()
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Inserts a product and returns the store-assigned id.
    ///
    /// Missing `price` / `stock` default to `0`. The input is expected to be
    /// validated already.
    pub async fn create(&self, product: &NewProduct) -> DbResult<i64> {
        debug!(name = %product.name, "Inserting product");

        let metadata = encode_metadata(product.metadata.as_ref())?;

        let result = sqlx::query(
            "INSERT INTO products (name, price, stock, metadata) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&product.name)
        .bind(product.price.unwrap_or(0.0))
        .bind(product.stock.unwrap_or(0))
        .bind(metadata)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id = %id, "Product created");
        Ok(id)
    }

    /// Writes only the fields present in `patch`.
    ///
    /// ## Returns
    /// * `Err(DbError::NoFieldsToUpdate)` - patch carries no field; nothing written
    /// * `Err(DbError::NotFound)` - no product with that id
    pub async fn update(&self, id: i64, patch: &ProductPatch) -> DbResult<()> {
        if patch.is_empty() {
            return Err(DbError::NoFieldsToUpdate);
        }

        debug!(id = %id, "Updating product");

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE products SET ");
        let mut set = builder.separated(", ");

        if let Some(name) = &patch.name {
            set.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(price) = patch.price {
            set.push("price = ").push_bind_unseparated(price);
        }
        if let Some(stock) = patch.stock {
            set.push("stock = ").push_bind_unseparated(stock);
        }
        if let Some(metadata) = &patch.metadata {
            set.push("metadata = ")
                .push_bind_unseparated(encode_metadata(metadata.as_ref())?);
        }

        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Hard delete. Recorded sales keep their own copy of the product name.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics and the seeder).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
