//! # Sale Repository
//!
//! The sales ledger: append and list, nothing else. Rows are never updated
//! or deleted.
//!
//! `items` is stored verbatim as JSON text and totals are written exactly as
//! the client computed them.

use pdv_core::{NewSale, Sale};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    items: String,
    total: f64,
    payment: f64,
    change: f64,
    date: String,
}

impl TryFrom<SaleRow> for Sale {
    type Error = DbError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        let items: Value = serde_json::from_str(&row.items).map_err(|e| DbError::CorruptRow {
            table: "sales",
            column: "items",
            id: row.id,
            reason: e.to_string(),
        })?;

        Ok(Sale {
            id: row.id,
            items,
            total: row.total,
            payment: row.payment,
            change: row.change,
            date: row.date,
        })
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Appends a sale and returns its id.
    pub async fn record(&self, sale: &NewSale) -> DbResult<i64> {
        let items =
            serde_json::to_string(&sale.items).map_err(|e| DbError::Internal(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO sales (items, total, payment, change, date) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(items)
        .bind(sale.total)
        .bind(sale.payment)
        .bind(sale.change)
        .bind(&sale.date)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id = %id, total = sale.total, "Sale recorded");
        Ok(id)
    }

    /// The whole ledger, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, items, total, payment, change, date FROM sales ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed sales");
        rows.into_iter().map(Sale::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use pdv_core::cart::Cart;
    use pdv_core::report::SaleRecord;
    use pdv_core::NewProduct;
    use serde_json::json;

    fn sale(items: Value, total: f64, date: &str) -> NewSale {
        NewSale {
            items,
            total,
            payment: total,
            change: 0.0,
            date: date.to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_and_list_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sales();

        let first = repo.record(&sale(json!([]), 10.0, "1/9/2025, 9:00:00 a.m.")).await.unwrap();
        let second = repo
            .record(&sale(json!([{ "name": "Pan", "quantity": 1, "unitPrice": 5.0, "total": 5.0 }]), 5.0, "2/9/2025, 9:00:00 a.m."))
            .await
            .unwrap();

        let sales = repo.list().await.unwrap();
        assert_eq!(sales.iter().map(|s| s.id).collect::<Vec<_>>(), vec![second, first]);
        assert_eq!(sales[0].items[0]["name"], json!("Pan"));
        assert_eq!(sales[1].items, json!([]));
    }

    #[tokio::test]
    async fn test_null_items_are_stored_as_empty_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let body: NewSale =
            serde_json::from_value(json!({ "items": null, "total": 40.0, "date": "now" })).unwrap();

        db.sales().record(&body).await.unwrap();

        let raw: String = sqlx::query_scalar("SELECT items FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(raw, "[]");

        let sales = db.sales().list().await.unwrap();
        assert_eq!(sales[0].items, json!([]));
        assert_eq!(SaleRecord::from(&sales[0]).amount(), 40.0);
    }

    #[tokio::test]
    async fn test_totals_are_stored_verbatim() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let new_sale = NewSale {
            items: json!([{ "name": "Pan", "total": 5.0 }]),
            total: 999.0,
            payment: 1000.0,
            change: 1.0,
            date: "now".to_string(),
        };

        let id = db.sales().record(&new_sale).await.unwrap();
        let stored = db.sales().list().await.unwrap().remove(0);

        assert_eq!(stored.id, id);
        assert_eq!(stored.total, 999.0);
        assert_eq!(stored.change, 1.0);
    }

    #[tokio::test]
    async fn test_deleting_product_leaves_sales_untouched() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = db
            .products()
            .create(&NewProduct::new("Coca Cola 600ml").price(15.0).stock(50))
            .await
            .unwrap();
        let product = db.products().get(product_id).await.unwrap().unwrap();

        let mut cart = Cart::new();
        cart.add_line_item(&product, 2).unwrap();
        let sale_id = db
            .sales()
            .record(&cart.checkout(50.0, "8/9/2025, 3:28:41 p.m.").unwrap())
            .await
            .unwrap();

        db.products().delete(product_id).await.unwrap();

        let sales = db.sales().list().await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].id, sale_id);
        let lines = sales[0].line_items().unwrap();
        assert_eq!(lines[0].name, "Coca Cola 600ml");
        assert_eq!(lines[0].total, 30.0);
        assert_eq!(sales[0].change, 20.0);
    }

    #[tokio::test]
    async fn test_corrupt_items_are_reported() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO sales (items, date) VALUES ('[oops', 'now')")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(matches!(
            db.sales().list().await,
            Err(DbError::CorruptRow { table: "sales", .. })
        ));
    }
}
