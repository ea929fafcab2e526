//! Seams between the session logic and whatever serves the data.
//!
//! [`HttpApi`](crate::http::HttpApi) implements all three against the REST
//! API; tests plug in in-memory fakes. `Arc<T>` forwards to `T`, so one
//! backend can be shared by a session and a dashboard.

use std::sync::Arc;

use async_trait::async_trait;
use pdv_core::{search_products, NewSale, Product, Sale};

use crate::error::ClientResult;

/// Read access to the product catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_products(&self) -> ClientResult<Vec<Product>>;

    /// Sale-screen suggestions: products whose name contains `query`,
    /// ignoring case, in catalog order.
    async fn suggest(&self, query: &str) -> ClientResult<Vec<Product>> {
        let products = self.list_products().await?;
        Ok(search_products(&products, query).into_iter().cloned().collect())
    }
}

/// Write access to the sales ledger.
#[async_trait]
pub trait SaleRecorder: Send + Sync {
    /// Records a sale and returns its store id.
    async fn record_sale(&self, sale: &NewSale) -> ClientResult<i64>;
}

/// Read access to the sales ledger.
#[async_trait]
pub trait SalesSource: Send + Sync {
    async fn list_sales(&self) -> ClientResult<Vec<Sale>>;
}

#[async_trait]
impl<T: Catalog + ?Sized> Catalog for Arc<T> {
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        (**self).list_products().await
    }
}

#[async_trait]
impl<T: SaleRecorder + ?Sized> SaleRecorder for Arc<T> {
    async fn record_sale(&self, sale: &NewSale) -> ClientResult<i64> {
        (**self).record_sale(sale).await
    }
}

#[async_trait]
impl<T: SalesSource + ?Sized> SalesSource for Arc<T> {
    async fn list_sales(&self) -> ClientResult<Vec<Sale>> {
        (**self).list_sales().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shelf(Vec<Product>);

    #[async_trait]
    impl Catalog for Shelf {
        async fn list_products(&self) -> ClientResult<Vec<Product>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_suggest_through_shared_catalog() {
        let shelf = Arc::new(Shelf(vec![
            Product::new(3, "Coca Cola 600ml", 15.0, 50),
            Product::new(2, "Agua Ciel 1L", 12.0, 30),
            Product::new(1, "Coca Cola Light", 16.0, 10),
        ]));

        let ids: Vec<i64> = shelf.suggest("coca").await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(shelf.suggest("").await.unwrap().len(), 3);
        assert!(shelf.suggest("pan").await.unwrap().is_empty());
    }
}
