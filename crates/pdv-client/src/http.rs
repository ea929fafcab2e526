//! Typed client for the PDV REST API.
//!
//! Every non-2xx answer becomes [`ClientError::Status`], carrying the
//! `{code, message}` body when the server sent one.

use async_trait::async_trait;
use pdv_core::{Ack, Created, NewProduct, NewSale, Product, ProductPatch, Sale};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::backend::{Catalog, SaleRecorder, SalesSource};
use crate::error::{ClientError, ClientResult};

/// Where the frontend finds the API unless told otherwise.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

/// Thin wrapper over `reqwest::Client` bound to one API base URL.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Reuses an existing client (connection pool, custom timeouts).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpApi { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        let res = self.client.get(self.url("/products")).send().await?;
        decode(res).await
    }

    /// `Ok(None)` when the product does not exist.
    pub async fn get_product(&self, id: i64) -> ClientResult<Option<Product>> {
        let res = self
            .client
            .get(self.url(&format!("/products/{id}")))
            .send()
            .await?;

        match decode(res).await {
            Ok(product) => Ok(Some(product)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Validates locally, then creates the product and returns its id.
    pub async fn create_product(&self, product: &NewProduct) -> ClientResult<i64> {
        product.validate()?;

        let res = self
            .client
            .post(self.url("/products"))
            .json(product)
            .send()
            .await?;

        let created: Created = decode(res).await?;
        debug!(id = created.id, "Product created");
        Ok(created.id)
    }

    pub async fn update_product(&self, id: i64, patch: &ProductPatch) -> ClientResult<()> {
        patch.validate()?;

        let res = self
            .client
            .put(self.url(&format!("/products/{id}")))
            .json(patch)
            .send()
            .await?;

        let _: Ack = decode(res).await?;
        Ok(())
    }

    pub async fn delete_product(&self, id: i64) -> ClientResult<()> {
        let res = self
            .client
            .delete(self.url(&format!("/products/{id}")))
            .send()
            .await?;

        let _: Ack = decode(res).await?;
        Ok(())
    }

    pub async fn record_sale(&self, sale: &NewSale) -> ClientResult<i64> {
        sale.validate()?;

        let res = self
            .client
            .post(self.url("/sales"))
            .json(sale)
            .send()
            .await?;

        let created: Created = decode(res).await?;
        debug!(id = created.id, total = sale.total, "Sale recorded");
        Ok(created.id)
    }

    pub async fn list_sales(&self) -> ClientResult<Vec<Sale>> {
        let res = self.client.get(self.url("/sales")).send().await?;
        decode(res).await
    }

    /// True when `/health` answers `{"status":"ok"}`.
    pub async fn health(&self) -> bool {
        let Ok(res) = self.client.get(self.url("/health")).send().await else {
            return false;
        };
        matches!(decode::<HealthBody>(res).await, Ok(body) if body.status == "ok")
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> ClientResult<T> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json::<T>().await?);
    }

    let text = res.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.code, body.message.unwrap_or(text)),
        Err(_) => (None, text),
    };

    Err(ClientError::Status {
        status: status.as_u16(),
        code,
        message,
    })
}

#[async_trait]
impl Catalog for HttpApi {
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        HttpApi::list_products(self).await
    }
}

#[async_trait]
impl SaleRecorder for HttpApi {
    async fn record_sale(&self, sale: &NewSale) -> ClientResult<i64> {
        HttpApi::record_sale(self, sale).await
    }
}

#[async_trait]
impl SalesSource for HttpApi {
    async fn list_sales(&self) -> ClientResult<Vec<Sale>> {
        HttpApi::list_sales(self).await
    }
}
