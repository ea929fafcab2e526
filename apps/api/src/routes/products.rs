//! # Product Catalog Routes
//!
//! ```text
//! GET    /products        → 200 [Product]        (newest first)
//! GET    /products/{id}   → 200 Product | 404
//! POST   /products        → 201 {id}     | 400
//! PUT    /products/{id}   → 200 {ok}     | 400 | 404 (absent or empty body)
//! DELETE /products/{id}   → 200 {ok}     | 404
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use pdv_core::{Ack, Created, NewProduct, Product, ProductPatch};
use tracing::info;

use super::parse_id;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.db.products().list().await?))
}

async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Product>> {
    let id = parse_id("Product", &raw_id)?;

    state
        .db
        .products()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &raw_id))
}

async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let Json(product) = payload?;
    product.validate()?;

    let id = state.db.products().create(&product).await?;
    info!(id = %id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, Json(Created { id })))
}

async fn update_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let id = parse_id("Product", &raw_id)?;
    let Json(patch) = payload?;
    patch.validate()?;

    state.db.products().update(id, &patch).await?;
    info!(id = %id, "Product updated");

    Ok(Json(Ack { ok: true }))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Ack>> {
    let id = parse_id("Product", &raw_id)?;

    state.db.products().delete(id).await?;
    info!(id = %id, "Product deleted");

    Ok(Json(Ack { ok: true }))
}
