//! Sales ledger routes. The ledger is append-only: no update or delete.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use pdv_core::{Created, NewSale, Sale};
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/sales", get(list_sales).post(record_sale))
}

async fn list_sales(State(state): State<AppState>) -> ApiResult<Json<Vec<Sale>>> {
    Ok(Json(state.db.sales().list().await?))
}

/// Stores the sale as sent. Totals are not recomputed.
async fn record_sale(
    State(state): State<AppState>,
    payload: Result<Json<NewSale>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let Json(sale) = payload?;
    sale.validate()?;

    let id = state.db.sales().record(&sale).await?;
    info!(id = %id, total = sale.total, "Sale recorded");

    Ok((StatusCode::CREATED, Json(Created { id })))
}
