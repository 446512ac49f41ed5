// src/handlers/inventory.rs

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        analytics::{InventorySummary, LowStockEntry},
        inventory::{
            Adjustment, CreateAdjustmentPayload, CreateStockBufferPayload, CreateStockPayload,
            CreateTransferPayload, Stock, StockBuffer, StockFilter, Transfer, TransferStatus,
            UpdateStockBufferPayload, UpdateStockPayload,
        },
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stocks", get(list_stocks).post(create_stock))
        .route("/stocks/by_warehouse", get(stocks_by_warehouse))
        .route("/stocks/by_product", get(stocks_by_product))
        .route("/stocks/low_stock", get(low_stock))
        .route("/stocks/summary", get(stock_summary))
        .route(
            "/stocks/{id}",
            get(get_stock).patch(update_stock).delete(delete_stock),
        )
        .route("/buffers", get(list_buffers).post(create_buffer))
        .route("/buffers/by_product", get(buffer_by_product))
        .route(
            "/buffers/{id}",
            get(get_buffer).patch(update_buffer).delete(delete_buffer),
        )
        .route("/adjustments", get(list_adjustments).post(create_adjustment))
        .route("/adjustments/pending", get(pending_adjustments))
        .route("/adjustments/{id}", get(get_adjustment))
        .route("/adjustments/{id}/approve", post(approve_adjustment))
        .route("/transfers", get(list_transfers).post(create_transfer))
        .route("/transfers/pending", get(pending_transfers))
        .route("/transfers/{id}", get(get_transfer))
        .route("/transfers/{id}/approve", post(approve_transfer))
        .route("/transfers/{id}/execute", post(execute_transfer))
        .route("/transfers/{id}/cancel", post(cancel_transfer))
}

// A paginação vem num extractor Query próprio em vez de flatten: o
// serde_urlencoded não deserializa i64 através de #[serde(flatten)].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WarehouseQuery {
    warehouse_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductQuery {
    product_id: Option<Uuid>,
    warehouse_id: Option<Uuid>,
}

// ---
// Saldos
// ---

async fn list_stocks(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(filter): Query<StockFilter>,
) -> Result<Json<Vec<Stock>>, AppError> {
    let stocks = state.inventory_service.list_stocks(page, filter).await?;
    Ok(Json(stocks))
}

async fn stocks_by_warehouse(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(query): Query<WarehouseQuery>,
) -> Result<Json<Vec<Stock>>, AppError> {
    let warehouse_id = query
        .warehouse_id
        .ok_or(AppError::MissingParameter("warehouseId"))?;
    let filter = StockFilter {
        warehouse_id: Some(warehouse_id),
        ..Default::default()
    };
    Ok(Json(state.inventory_service.list_stocks(page, filter).await?))
}

async fn stocks_by_product(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Stock>>, AppError> {
    let product_id = query
        .product_id
        .ok_or(AppError::MissingParameter("productId"))?;
    let filter = StockFilter {
        product_id: Some(product_id),
        warehouse_id: query.warehouse_id,
        ..Default::default()
    };
    Ok(Json(state.inventory_service.list_stocks(page, filter).await?))
}

async fn low_stock(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<LowStockEntry>>, AppError> {
    Ok(Json(state.inventory_service.low_stock(page).await?))
}

async fn stock_summary(
    State(state): State<AppState>,
) -> Result<Json<InventorySummary>, AppError> {
    Ok(Json(state.inventory_service.inventory_summary().await?))
}

async fn get_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Stock>, AppError> {
    Ok(Json(state.inventory_service.get_stock(id).await?))
}

async fn create_stock(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateStockPayload>,
) -> Result<(StatusCode, Json<Stock>), AppError> {
    let stock = state.inventory_service.create_stock(payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(stock)))
}

async fn update_stock(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStockPayload>,
) -> Result<Json<Stock>, AppError> {
    Ok(Json(
        state
            .inventory_service
            .update_stock(id, payload, user.id)
            .await?,
    ))
}

async fn delete_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.inventory_service.delete_stock(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Buffers
// ---

async fn list_buffers(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<StockBuffer>>, AppError> {
    Ok(Json(state.inventory_service.list_buffers(page).await?))
}

async fn buffer_by_product(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<StockBuffer>, AppError> {
    let product_id = query
        .product_id
        .ok_or(AppError::MissingParameter("productId"))?;
    Ok(Json(
        state
            .inventory_service
            .find_buffer_by_product(product_id, query.warehouse_id)
            .await?,
    ))
}

async fn get_buffer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StockBuffer>, AppError> {
    Ok(Json(state.inventory_service.get_buffer(id).await?))
}

async fn create_buffer(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateStockBufferPayload>,
) -> Result<(StatusCode, Json<StockBuffer>), AppError> {
    let buffer = state.inventory_service.create_buffer(payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(buffer)))
}

async fn update_buffer(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStockBufferPayload>,
) -> Result<Json<StockBuffer>, AppError> {
    Ok(Json(
        state
            .inventory_service
            .update_buffer(id, payload, user.id)
            .await?,
    ))
}

async fn delete_buffer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.inventory_service.delete_buffer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Ajustes
// ---

async fn list_adjustments(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Adjustment>>, AppError> {
    let adjustments = state
        .inventory_service
        .list_adjustments(page, user.access_scope(), false)
        .await?;
    Ok(Json(adjustments))
}

async fn pending_adjustments(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Adjustment>>, AppError> {
    let adjustments = state
        .inventory_service
        .list_adjustments(page, user.access_scope(), true)
        .await?;
    Ok(Json(adjustments))
}

async fn get_adjustment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Adjustment>, AppError> {
    Ok(Json(state.inventory_service.get_adjustment(id).await?))
}

async fn create_adjustment(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateAdjustmentPayload>,
) -> Result<(StatusCode, Json<Adjustment>), AppError> {
    let adjustment = state
        .inventory_service
        .create_adjustment(payload, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(adjustment)))
}

async fn approve_adjustment(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Adjustment>, AppError> {
    Ok(Json(
        state.inventory_service.approve_adjustment(id, user.id).await?,
    ))
}

// ---
// Transferências
// ---

async fn list_transfers(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Transfer>>, AppError> {
    let transfers = state
        .inventory_service
        .list_transfers(page, user.access_scope(), None)
        .await?;
    Ok(Json(transfers))
}

async fn pending_transfers(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Transfer>>, AppError> {
    let transfers = state
        .inventory_service
        .list_transfers(page, user.access_scope(), Some(TransferStatus::Pending))
        .await?;
    Ok(Json(transfers))
}

async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Transfer>, AppError> {
    Ok(Json(state.inventory_service.get_transfer(id).await?))
}

async fn create_transfer(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateTransferPayload>,
) -> Result<(StatusCode, Json<Transfer>), AppError> {
    let transfer = state
        .inventory_service
        .create_transfer(payload, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

async fn approve_transfer(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Transfer>, AppError> {
    Ok(Json(
        state.inventory_service.approve_transfer(id, user.id).await?,
    ))
}

async fn execute_transfer(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Transfer>, AppError> {
    Ok(Json(
        state.inventory_service.execute_transfer(id, user.id).await?,
    ))
}

async fn cancel_transfer(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Transfer>, AppError> {
    Ok(Json(
        state.inventory_service.cancel_transfer(id, user.id).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    #[test]
    fn pagination_parses_alongside_stock_filter() {
        let uri: Uri = "/stocks?limit=10&offset=5&productId=a6e8c3a0-43aa-4176-9f44-0dbd2b9dcf11"
            .parse()
            .unwrap();

        let Query(page) = Query::<Pagination>::try_from_uri(&uri).unwrap();
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 5);

        let Query(filter) = Query::<StockFilter>::try_from_uri(&uri).unwrap();
        assert_eq!(
            filter.product_id,
            Some("a6e8c3a0-43aa-4176-9f44-0dbd2b9dcf11".parse().unwrap())
        );
        assert!(filter.warehouse_id.is_none());
    }

    #[test]
    fn side_queries_ignore_pagination_params() {
        let uri: Uri = "/stocks/by_warehouse?warehouseId=1c1fb309-5b1c-4d52-a2c8-9f6a1a0f2b77&limit=25"
            .parse()
            .unwrap();

        let Query(query) = Query::<WarehouseQuery>::try_from_uri(&uri).unwrap();
        assert!(query.warehouse_id.is_some());

        let Query(page) = Query::<Pagination>::try_from_uri(&uri).unwrap();
        assert_eq!(page.limit(), 25);
    }
}
