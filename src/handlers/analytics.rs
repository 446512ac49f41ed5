// src/handlers/analytics.rs

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    models::analytics::{
        DashboardSummary, InventorySummary, LowStockEntry, MovementFilter, StockMovement,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stock-movements", get(stock_movements))
        .route("/inventory-summary", get(inventory_summary))
        .route("/low-stock-report", get(low_stock_report))
        .route("/dashboard-summary", get(dashboard_summary))
}

// Paginação e filtro extraídos separadamente; flatten quebraria os
// campos i64 da Pagination no serde_urlencoded.
async fn stock_movements(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(filter): Query<MovementFilter>,
) -> Result<Json<Vec<StockMovement>>, AppError> {
    let movements = state
        .analytics_service
        .stock_movements(page, filter)
        .await?;
    Ok(Json(movements))
}

async fn inventory_summary(
    State(state): State<AppState>,
) -> Result<Json<InventorySummary>, AppError> {
    Ok(Json(state.analytics_service.inventory_summary().await?))
}

async fn low_stock_report(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<LowStockEntry>>, AppError> {
    Ok(Json(state.analytics_service.low_stock_report(page).await?))
}

async fn dashboard_summary(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    Ok(Json(state.analytics_service.dashboard_summary().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analytics::MovementType;
    use axum::http::Uri;

    #[test]
    fn movement_listing_splits_pagination_and_filter() {
        let uri: Uri = "/stock-movements?limit=15&offset=30&movementType=transfer&dateFrom=2026-01-01T00:00:00Z"
            .parse()
            .unwrap();

        let Query(page) = Query::<Pagination>::try_from_uri(&uri).unwrap();
        assert_eq!(page.limit(), 15);
        assert_eq!(page.offset(), 30);

        let Query(filter) = Query::<MovementFilter>::try_from_uri(&uri).unwrap();
        assert_eq!(filter.movement_type, Some(MovementType::Transfer));
        assert!(filter.date_from.is_some());
        assert!(filter.date_to.is_none());
    }
}
