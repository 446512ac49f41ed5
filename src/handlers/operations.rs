// src/handlers/operations.rs

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::operations::{
        CreateOrderPayload, CreateReceivingPayload, CreateReturnPayload, CreateShipmentPayload,
        Order, OrderDetail, OrderStatus, OrderSummary, Receiving, ReceivingDetail,
        RejectPayload, Return, ReturnDetail, Shipment, ShipmentDetail, ShipPayload,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/receivings", get(list_receivings).post(create_receiving))
        .route("/receivings/{id}", get(get_receiving))
        .route("/receivings/{id}/receive", post(receive_receiving))
        .route("/receivings/{id}/inspect", post(inspect_receiving))
        .route("/receivings/{id}/approve", post(approve_receiving))
        .route("/receivings/{id}/reject", post(reject_receiving))
        .route("/shipments", get(list_shipments).post(create_shipment))
        .route("/shipments/{id}", get(get_shipment))
        .route("/shipments/{id}/pack", post(pack_shipment))
        .route("/shipments/{id}/ship", post(ship_shipment))
        .route("/shipments/{id}/deliver", post(deliver_shipment))
        .route("/shipments/{id}/cancel", post(cancel_shipment))
        .route("/returns", get(list_returns).post(create_return))
        .route("/returns/{id}", get(get_return))
        .route("/returns/{id}/inspect", post(inspect_return))
        .route("/returns/{id}/approve", post(approve_return))
        .route("/returns/{id}/reject", post(reject_return))
        .route("/returns/{id}/process", post(process_return))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/summary", get(order_summary))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/confirm", post(confirm_order))
        .route("/orders/{id}/process", post(process_order))
        .route("/orders/{id}/ship", post(ship_order))
        .route("/orders/{id}/deliver", post(deliver_order))
        .route("/orders/{id}/cancel", post(cancel_order))
}

// A Pagination vem em Query separado; flatten não deserializa i64 em
// query string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderListQuery {
    status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApproveReturnPayload {
    refund_amount: Option<Decimal>,
}

// ---
// Recebimentos
// ---

async fn list_receivings(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Receiving>>, AppError> {
    let receivings = state
        .operations_service
        .list_receivings(page, user.access_scope())
        .await?;
    Ok(Json(receivings))
}

async fn get_receiving(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReceivingDetail>, AppError> {
    Ok(Json(state.operations_service.get_receiving(id).await?))
}

async fn create_receiving(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateReceivingPayload>,
) -> Result<(StatusCode, Json<ReceivingDetail>), AppError> {
    let receiving = state
        .operations_service
        .create_receiving(payload, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(receiving)))
}

async fn receive_receiving(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Receiving>, AppError> {
    Ok(Json(
        state.operations_service.receive_receiving(id, user.id).await?,
    ))
}

async fn inspect_receiving(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Receiving>, AppError> {
    Ok(Json(
        state.operations_service.inspect_receiving(id, user.id).await?,
    ))
}

async fn approve_receiving(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Receiving>, AppError> {
    Ok(Json(
        state.operations_service.approve_receiving(id, user.id).await?,
    ))
}

async fn reject_receiving(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectPayload>,
) -> Result<Json<Receiving>, AppError> {
    Ok(Json(
        state
            .operations_service
            .reject_receiving(id, payload, user.id)
            .await?,
    ))
}

// ---
// Expedições
// ---

async fn list_shipments(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Shipment>>, AppError> {
    let shipments = state
        .operations_service
        .list_shipments(page, user.access_scope())
        .await?;
    Ok(Json(shipments))
}

async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShipmentDetail>, AppError> {
    Ok(Json(state.operations_service.get_shipment(id).await?))
}

async fn create_shipment(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateShipmentPayload>,
) -> Result<(StatusCode, Json<ShipmentDetail>), AppError> {
    let shipment = state
        .operations_service
        .create_shipment(payload, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

async fn pack_shipment(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Shipment>, AppError> {
    Ok(Json(
        state.operations_service.pack_shipment(id, user.id).await?,
    ))
}

async fn ship_shipment(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShipPayload>,
) -> Result<Json<Shipment>, AppError> {
    Ok(Json(
        state
            .operations_service
            .ship_shipment(id, payload, user.id)
            .await?,
    ))
}

async fn deliver_shipment(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Shipment>, AppError> {
    Ok(Json(
        state.operations_service.deliver_shipment(id, user.id).await?,
    ))
}

async fn cancel_shipment(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Shipment>, AppError> {
    Ok(Json(
        state.operations_service.cancel_shipment(id, user.id).await?,
    ))
}

// ---
// Devoluções
// ---

async fn list_returns(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Return>>, AppError> {
    let returns = state
        .operations_service
        .list_returns(page, user.access_scope())
        .await?;
    Ok(Json(returns))
}

async fn get_return(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReturnDetail>, AppError> {
    Ok(Json(state.operations_service.get_return(id).await?))
}

async fn create_return(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateReturnPayload>,
) -> Result<(StatusCode, Json<ReturnDetail>), AppError> {
    let return_doc = state
        .operations_service
        .create_return(payload, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(return_doc)))
}

async fn inspect_return(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Return>, AppError> {
    Ok(Json(
        state.operations_service.inspect_return(id, user.id).await?,
    ))
}

async fn approve_return(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<ApproveReturnPayload>>,
) -> Result<Json<Return>, AppError> {
    let refund_amount = payload.and_then(|Json(p)| p.refund_amount);
    Ok(Json(
        state
            .operations_service
            .approve_return(id, refund_amount, user.id)
            .await?,
    ))
}

async fn reject_return(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectPayload>,
) -> Result<Json<Return>, AppError> {
    Ok(Json(
        state
            .operations_service
            .reject_return(id, payload, user.id)
            .await?,
    ))
}

async fn process_return(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Return>, AppError> {
    Ok(Json(
        state.operations_service.process_return(id, user.id).await?,
    ))
}

// ---
// Pedidos
// ---

async fn list_orders(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(page): Query<Pagination>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state
        .operations_service
        .list_orders(page, user.access_scope(), query.status)
        .await?;
    Ok(Json(orders))
}

async fn order_summary(State(state): State<AppState>) -> Result<Json<OrderSummary>, AppError> {
    Ok(Json(state.operations_service.order_summary().await?))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>, AppError> {
    Ok(Json(state.operations_service.get_order(id).await?))
}

async fn create_order(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<(StatusCode, Json<OrderDetail>), AppError> {
    let order = state.operations_service.create_order(payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn confirm_order(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(
        state
            .operations_service
            .transition_order(id, OrderStatus::Confirmed, user.id)
            .await?,
    ))
}

async fn process_order(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(
        state
            .operations_service
            .transition_order(id, OrderStatus::Processing, user.id)
            .await?,
    ))
}

async fn ship_order(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(
        state
            .operations_service
            .transition_order(id, OrderStatus::Shipped, user.id)
            .await?,
    ))
}

async fn deliver_order(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(
        state
            .operations_service
            .transition_order(id, OrderStatus::Delivered, user.id)
            .await?,
    ))
}

async fn cancel_order(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(
        state
            .operations_service
            .transition_order(id, OrderStatus::Cancelled, user.id)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    #[test]
    fn order_listing_splits_pagination_and_status() {
        let uri: Uri = "/orders?limit=20&offset=40&status=pending".parse().unwrap();

        let Query(page) = Query::<Pagination>::try_from_uri(&uri).unwrap();
        assert_eq!(page.limit(), 20);
        assert_eq!(page.offset(), 40);

        let Query(query) = Query::<OrderListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.status, Some(OrderStatus::Pending));
    }
}
