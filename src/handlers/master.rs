// src/handlers/master.rs

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::master::{
        Category, CreateCategoryPayload, CreateLocationPayload, CreateProductPayload,
        CreateSupplierPayload, CreateWarehousePayload, Location, Product, Supplier,
        UpdateCategoryPayload, UpdateLocationPayload, UpdateProductPayload,
        UpdateSupplierPayload, UpdateWarehousePayload, Warehouse,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).patch(update_category).delete(delete_category),
        )
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/{id}",
            get(get_supplier).patch(update_supplier).delete(delete_supplier),
        )
        .route("/products", get(list_products).post(create_product))
        .route("/products/search_by_sku", get(search_by_sku))
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/warehouses", get(list_warehouses).post(create_warehouse))
        .route(
            "/warehouses/{id}",
            get(get_warehouse)
                .patch(update_warehouse)
                .delete(delete_warehouse),
        )
        .route("/warehouses/{id}/locations", get(warehouse_locations))
        .route("/locations", get(list_locations).post(create_location))
        .route(
            "/locations/{id}",
            get(get_location).patch(update_location).delete(delete_location),
        )
}

// Filtros sem paginação embutida: a Pagination chega em Query próprio,
// já que flatten + serde_urlencoded não aceita campos i64.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuery {
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductListQuery {
    category_id: Option<Uuid>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationListQuery {
    warehouse_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct SkuQuery {
    sku: Option<String>,
}

// ---
// Categorias
// ---

async fn list_categories(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state
        .master_service
        .list_categories(page, query.search.as_deref())
        .await?;
    Ok(Json(categories))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(state.master_service.get_category(id).await?))
}

async fn create_category(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = state.master_service.create_category(payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(
        state
            .master_service
            .update_category(id, payload, user.id)
            .await?,
    ))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.master_service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Fornecedores
// ---

async fn list_suppliers(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Supplier>>, AppError> {
    let suppliers = state
        .master_service
        .list_suppliers(page, query.search.as_deref())
        .await?;
    Ok(Json(suppliers))
}

async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Supplier>, AppError> {
    Ok(Json(state.master_service.get_supplier(id).await?))
}

async fn create_supplier(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    let supplier = state.master_service.create_supplier(payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn update_supplier(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierPayload>,
) -> Result<Json<Supplier>, AppError> {
    Ok(Json(
        state
            .master_service
            .update_supplier(id, payload, user.id)
            .await?,
    ))
}

async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.master_service.delete_supplier(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Produtos
// ---

async fn list_products(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state
        .master_service
        .list_products(page, query.category_id, query.search.as_deref())
        .await?;
    Ok(Json(products))
}

async fn search_by_sku(
    State(state): State<AppState>,
    Query(query): Query<SkuQuery>,
) -> Result<Json<Product>, AppError> {
    let sku = query.sku.ok_or(AppError::MissingParameter("sku"))?;
    Ok(Json(state.master_service.find_product_by_sku(&sku).await?))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.master_service.get_product(id).await?))
}

async fn create_product(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateProductPayload>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state.master_service.create_product(payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(
        state
            .master_service
            .update_product(id, payload, user.id)
            .await?,
    ))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.master_service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Armazéns
// ---

async fn list_warehouses(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Warehouse>>, AppError> {
    Ok(Json(state.master_service.list_warehouses(page).await?))
}

async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Warehouse>, AppError> {
    Ok(Json(state.master_service.get_warehouse(id).await?))
}

async fn warehouse_locations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Location>>, AppError> {
    Ok(Json(state.master_service.warehouse_locations(id).await?))
}

async fn create_warehouse(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateWarehousePayload>,
) -> Result<(StatusCode, Json<Warehouse>), AppError> {
    let warehouse = state
        .master_service
        .create_warehouse(payload, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

async fn update_warehouse(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWarehousePayload>,
) -> Result<Json<Warehouse>, AppError> {
    Ok(Json(
        state
            .master_service
            .update_warehouse(id, payload, user.id)
            .await?,
    ))
}

async fn delete_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.master_service.delete_warehouse(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Posições
// ---

async fn list_locations(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(query): Query<LocationListQuery>,
) -> Result<Json<Vec<Location>>, AppError> {
    let locations = state
        .master_service
        .list_locations(page, query.warehouse_id)
        .await?;
    Ok(Json(locations))
}

async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Location>, AppError> {
    Ok(Json(state.master_service.get_location(id).await?))
}

async fn create_location(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateLocationPayload>,
) -> Result<(StatusCode, Json<Location>), AppError> {
    let location = state.master_service.create_location(payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

async fn update_location(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationPayload>,
) -> Result<Json<Location>, AppError> {
    Ok(Json(
        state
            .master_service
            .update_location(id, payload, user.id)
            .await?,
    ))
}

async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.master_service.delete_location(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    #[test]
    fn product_listing_splits_pagination_and_filter() {
        let uri: Uri =
            "/products?limit=30&offset=60&search=parafuso&categoryId=5b6fd3a7-84a2-4f4e-9c3f-2a15c6f8f0aa"
                .parse()
                .unwrap();

        let Query(page) = Query::<Pagination>::try_from_uri(&uri).unwrap();
        assert_eq!(page.limit(), 30);
        assert_eq!(page.offset(), 60);

        let Query(query) = Query::<ProductListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.search.as_deref(), Some("parafuso"));
        assert!(query.category_id.is_some());
    }
}
