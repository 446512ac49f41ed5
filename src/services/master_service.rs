// src/services/master_service.rs

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Pagination},
    db::master_repo::MasterRepository,
    models::master::{
        Category, CreateCategoryPayload, CreateLocationPayload, CreateProductPayload,
        CreateSupplierPayload, CreateWarehousePayload, Location, Product, Supplier,
        UpdateCategoryPayload, UpdateLocationPayload, UpdateProductPayload,
        UpdateSupplierPayload, UpdateWarehousePayload, Warehouse,
    },
};

// CRUD de dados mestres. Quase tudo delega direto ao repositório; a regra
// que mora aqui é a derivação do código da posição.
#[derive(Clone)]
pub struct MasterService {
    repo: MasterRepository,
}

impl MasterService {
    pub fn new(repo: MasterRepository) -> Self {
        Self { repo }
    }

    // --- Categorias ---

    pub async fn list_categories(
        &self,
        page: Pagination,
        search: Option<&str>,
    ) -> Result<Vec<Category>, AppError> {
        self.repo.list_categories(page, search).await
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, AppError> {
        self.repo.get_category(id).await
    }

    pub async fn create_category(
        &self,
        payload: CreateCategoryPayload,
        actor: Uuid,
    ) -> Result<Category, AppError> {
        payload.validate()?;
        self.repo.create_category(&payload, actor).await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        payload: UpdateCategoryPayload,
        actor: Uuid,
    ) -> Result<Category, AppError> {
        payload.validate()?;
        self.repo.update_category(id, &payload, actor).await
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_category(id).await
    }

    // --- Fornecedores ---

    pub async fn list_suppliers(
        &self,
        page: Pagination,
        search: Option<&str>,
    ) -> Result<Vec<Supplier>, AppError> {
        self.repo.list_suppliers(page, search).await
    }

    pub async fn get_supplier(&self, id: Uuid) -> Result<Supplier, AppError> {
        self.repo.get_supplier(id).await
    }

    pub async fn create_supplier(
        &self,
        payload: CreateSupplierPayload,
        actor: Uuid,
    ) -> Result<Supplier, AppError> {
        payload.validate()?;
        self.repo.create_supplier(&payload, actor).await
    }

    pub async fn update_supplier(
        &self,
        id: Uuid,
        payload: UpdateSupplierPayload,
        actor: Uuid,
    ) -> Result<Supplier, AppError> {
        payload.validate()?;
        self.repo.update_supplier(id, &payload, actor).await
    }

    pub async fn delete_supplier(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_supplier(id).await
    }

    // --- Produtos ---

    pub async fn list_products(
        &self,
        page: Pagination,
        category_id: Option<Uuid>,
        search: Option<&str>,
    ) -> Result<Vec<Product>, AppError> {
        self.repo.list_products(page, category_id, search).await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.repo.get_product(id).await
    }

    pub async fn find_product_by_sku(&self, sku: &str) -> Result<Product, AppError> {
        self.repo.find_product_by_sku(sku).await
    }

    pub async fn create_product(
        &self,
        payload: CreateProductPayload,
        actor: Uuid,
    ) -> Result<Product, AppError> {
        payload.validate()?;
        self.repo.create_product(&payload, actor).await
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        payload: UpdateProductPayload,
        actor: Uuid,
    ) -> Result<Product, AppError> {
        payload.validate()?;
        self.repo.update_product(id, &payload, actor).await
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_product(id).await
    }

    // --- Armazéns ---

    pub async fn list_warehouses(&self, page: Pagination) -> Result<Vec<Warehouse>, AppError> {
        self.repo.list_warehouses(page).await
    }

    pub async fn get_warehouse(&self, id: Uuid) -> Result<Warehouse, AppError> {
        self.repo.get_warehouse(id).await
    }

    pub async fn create_warehouse(
        &self,
        payload: CreateWarehousePayload,
        actor: Uuid,
    ) -> Result<Warehouse, AppError> {
        payload.validate()?;
        self.repo.create_warehouse(&payload, actor).await
    }

    pub async fn update_warehouse(
        &self,
        id: Uuid,
        payload: UpdateWarehousePayload,
        actor: Uuid,
    ) -> Result<Warehouse, AppError> {
        payload.validate()?;
        self.repo.update_warehouse(id, &payload, actor).await
    }

    pub async fn delete_warehouse(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_warehouse(id).await
    }

    /// GET /warehouses/{id}/locations. 404 se o armazém não existir.
    pub async fn warehouse_locations(&self, id: Uuid) -> Result<Vec<Location>, AppError> {
        self.repo.get_warehouse(id).await?;
        self.repo.locations_of_warehouse(id).await
    }

    // --- Posições ---

    pub async fn list_locations(
        &self,
        page: Pagination,
        warehouse_id: Option<Uuid>,
    ) -> Result<Vec<Location>, AppError> {
        self.repo.list_locations(page, warehouse_id).await
    }

    pub async fn get_location(&self, id: Uuid) -> Result<Location, AppError> {
        self.repo.get_location(id).await
    }

    pub async fn create_location(
        &self,
        payload: CreateLocationPayload,
        actor: Uuid,
    ) -> Result<Location, AppError> {
        payload.validate()?;
        // o armazém precisa existir antes de endereçar a posição
        self.repo.get_warehouse(payload.warehouse_id).await?;

        let code = Location::derive_code(
            payload.aisle.as_deref(),
            &payload.rack,
            &payload.bin,
            payload.level,
        );
        self.repo.create_location(&payload, &code, actor).await
    }

    pub async fn update_location(
        &self,
        id: Uuid,
        payload: UpdateLocationPayload,
        actor: Uuid,
    ) -> Result<Location, AppError> {
        payload.validate()?;
        self.repo.update_location(id, &payload, actor).await
    }

    pub async fn delete_location(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_location(id).await
    }
}
