// src/models/master.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// Campos de auditoria comuns a todos os dados mestres e documentos.
// Embutidos via flatten para não repetir as quatro colunas em cada struct.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

// --- Categorias ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "category_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub status: CategoryStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub status: Option<CategoryStatus>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryPayload {
    #[validate(length(min = 1, max = 100, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub status: Option<CategoryStatus>,
}

// --- Fornecedores ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "supplier_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    Active,
    Inactive,
    Blocked,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub tax_id: Option<String>,
    pub payment_terms: Option<String>,
    pub lead_time_days: Option<i32>,
    pub minimum_order_value: Option<Decimal>,
    pub rating: Option<Decimal>,
    pub status: SupplierStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierPayload {
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub code: String,
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "O contato é obrigatório."))]
    pub contact_person: String,
    #[validate(length(min = 1, max = 20, message = "O telefone é obrigatório."))]
    pub phone: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub tax_id: Option<String>,
    pub payment_terms: Option<String>,
    #[validate(range(min = 0, message = "O lead time não pode ser negativo."))]
    pub lead_time_days: Option<i32>,
    pub minimum_order_value: Option<Decimal>,
    pub rating: Option<Decimal>,
    pub status: Option<SupplierStatus>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierPayload {
    #[validate(length(min = 1, max = 255, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub tax_id: Option<String>,
    pub payment_terms: Option<String>,
    pub lead_time_days: Option<i32>,
    pub minimum_order_value: Option<Decimal>,
    pub rating: Option<Decimal>,
    pub status: Option<SupplierStatus>,
}

// --- Produtos ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    Inactive,
    Discontinued,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub brand: Option<String>,
    pub product_group: Option<String>,
    pub unit: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub minimum_stock: i32,
    pub maximum_stock: Option<i32>,
    pub reorder_point: i32,
    pub primary_supplier_id: Option<Uuid>,
    pub weight: Option<Decimal>,
    pub dimensions: Option<String>,
    pub status: ProductStatus,
    pub image_url: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, max = 50, message = "O SKU é obrigatório."))]
    pub sku: String,
    pub barcode: Option<String>,
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub brand: Option<String>,
    pub product_group: Option<String>,
    pub unit: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    pub minimum_stock: Option<i32>,
    pub maximum_stock: Option<i32>,
    #[validate(range(min = 0, message = "O ponto de ressuprimento não pode ser negativo."))]
    pub reorder_point: Option<i32>,
    pub primary_supplier_id: Option<Uuid>,
    pub weight: Option<Decimal>,
    pub dimensions: Option<String>,
    pub status: Option<ProductStatus>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    pub barcode: Option<String>,
    #[validate(length(min = 1, max = 255, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub brand: Option<String>,
    pub product_group: Option<String>,
    pub unit: Option<String>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub minimum_stock: Option<i32>,
    pub maximum_stock: Option<i32>,
    pub reorder_point: Option<i32>,
    pub primary_supplier_id: Option<Uuid>,
    pub weight: Option<Decimal>,
    pub dimensions: Option<String>,
    pub status: Option<ProductStatus>,
    pub image_url: Option<String>,
}

// --- Armazéns ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "warehouse_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WarehouseType {
    Main,
    Regional,
    Outlet,
    Transit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "warehouse_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WarehouseStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub warehouse_type: WarehouseType,
    pub address: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub capacity: Option<i32>,
    pub status: WarehouseStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehousePayload {
    #[validate(length(min = 1, max = 20, message = "O código é obrigatório."))]
    pub code: String,
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub name: String,
    pub warehouse_type: Option<WarehouseType>,
    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "O contato é obrigatório."))]
    pub contact_person: String,
    #[validate(length(min = 1, max = 20, message = "O telefone é obrigatório."))]
    pub phone: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(range(min = 0, message = "A capacidade não pode ser negativa."))]
    pub capacity: Option<i32>,
    pub status: Option<WarehouseStatus>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWarehousePayload {
    #[validate(length(min = 1, max = 100, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub warehouse_type: Option<WarehouseType>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub capacity: Option<i32>,
    pub status: Option<WarehouseStatus>,
}

// --- Posições de armazenagem ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "location_zone", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LocationZone {
    Receiving,
    Storage,
    Picking,
    Shipping,
    Quarantine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "location_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    Active,
    Inactive,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub zone: LocationZone,
    pub aisle: Option<String>,
    pub rack: String,
    pub bin: String,
    pub level: Option<i32>,
    pub code: String,
    pub barcode: Option<String>,
    pub capacity: Option<i32>,
    pub current_utilization: Decimal,
    pub description: Option<String>,
    pub status: LocationStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Location {
    /// Código legível da posição, derivado das partes presentes
    /// (corredor-estante-caixa-nível). Ex: "A-01-02-1".
    pub fn derive_code(
        aisle: Option<&str>,
        rack: &str,
        bin: &str,
        level: Option<i32>,
    ) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if let Some(a) = aisle {
            if !a.is_empty() {
                parts.push(a.to_string());
            }
        }
        parts.push(rack.to_string());
        parts.push(bin.to_string());
        if let Some(l) = level {
            parts.push(l.to_string());
        }
        parts.join("-")
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationPayload {
    pub warehouse_id: Uuid,
    pub zone: Option<LocationZone>,
    pub aisle: Option<String>,
    #[validate(length(min = 1, max = 20, message = "A estante é obrigatória."))]
    pub rack: String,
    #[validate(length(min = 1, max = 20, message = "A caixa é obrigatória."))]
    pub bin: String,
    #[validate(range(min = 0, message = "O nível não pode ser negativo."))]
    pub level: Option<i32>,
    pub barcode: Option<String>,
    #[validate(range(min = 0, message = "A capacidade não pode ser negativa."))]
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub status: Option<LocationStatus>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationPayload {
    pub zone: Option<LocationZone>,
    pub barcode: Option<String>,
    pub capacity: Option<i32>,
    pub current_utilization: Option<Decimal>,
    pub description: Option<String>,
    pub status: Option<LocationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_code_with_all_parts() {
        assert_eq!(
            Location::derive_code(Some("A"), "01", "02", Some(1)),
            "A-01-02-1"
        );
    }

    #[test]
    fn location_code_skips_missing_parts() {
        assert_eq!(Location::derive_code(None, "01", "02", Some(3)), "01-02-3");
        assert_eq!(Location::derive_code(Some("B"), "10", "05", None), "B-10-05");
        assert_eq!(Location::derive_code(None, "10", "05", None), "10-05");
    }

    #[test]
    fn location_code_ignores_empty_aisle() {
        assert_eq!(Location::derive_code(Some(""), "01", "02", None), "01-02");
    }
}
