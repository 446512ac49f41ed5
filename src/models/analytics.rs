// src/models/analytics.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::operations::OrderSummary;

// --- Livro-razão de movimentações ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "movement_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
    Transfer,
}

// Registro append-only gravado junto com toda mutação de saldo.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub unit_cost: Option<Decimal>,
    pub reference_type: String,
    pub reference_id: Uuid,
    pub performed_by: Uuid,
    pub movement_date: DateTime<Utc>,
    pub notes: Option<String>,
}

// Filtros de consulta do livro-razão
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

// --- DTOs dos relatórios ---

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_products: i64,
    pub total_warehouses: i64,
    pub total_locations: i64,
    pub total_quantity: i64,
    pub total_value: Decimal,
    pub low_stock_count: i64,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LowStockEntry {
    pub product_id: Uuid,
    pub sku: String,
    pub product_name: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub minimum_stock: i32,
    pub reorder_point: i32,
    pub quantity_available: i64,
    // GREATEST(0, reorder_point - quantity_available), calculado no banco
    pub shortage: i64,
    pub minimum_quantity: Option<i32>,
}

// Visão consolidada do painel: totais de estoque, pedidos e documentos em aberto.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub inventory: InventorySummary,
    pub orders: OrderSummary,
    pub pending_transfers: i64,
    pub pending_adjustments: i64,
    pub open_receivings: i64,
    pub open_returns: i64,
    pub recent_movements: Vec<StockMovement>,
}
