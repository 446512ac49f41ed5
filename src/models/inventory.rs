// src/models/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::master::AuditFields;

// --- Saldos de estoque ---

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: Uuid,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Uuid,
    pub quantity_available: i32,
    pub quantity_reserved: i32,
    pub quantity_allocated: i32,
    pub lot_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub manufacturing_date: Option<NaiveDate>,
    pub unit_cost: Option<Decimal>,
    pub total_value: Option<Decimal>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Stock {
    /// Quantidade física total na posição (disponível + reservado + alocado).
    pub fn quantity_total(&self) -> i32 {
        self.quantity_available + self.quantity_reserved + self.quantity_allocated
    }

    /// Quantidade vendável: o que está disponível menos o já reservado.
    pub fn quantity_available_for_sale(&self) -> i32 {
        self.quantity_available - self.quantity_reserved
    }

    /// Valor total do saldo, recalculado a cada gravação a partir do custo
    /// unitário vigente. None quando o custo não foi informado.
    pub fn compute_total_value(unit_cost: Option<Decimal>, quantity_total: i32) -> Option<Decimal> {
        unit_cost.map(|cost| cost * Decimal::from(quantity_total))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockPayload {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Uuid,
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub quantity_available: i32,
    #[validate(range(min = 0, message = "A quantidade reservada não pode ser negativa."))]
    pub quantity_reserved: Option<i32>,
    #[validate(range(min = 0, message = "A quantidade alocada não pode ser negativa."))]
    pub quantity_allocated: Option<i32>,
    pub lot_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub manufacturing_date: Option<NaiveDate>,
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockPayload {
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub quantity_available: Option<i32>,
    #[validate(range(min = 0, message = "A quantidade reservada não pode ser negativa."))]
    pub quantity_reserved: Option<i32>,
    #[validate(range(min = 0, message = "A quantidade alocada não pode ser negativa."))]
    pub quantity_allocated: Option<i32>,
    pub lot_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub manufacturing_date: Option<NaiveDate>,
    pub unit_cost: Option<Decimal>,
}

// Filtros de listagem de saldos (?productId=&warehouseId=&locationId=)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFilter {
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub lot_number: Option<String>,
}

// --- Parâmetros de reposição (buffer) ---

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockBuffer {
    pub id: Uuid,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub minimum_quantity: i32,
    pub maximum_quantity: Option<i32>,
    pub reorder_point: i32,
    pub lead_time_days: i32,
    pub safety_factor: Decimal,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl StockBuffer {
    /// Estoque de segurança: ponto de ressuprimento vezes o fator,
    /// truncado para inteiro.
    pub fn safety_stock_quantity(&self) -> i32 {
        (Decimal::from(self.reorder_point) * self.safety_factor)
            .trunc()
            .to_i32()
            .unwrap_or(0)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockBufferPayload {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    #[validate(range(min = 0, message = "A quantidade mínima não pode ser negativa."))]
    pub minimum_quantity: i32,
    #[validate(range(min = 0, message = "A quantidade máxima não pode ser negativa."))]
    pub maximum_quantity: Option<i32>,
    #[validate(range(min = 0, message = "O ponto de ressuprimento não pode ser negativo."))]
    pub reorder_point: i32,
    #[validate(range(min = 0, message = "O lead time não pode ser negativo."))]
    pub lead_time_days: Option<i32>,
    pub safety_factor: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockBufferPayload {
    #[validate(range(min = 0, message = "A quantidade mínima não pode ser negativa."))]
    pub minimum_quantity: Option<i32>,
    pub maximum_quantity: Option<i32>,
    #[validate(range(min = 0, message = "O ponto de ressuprimento não pode ser negativo."))]
    pub reorder_point: Option<i32>,
    pub lead_time_days: Option<i32>,
    pub safety_factor: Option<Decimal>,
}

// --- Ajustes de estoque ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "adjustment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "adjustment_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentCategory {
    PhysicalCount,
    Damage,
    Theft,
    Correction,
    Expiry,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub id: Uuid,
    pub adjustment_no: String,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Uuid,
    pub previous_qty: i32,
    pub adjusted_qty: i32,
    pub adjustment_type: AdjustmentType,
    pub category: AdjustmentCategory,
    pub reason: String,
    pub adjusted_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub cost_impact: Option<Decimal>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Adjustment {
    /// Um ajuste fica pendente até ser aprovado; só então mexe no saldo.
    pub fn is_pending(&self) -> bool {
        self.approved_by.is_none()
    }

    /// Delta aplicado ao saldo na aprovação: quantidade contada menos a
    /// quantidade fotografada na criação do ajuste.
    pub fn quantity_delta(&self) -> i32 {
        self.adjusted_qty - self.previous_qty
    }
}

impl AdjustmentType {
    /// Direção derivada do delta, gravada junto com o documento.
    pub fn from_delta(delta: i32) -> Self {
        if delta >= 0 {
            AdjustmentType::Increase
        } else {
            AdjustmentType::Decrease
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdjustmentPayload {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Uuid,
    #[validate(range(min = 0, message = "A quantidade contada não pode ser negativa."))]
    pub adjusted_qty: i32,
    pub category: AdjustmentCategory,
    #[validate(length(min = 1, message = "O motivo é obrigatório."))]
    pub reason: String,
    pub cost_impact: Option<Decimal>,
}

// --- Transferências entre armazéns ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transfer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Approved,
    InTransit,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: Uuid,
    pub transfer_no: String,
    pub from_warehouse_id: Uuid,
    pub from_location_id: Uuid,
    pub to_warehouse_id: Uuid,
    pub to_location_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub transferred_by: Option<Uuid>,
    pub status: TransferStatus,
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub transferred_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferPayload {
    pub from_warehouse_id: Uuid,
    pub from_location_id: Uuid,
    pub to_warehouse_id: Uuid,
    pub to_location_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "A quantidade deve ser positiva."))]
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn audit() -> AuditFields {
        AuditFields {
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: None,
            updated_by: None,
        }
    }

    fn sample_stock() -> Stock {
        Stock {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            warehouse_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            quantity_available: 100,
            quantity_reserved: 20,
            quantity_allocated: 5,
            lot_number: None,
            expiry_date: None,
            manufacturing_date: None,
            unit_cost: Some(dec!(10.50)),
            total_value: None,
            audit: audit(),
        }
    }

    #[test]
    fn stock_totals() {
        let stock = sample_stock();
        assert_eq!(stock.quantity_total(), 125);
        assert_eq!(stock.quantity_available_for_sale(), 80);
    }

    #[test]
    fn total_value_follows_unit_cost() {
        let stock = sample_stock();
        assert_eq!(
            Stock::compute_total_value(stock.unit_cost, stock.quantity_total()),
            Some(dec!(1312.50))
        );
        assert_eq!(Stock::compute_total_value(None, 125), None);
    }

    #[test]
    fn safety_stock_truncates() {
        let buffer = StockBuffer {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            warehouse_id: Uuid::new_v4(),
            minimum_quantity: 10,
            maximum_quantity: None,
            reorder_point: 15,
            lead_time_days: 3,
            safety_factor: dec!(0.33),
            audit: audit(),
        };
        // 15 * 0.33 = 4.95, truncado para 4
        assert_eq!(buffer.safety_stock_quantity(), 4);
    }

    #[test]
    fn adjustment_delta_against_snapshot() {
        let mut adj = Adjustment {
            id: Uuid::new_v4(),
            adjustment_no: "ADJ-2025-001".into(),
            product_id: Uuid::new_v4(),
            warehouse_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            previous_qty: 50,
            adjusted_qty: 58,
            adjustment_type: AdjustmentType::Increase,
            category: AdjustmentCategory::PhysicalCount,
            reason: "contagem física".into(),
            adjusted_by: Uuid::new_v4(),
            approved_by: None,
            approved_at: None,
            cost_impact: None,
            audit: audit(),
        };
        assert!(adj.is_pending());
        assert_eq!(adj.quantity_delta(), 8);

        adj.adjusted_qty = 42;
        adj.approved_by = Some(Uuid::new_v4());
        assert!(!adj.is_pending());
        assert_eq!(adj.quantity_delta(), -8);
    }

    #[test]
    fn adjustment_type_follows_delta_sign() {
        assert_eq!(AdjustmentType::from_delta(5), AdjustmentType::Increase);
        assert_eq!(AdjustmentType::from_delta(0), AdjustmentType::Increase);
        assert_eq!(AdjustmentType::from_delta(-3), AdjustmentType::Decrease);
    }
}
