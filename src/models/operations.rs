// src/models/operations.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::master::AuditFields;

// --- Recebimentos ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "receiving_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReceivingStatus {
    Draft,
    Received,
    Inspected,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_condition", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    Good,
    Damaged,
    Expired,
    WrongItem,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Receiving {
    pub id: Uuid,
    pub receiving_no: String,
    pub supplier_id: Uuid,
    pub purchase_order_no: Option<String>,
    pub warehouse_id: Uuid,
    pub location_id: Uuid,
    pub received_by: Uuid,
    pub received_at: Option<DateTime<Utc>>,
    pub status: ReceivingStatus,
    pub inspected_by: Option<Uuid>,
    pub inspected_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReceivingItem {
    pub id: Uuid,
    pub receiving_id: Uuid,
    pub product_id: Uuid,
    pub expected_quantity: i32,
    pub received_quantity: i32,
    pub unit_cost: Decimal,
    pub condition: ItemCondition,
    pub notes: Option<String>,
}

impl ReceivingItem {
    /// Divergência entre o esperado e o recebido (negativa quando faltou).
    pub fn quantity_difference(&self) -> i32 {
        self.received_quantity - self.expected_quantity
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_cost * Decimal::from(self.received_quantity)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceivingPayload {
    pub supplier_id: Uuid,
    pub purchase_order_no: Option<String>,
    pub warehouse_id: Uuid,
    pub location_id: Uuid,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "O recebimento precisa de ao menos um item."))]
    #[validate(nested)]
    pub items: Vec<CreateReceivingItemPayload>,
}

// Serialize é exigido pelo validator para montar os params do erro de length.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceivingItemPayload {
    pub product_id: Uuid,
    #[validate(range(min = 0, message = "A quantidade esperada não pode ser negativa."))]
    pub expected_quantity: i32,
    #[validate(range(min = 0, message = "A quantidade recebida não pode ser negativa."))]
    pub received_quantity: i32,
    pub unit_cost: Decimal,
    pub condition: Option<ItemCondition>,
    pub notes: Option<String>,
}

// Documento com seus itens, como os GETs de detalhe respondem
#[derive(Debug, Serialize)]
pub struct ReceivingDetail {
    #[serde(flatten)]
    pub receiving: Receiving,
    pub items: Vec<ReceivingItem>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RejectPayload {
    #[validate(length(min = 1, message = "O motivo da rejeição é obrigatório."))]
    pub rejection_reason: String,
}

// --- Expedições ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "shipment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Draft,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: Uuid,
    pub shipment_no: String,
    pub order_no: String,
    pub customer_name: String,
    pub customer_address: String,
    pub warehouse_id: Uuid,
    pub location_id: Uuid,
    pub packed_by: Uuid,
    pub packed_at: Option<DateTime<Utc>>,
    pub shipped_by: Option<Uuid>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub status: ShipmentStatus,
    pub notes: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentItem {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub product_id: Uuid,
    pub ordered_quantity: i32,
    pub shipped_quantity: i32,
    pub unit_price: Decimal,
}

impl ShipmentItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.shipped_quantity)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipmentPayload {
    #[validate(length(min = 1, max = 50, message = "O número do pedido é obrigatório."))]
    pub order_no: String,
    #[validate(length(min = 1, max = 255, message = "O nome do cliente é obrigatório."))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "O endereço do cliente é obrigatório."))]
    pub customer_address: String,
    pub warehouse_id: Uuid,
    pub location_id: Uuid,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "A expedição precisa de ao menos um item."))]
    #[validate(nested)]
    pub items: Vec<CreateShipmentItemPayload>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipmentItemPayload {
    pub product_id: Uuid,
    #[validate(range(min = 0, message = "A quantidade pedida não pode ser negativa."))]
    pub ordered_quantity: i32,
    #[validate(range(min = 0, message = "A quantidade expedida não pode ser negativa."))]
    pub shipped_quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ShipmentDetail {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub items: Vec<ShipmentItem>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShipPayload {
    #[validate(length(min = 1, max = 100, message = "A transportadora é obrigatória."))]
    pub carrier: String,
    pub tracking_number: Option<String>,
}

// --- Devoluções ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "return_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Received,
    Inspected,
    Approved,
    Rejected,
    Processed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "return_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReturnReason {
    Defective,
    WrongItem,
    CustomerDissatisfaction,
    ChangedMind,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "return_condition", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReturnCondition {
    New,
    Used,
    Damaged,
    Defective,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Return {
    pub id: Uuid,
    pub return_no: String,
    pub original_order_no: String,
    pub customer_name: String,
    pub customer_address: String,
    pub return_reason: ReturnReason,
    pub received_by: Uuid,
    pub received_at: DateTime<Utc>,
    pub inspected_by: Option<Uuid>,
    pub inspected_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
    pub status: ReturnStatus,
    pub refund_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub id: Uuid,
    pub return_id: Uuid,
    pub product_id: Uuid,
    pub returned_quantity: i32,
    pub condition: ReturnCondition,
    pub unit_price: Decimal,
}

impl ReturnItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.returned_quantity)
    }

    /// Só itens em bom estado voltam ao estoque vendável.
    pub fn is_restockable(&self) -> bool {
        matches!(self.condition, ReturnCondition::New | ReturnCondition::Used)
    }
}

#[derive(Debug, Serialize)]
pub struct ReturnDetail {
    #[serde(flatten)]
    pub return_doc: Return,
    pub items: Vec<ReturnItem>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReturnPayload {
    #[validate(length(min = 1, max = 50, message = "O número do pedido original é obrigatório."))]
    pub original_order_no: String,
    #[validate(length(min = 1, max = 255, message = "O nome do cliente é obrigatório."))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "O endereço do cliente é obrigatório."))]
    pub customer_address: String,
    pub return_reason: ReturnReason,
    pub refund_amount: Option<Decimal>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "A devolução precisa de ao menos um item."))]
    #[validate(nested)]
    pub items: Vec<CreateReturnItemPayload>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReturnItemPayload {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "A quantidade devolvida deve ser positiva."))]
    pub returned_quantity: i32,
    pub condition: Option<ReturnCondition>,
    pub unit_price: Decimal,
}

// --- Pedidos de venda ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Standard,
    Express,
    Backorder,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_no: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub customer_notes: Option<String>,
    pub internal_notes: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Order {
    /// Total do pedido, recalculado a cada gravação:
    /// subtotal + imposto + frete - desconto.
    pub fn compute_total(
        subtotal: Decimal,
        tax: Decimal,
        shipping: Decimal,
        discount: Decimal,
    ) -> Decimal {
        subtotal + tax + shipping - discount
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
}

impl OrderItem {
    /// Total da linha com o desconto percentual aplicado.
    pub fn line_total(&self) -> Decimal {
        let gross = self.unit_price * Decimal::from(self.quantity);
        gross * (Decimal::ONE_HUNDRED - self.discount_percent) / Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// Resumo de pedidos (endpoint summary e painel)
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub shipped_orders: i64,
    pub delivered_orders: i64,
    pub cancelled_orders: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    #[validate(length(min = 1, max = 255, message = "O nome do cliente é obrigatório."))]
    pub customer_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub customer_email: String,
    #[validate(length(min = 1, max = 20, message = "O telefone do cliente é obrigatório."))]
    pub customer_phone: String,
    #[validate(length(min = 1, message = "O endereço do cliente é obrigatório."))]
    pub customer_address: String,
    pub order_type: Option<OrderType>,
    pub tax_amount: Option<Decimal>,
    pub shipping_amount: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub customer_notes: Option<String>,
    pub internal_notes: Option<String>,
    #[validate(length(min = 1, message = "O pedido precisa de ao menos um item."))]
    #[validate(nested)]
    pub items: Vec<CreateOrderItemPayload>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemPayload {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "A quantidade deve ser positiva."))]
    pub quantity: i32,
    pub unit_price: Decimal,
    #[validate(range(min = 0.0, max = 100.0, message = "O desconto deve estar entre 0 e 100."))]
    pub discount_percent: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn receiving_item_difference_and_total() {
        let item = ReceivingItem {
            id: Uuid::new_v4(),
            receiving_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            expected_quantity: 10,
            received_quantity: 8,
            unit_cost: dec!(2.50),
            condition: ItemCondition::Good,
            notes: None,
        };
        assert_eq!(item.quantity_difference(), -2);
        assert_eq!(item.line_total(), dec!(20.00));
    }

    #[test]
    fn order_item_applies_discount() {
        let item = OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity: 4,
            unit_price: dec!(25.00),
            discount_percent: dec!(10),
        };
        // 4 * 25 = 100, menos 10% = 90
        assert_eq!(item.line_total(), dec!(90.00));
    }

    #[test]
    fn order_total_formula() {
        assert_eq!(
            Order::compute_total(dec!(100), dec!(10), dec!(15), dec!(5)),
            dec!(120)
        );
    }

    #[test]
    fn order_payload_requires_at_least_one_item() {
        let mut payload = CreateOrderPayload {
            customer_name: "Cliente Teste".into(),
            customer_email: "cliente@exemplo.com".into(),
            customer_phone: "11999990000".into(),
            customer_address: "Rua das Laranjeiras, 123".into(),
            order_type: None,
            tax_amount: None,
            shipping_amount: None,
            discount_amount: None,
            customer_notes: None,
            internal_notes: None,
            items: vec![],
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));

        payload.items.push(CreateOrderItemPayload {
            product_id: Uuid::new_v4(),
            quantity: 2,
            unit_price: dec!(10.00),
            discount_percent: None,
        });
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn restockable_conditions() {
        let mut item = ReturnItem {
            id: Uuid::new_v4(),
            return_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            returned_quantity: 1,
            condition: ReturnCondition::New,
            unit_price: dec!(9.99),
        };
        assert!(item.is_restockable());
        item.condition = ReturnCondition::Damaged;
        assert!(!item.is_restockable());
        item.condition = ReturnCondition::Defective;
        assert!(!item.is_restockable());
    }
}
