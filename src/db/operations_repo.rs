// src/db/operations_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    db::scope::push_scope,
    models::{
        auth::AccessScope,
        operations::{
            CreateOrderPayload, CreateReceivingItemPayload, CreateReceivingPayload,
            CreateReturnItemPayload, CreateReturnPayload, CreateShipmentItemPayload,
            CreateShipmentPayload, Order, OrderItem, OrderStatus, OrderSummary, Receiving,
            ReceivingItem, Return, ReturnItem, Shipment, ShipmentItem,
        },
    },
};

#[derive(Clone)]
pub struct OperationsRepository {
    pool: PgPool,
}

impl OperationsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Recebimentos
    // ---

    pub async fn list_receivings(
        &self,
        page: Pagination,
        scope: AccessScope,
    ) -> Result<Vec<Receiving>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM receivings WHERE 1=1");
        push_scope(&mut qb, scope, "received_by", &["warehouse_id"]);
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb
            .build_query_as::<Receiving>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_receiving(&self, id: Uuid) -> Result<Receiving, AppError> {
        sqlx::query_as::<_, Receiving>("SELECT * FROM receivings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Recebimento".into()))
    }

    pub async fn get_receiving_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Receiving, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Receiving>("SELECT * FROM receivings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound("Recebimento".into()))
    }

    pub async fn create_receiving<'e, E>(
        &self,
        executor: E,
        receiving_no: &str,
        payload: &CreateReceivingPayload,
        actor: Uuid,
    ) -> Result<Receiving, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Receiving>(
            r#"
            INSERT INTO receivings (
                receiving_no, supplier_id, purchase_order_no, warehouse_id,
                location_id, received_by, notes, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $6, $6)
            RETURNING *
            "#,
        )
        .bind(receiving_no)
        .bind(payload.supplier_id)
        .bind(&payload.purchase_order_no)
        .bind(payload.warehouse_id)
        .bind(payload.location_id)
        .bind(actor)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "número de recebimento"))
    }

    pub async fn insert_receiving_item<'e, E>(
        &self,
        executor: E,
        receiving_id: Uuid,
        item: &CreateReceivingItemPayload,
    ) -> Result<ReceivingItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ReceivingItem>(
            r#"
            INSERT INTO receiving_items (
                receiving_id, product_id, expected_quantity, received_quantity,
                unit_cost, condition, notes
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'good'), $7)
            RETURNING *
            "#,
        )
        .bind(receiving_id)
        .bind(item.product_id)
        .bind(item.expected_quantity)
        .bind(item.received_quantity)
        .bind(item.unit_cost)
        .bind(item.condition)
        .bind(&item.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "produto no recebimento"))
    }

    pub async fn list_receiving_items(
        &self,
        receiving_id: Uuid,
    ) -> Result<Vec<ReceivingItem>, AppError> {
        let rows = sqlx::query_as::<_, ReceivingItem>(
            "SELECT * FROM receiving_items WHERE receiving_id = $1 ORDER BY id",
        )
        .bind(receiving_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn set_receiving_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: crate::models::operations::ReceivingStatus,
        stamp_column: &str,
        actor: Uuid,
        rejection_reason: Option<&str>,
    ) -> Result<Receiving, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // stamp_column vem de uma lista fixa no serviço, nunca do cliente
        let sql = format!(
            r#"
            UPDATE receivings SET
                status = $2,
                {stamp_column}_by = $3,
                {stamp_column}_at = NOW(),
                rejection_reason = COALESCE($4, rejection_reason),
                updated_at = NOW(),
                updated_by = $3
            WHERE id = $1
            RETURNING *
            "#
        );
        sqlx::query_as::<_, Receiving>(&sql)
            .bind(id)
            .bind(status)
            .bind(actor)
            .bind(rejection_reason)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound("Recebimento".into()))
    }

    // ---
    // Expedições
    // ---

    pub async fn list_shipments(
        &self,
        page: Pagination,
        scope: AccessScope,
    ) -> Result<Vec<Shipment>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM shipments WHERE 1=1");
        push_scope(&mut qb, scope, "packed_by", &["warehouse_id"]);
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb
            .build_query_as::<Shipment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_shipment(&self, id: Uuid) -> Result<Shipment, AppError> {
        sqlx::query_as::<_, Shipment>("SELECT * FROM shipments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Expedição".into()))
    }

    pub async fn get_shipment_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Shipment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Shipment>("SELECT * FROM shipments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound("Expedição".into()))
    }

    pub async fn create_shipment<'e, E>(
        &self,
        executor: E,
        shipment_no: &str,
        payload: &CreateShipmentPayload,
        actor: Uuid,
    ) -> Result<Shipment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Shipment>(
            r#"
            INSERT INTO shipments (
                shipment_no, order_no, customer_name, customer_address,
                warehouse_id, location_id, packed_by, carrier, tracking_number,
                notes, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $7, $7)
            RETURNING *
            "#,
        )
        .bind(shipment_no)
        .bind(&payload.order_no)
        .bind(&payload.customer_name)
        .bind(&payload.customer_address)
        .bind(payload.warehouse_id)
        .bind(payload.location_id)
        .bind(actor)
        .bind(&payload.carrier)
        .bind(&payload.tracking_number)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "número de expedição"))
    }

    pub async fn insert_shipment_item<'e, E>(
        &self,
        executor: E,
        shipment_id: Uuid,
        item: &CreateShipmentItemPayload,
    ) -> Result<ShipmentItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ShipmentItem>(
            r#"
            INSERT INTO shipment_items (
                shipment_id, product_id, ordered_quantity, shipped_quantity, unit_price
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(shipment_id)
        .bind(item.product_id)
        .bind(item.ordered_quantity)
        .bind(item.shipped_quantity)
        .bind(item.unit_price)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "produto na expedição"))
    }

    pub async fn list_shipment_items(
        &self,
        shipment_id: Uuid,
    ) -> Result<Vec<ShipmentItem>, AppError> {
        let rows = sqlx::query_as::<_, ShipmentItem>(
            "SELECT * FROM shipment_items WHERE shipment_id = $1 ORDER BY id",
        )
        .bind(shipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn mark_shipment_packed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        actor: Uuid,
    ) -> Result<Shipment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Shipment>(
            r#"
            UPDATE shipments SET
                status = 'packed', packed_at = NOW(),
                updated_at = NOW(), updated_by = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Expedição".into()))
    }

    pub async fn mark_shipment_shipped<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        actor: Uuid,
        carrier: &str,
        tracking_number: Option<&str>,
    ) -> Result<Shipment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Shipment>(
            r#"
            UPDATE shipments SET
                status = 'shipped', shipped_by = $2, shipped_at = NOW(),
                carrier = $3, tracking_number = COALESCE($4, tracking_number),
                updated_at = NOW(), updated_by = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .bind(carrier)
        .bind(tracking_number)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Expedição".into()))
    }

    pub async fn mark_shipment_delivered<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        actor: Uuid,
    ) -> Result<Shipment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Shipment>(
            r#"
            UPDATE shipments SET
                status = 'delivered', delivered_at = NOW(),
                updated_at = NOW(), updated_by = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Expedição".into()))
    }

    pub async fn mark_shipment_cancelled<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        actor: Uuid,
    ) -> Result<Shipment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Shipment>(
            r#"
            UPDATE shipments SET
                status = 'cancelled',
                updated_at = NOW(), updated_by = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Expedição".into()))
    }

    // ---
    // Devoluções
    // ---

    pub async fn list_returns(
        &self,
        page: Pagination,
        scope: AccessScope,
    ) -> Result<Vec<Return>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM returns WHERE 1=1");
        push_scope(&mut qb, scope, "received_by", &[]);
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb.build_query_as::<Return>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get_return(&self, id: Uuid) -> Result<Return, AppError> {
        sqlx::query_as::<_, Return>("SELECT * FROM returns WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Devolução".into()))
    }

    pub async fn get_return_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Return, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Return>("SELECT * FROM returns WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound("Devolução".into()))
    }

    pub async fn create_return<'e, E>(
        &self,
        executor: E,
        return_no: &str,
        payload: &CreateReturnPayload,
        actor: Uuid,
    ) -> Result<Return, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Return>(
            r#"
            INSERT INTO returns (
                return_no, original_order_no, customer_name, customer_address,
                return_reason, received_by, refund_amount, notes,
                created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $6, $6)
            RETURNING *
            "#,
        )
        .bind(return_no)
        .bind(&payload.original_order_no)
        .bind(&payload.customer_name)
        .bind(&payload.customer_address)
        .bind(payload.return_reason)
        .bind(actor)
        .bind(payload.refund_amount)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "número de devolução"))
    }

    pub async fn insert_return_item<'e, E>(
        &self,
        executor: E,
        return_id: Uuid,
        item: &CreateReturnItemPayload,
    ) -> Result<ReturnItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ReturnItem>(
            r#"
            INSERT INTO return_items (
                return_id, product_id, returned_quantity, condition, unit_price
            )
            VALUES ($1, $2, $3, COALESCE($4, 'used'), $5)
            RETURNING *
            "#,
        )
        .bind(return_id)
        .bind(item.product_id)
        .bind(item.returned_quantity)
        .bind(item.condition)
        .bind(item.unit_price)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "produto na devolução"))
    }

    pub async fn list_return_items(&self, return_id: Uuid) -> Result<Vec<ReturnItem>, AppError> {
        let rows = sqlx::query_as::<_, ReturnItem>(
            "SELECT * FROM return_items WHERE return_id = $1 ORDER BY id",
        )
        .bind(return_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn set_return_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: crate::models::operations::ReturnStatus,
        stamp_column: &str,
        actor: Uuid,
        refund_amount: Option<Decimal>,
        rejection_reason: Option<&str>,
    ) -> Result<Return, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // stamp_column vem de uma lista fixa no serviço, nunca do cliente
        let sql = format!(
            r#"
            UPDATE returns SET
                status = $2,
                {stamp_column}_by = $3,
                {stamp_column}_at = NOW(),
                refund_amount = COALESCE($4, refund_amount),
                rejection_reason = COALESCE($5, rejection_reason),
                updated_at = NOW(),
                updated_by = $3
            WHERE id = $1
            RETURNING *
            "#
        );
        sqlx::query_as::<_, Return>(&sql)
            .bind(id)
            .bind(status)
            .bind(actor)
            .bind(refund_amount)
            .bind(rejection_reason)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound("Devolução".into()))
    }

    // ---
    // Pedidos
    // ---

    pub async fn list_orders(
        &self,
        page: Pagination,
        scope: AccessScope,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM orders WHERE 1=1");
        push_scope(&mut qb, scope, "created_by", &[]);
        if let Some(status) = status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb.build_query_as::<Order>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order, AppError> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Pedido".into()))
    }

    pub async fn get_order_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound("Pedido".into()))
    }

    /// Insere o pedido com os totais já calculados pelo serviço.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        order_no: &str,
        payload: &CreateOrderPayload,
        subtotal: Decimal,
        total_amount: Decimal,
        actor: Uuid,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                order_no, customer_name, customer_email, customer_phone,
                customer_address, order_type, subtotal, tax_amount,
                shipping_amount, discount_amount, total_amount, customer_notes,
                internal_notes, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'standard'), $7,
                    COALESCE($8, 0), COALESCE($9, 0), COALESCE($10, 0), $11,
                    $12, $13, $14, $14)
            RETURNING *
            "#,
        )
        .bind(order_no)
        .bind(&payload.customer_name)
        .bind(&payload.customer_email)
        .bind(&payload.customer_phone)
        .bind(&payload.customer_address)
        .bind(payload.order_type)
        .bind(subtotal)
        .bind(payload.tax_amount)
        .bind(payload.shipping_amount)
        .bind(payload.discount_amount)
        .bind(total_amount)
        .bind(&payload.customer_notes)
        .bind(&payload.internal_notes)
        .bind(actor)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "número de pedido"))
    }

    pub async fn insert_order_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
        discount_percent: Decimal,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (
                order_id, product_id, quantity, unit_price, discount_percent
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .bind(discount_percent)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "produto no pedido"))
    }

    pub async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, AppError> {
        let rows = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn set_order_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: OrderStatus,
        actor: Uuid,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Os carimbos de processamento/envio/entrega acompanham o status.
        let stamp = match status {
            OrderStatus::Processing => ", processed_by = $3, processed_at = NOW()",
            OrderStatus::Shipped => ", shipped_at = NOW()",
            OrderStatus::Delivered => ", delivered_at = NOW()",
            _ => "",
        };
        let sql = format!(
            r#"
            UPDATE orders SET
                status = $2{stamp},
                updated_at = NOW(),
                updated_by = $3
            WHERE id = $1
            RETURNING *
            "#
        );
        sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(status)
            .bind(actor)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound("Pedido".into()))
    }

    /// Contagens por status e receita dos pedidos expedidos/entregues,
    /// opcionalmente limitadas a uma janela recente.
    pub async fn order_summary(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<OrderSummary, AppError> {
        let mut qb = QueryBuilder::new(
            r#"
            SELECT COUNT(*) AS total_orders,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending_orders,
                   COUNT(*) FILTER (WHERE status = 'shipped') AS shipped_orders,
                   COUNT(*) FILTER (WHERE status = 'delivered') AS delivered_orders,
                   COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled_orders,
                   COALESCE(SUM(total_amount) FILTER (
                       WHERE status IN ('shipped', 'delivered')), 0) AS total_revenue
            FROM orders WHERE 1=1
            "#,
        );
        if let Some(since) = since {
            qb.push(" AND created_at >= ");
            qb.push_bind(since);
        }

        let summary = qb
            .build_query_as::<OrderSummary>()
            .fetch_one(&self.pool)
            .await?;
        Ok(summary)
    }
}
