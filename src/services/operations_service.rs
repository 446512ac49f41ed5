// src/services/operations_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Pagination},
    db::operations_repo::OperationsRepository,
    models::{
        auth::AccessScope,
        operations::{
            CreateOrderPayload, CreateReceivingPayload, CreateReturnPayload,
            CreateShipmentPayload, Order, OrderDetail, OrderStatus, OrderSummary, Receiving,
            ReceivingDetail, ReceivingStatus, RejectPayload, Return, ReturnDetail,
            ReturnStatus, Shipment, ShipmentDetail, ShipmentStatus, ShipPayload,
        },
        workflow::Workflow,
    },
    services::document_service::{DocumentKind, DocumentService},
};

#[derive(Clone)]
pub struct OperationsService {
    pool: PgPool,
    repo: OperationsRepository,
    documents: DocumentService,
}

impl OperationsService {
    pub fn new(pool: PgPool, repo: OperationsRepository, documents: DocumentService) -> Self {
        Self {
            pool,
            repo,
            documents,
        }
    }

    // ---
    // Recebimentos
    // ---

    pub async fn list_receivings(
        &self,
        page: Pagination,
        scope: AccessScope,
    ) -> Result<Vec<Receiving>, AppError> {
        self.repo.list_receivings(page, scope).await
    }

    pub async fn get_receiving(&self, id: Uuid) -> Result<ReceivingDetail, AppError> {
        let receiving = self.repo.get_receiving(id).await?;
        let items = self.repo.list_receiving_items(id).await?;
        Ok(ReceivingDetail { receiving, items })
    }

    pub async fn create_receiving(
        &self,
        payload: CreateReceivingPayload,
        actor: Uuid,
    ) -> Result<ReceivingDetail, AppError> {
        payload.validate()?;

        let mut tx = self.pool.begin().await?;
        let number = self
            .documents
            .next_number(&mut *tx, DocumentKind::Receiving)
            .await?;
        let receiving = self
            .repo
            .create_receiving(&mut *tx, &number, &payload, actor)
            .await?;

        let mut items = Vec::with_capacity(payload.items.len());
        for item in &payload.items {
            items.push(
                self.repo
                    .insert_receiving_item(&mut *tx, receiving.id, item)
                    .await?,
            );
        }
        tx.commit().await?;

        Ok(ReceivingDetail { receiving, items })
    }

    async fn transition_receiving(
        &self,
        id: Uuid,
        to: ReceivingStatus,
        stamp_column: &str,
        actor: Uuid,
        rejection_reason: Option<&str>,
    ) -> Result<Receiving, AppError> {
        let mut tx = self.pool.begin().await?;
        let receiving = self.repo.get_receiving_for_update(&mut *tx, id).await?;
        receiving.status.ensure(to)?;

        let updated = self
            .repo
            .set_receiving_status(&mut *tx, id, to, stamp_column, actor, rejection_reason)
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn receive_receiving(&self, id: Uuid, actor: Uuid) -> Result<Receiving, AppError> {
        self.transition_receiving(id, ReceivingStatus::Received, "received", actor, None)
            .await
    }

    pub async fn inspect_receiving(&self, id: Uuid, actor: Uuid) -> Result<Receiving, AppError> {
        self.transition_receiving(id, ReceivingStatus::Inspected, "inspected", actor, None)
            .await
    }

    pub async fn approve_receiving(&self, id: Uuid, actor: Uuid) -> Result<Receiving, AppError> {
        self.transition_receiving(id, ReceivingStatus::Approved, "approved", actor, None)
            .await
    }

    // quem rejeitou fica registrado em approved_by, como decisor da inspeção
    pub async fn reject_receiving(
        &self,
        id: Uuid,
        payload: RejectPayload,
        actor: Uuid,
    ) -> Result<Receiving, AppError> {
        payload.validate()?;
        self.transition_receiving(
            id,
            ReceivingStatus::Rejected,
            "approved",
            actor,
            Some(&payload.rejection_reason),
        )
        .await
    }

    // ---
    // Expedições
    // ---

    pub async fn list_shipments(
        &self,
        page: Pagination,
        scope: AccessScope,
    ) -> Result<Vec<Shipment>, AppError> {
        self.repo.list_shipments(page, scope).await
    }

    pub async fn get_shipment(&self, id: Uuid) -> Result<ShipmentDetail, AppError> {
        let shipment = self.repo.get_shipment(id).await?;
        let items = self.repo.list_shipment_items(id).await?;
        Ok(ShipmentDetail { shipment, items })
    }

    pub async fn create_shipment(
        &self,
        payload: CreateShipmentPayload,
        actor: Uuid,
    ) -> Result<ShipmentDetail, AppError> {
        payload.validate()?;

        let mut tx = self.pool.begin().await?;
        let number = self
            .documents
            .next_number(&mut *tx, DocumentKind::Shipment)
            .await?;
        let shipment = self
            .repo
            .create_shipment(&mut *tx, &number, &payload, actor)
            .await?;

        let mut items = Vec::with_capacity(payload.items.len());
        for item in &payload.items {
            items.push(
                self.repo
                    .insert_shipment_item(&mut *tx, shipment.id, item)
                    .await?,
            );
        }
        tx.commit().await?;

        Ok(ShipmentDetail { shipment, items })
    }

    pub async fn pack_shipment(&self, id: Uuid, actor: Uuid) -> Result<Shipment, AppError> {
        let mut tx = self.pool.begin().await?;
        let shipment = self.repo.get_shipment_for_update(&mut *tx, id).await?;
        shipment.status.ensure(ShipmentStatus::Packed)?;

        let updated = self.repo.mark_shipment_packed(&mut *tx, id, actor).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn ship_shipment(
        &self,
        id: Uuid,
        payload: ShipPayload,
        actor: Uuid,
    ) -> Result<Shipment, AppError> {
        payload.validate()?;

        let mut tx = self.pool.begin().await?;
        let shipment = self.repo.get_shipment_for_update(&mut *tx, id).await?;
        shipment.status.ensure(ShipmentStatus::Shipped)?;

        let updated = self
            .repo
            .mark_shipment_shipped(
                &mut *tx,
                id,
                actor,
                &payload.carrier,
                payload.tracking_number.as_deref(),
            )
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn deliver_shipment(&self, id: Uuid, actor: Uuid) -> Result<Shipment, AppError> {
        let mut tx = self.pool.begin().await?;
        let shipment = self.repo.get_shipment_for_update(&mut *tx, id).await?;
        shipment.status.ensure(ShipmentStatus::Delivered)?;

        let updated = self
            .repo
            .mark_shipment_delivered(&mut *tx, id, actor)
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn cancel_shipment(&self, id: Uuid, actor: Uuid) -> Result<Shipment, AppError> {
        let mut tx = self.pool.begin().await?;
        let shipment = self.repo.get_shipment_for_update(&mut *tx, id).await?;
        shipment.status.ensure(ShipmentStatus::Cancelled)?;

        let updated = self
            .repo
            .mark_shipment_cancelled(&mut *tx, id, actor)
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    // ---
    // Devoluções
    // ---

    pub async fn list_returns(
        &self,
        page: Pagination,
        scope: AccessScope,
    ) -> Result<Vec<Return>, AppError> {
        self.repo.list_returns(page, scope).await
    }

    pub async fn get_return(&self, id: Uuid) -> Result<ReturnDetail, AppError> {
        let return_doc = self.repo.get_return(id).await?;
        let items = self.repo.list_return_items(id).await?;
        Ok(ReturnDetail { return_doc, items })
    }

    pub async fn create_return(
        &self,
        payload: CreateReturnPayload,
        actor: Uuid,
    ) -> Result<ReturnDetail, AppError> {
        payload.validate()?;

        let mut tx = self.pool.begin().await?;
        let number = self
            .documents
            .next_number(&mut *tx, DocumentKind::Return)
            .await?;
        let return_doc = self
            .repo
            .create_return(&mut *tx, &number, &payload, actor)
            .await?;

        let mut items = Vec::with_capacity(payload.items.len());
        for item in &payload.items {
            items.push(
                self.repo
                    .insert_return_item(&mut *tx, return_doc.id, item)
                    .await?,
            );
        }
        tx.commit().await?;

        Ok(ReturnDetail { return_doc, items })
    }

    async fn transition_return(
        &self,
        id: Uuid,
        to: ReturnStatus,
        stamp_column: &str,
        actor: Uuid,
        refund_amount: Option<Decimal>,
        rejection_reason: Option<&str>,
    ) -> Result<Return, AppError> {
        let mut tx = self.pool.begin().await?;
        let return_doc = self.repo.get_return_for_update(&mut *tx, id).await?;
        return_doc.status.ensure(to)?;

        let updated = self
            .repo
            .set_return_status(
                &mut *tx,
                id,
                to,
                stamp_column,
                actor,
                refund_amount,
                rejection_reason,
            )
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn inspect_return(&self, id: Uuid, actor: Uuid) -> Result<Return, AppError> {
        self.transition_return(id, ReturnStatus::Inspected, "inspected", actor, None, None)
            .await
    }

    pub async fn approve_return(
        &self,
        id: Uuid,
        refund_amount: Option<Decimal>,
        actor: Uuid,
    ) -> Result<Return, AppError> {
        self.transition_return(
            id,
            ReturnStatus::Approved,
            "approved",
            actor,
            refund_amount,
            None,
        )
        .await
    }

    pub async fn reject_return(
        &self,
        id: Uuid,
        payload: RejectPayload,
        actor: Uuid,
    ) -> Result<Return, AppError> {
        payload.validate()?;
        self.transition_return(
            id,
            ReturnStatus::Rejected,
            "approved",
            actor,
            None,
            Some(&payload.rejection_reason),
        )
        .await
    }

    pub async fn process_return(&self, id: Uuid, actor: Uuid) -> Result<Return, AppError> {
        self.transition_return(id, ReturnStatus::Processed, "processed", actor, None, None)
            .await
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
        self.repo.list_orders(page, scope, status).await
    }

    pub async fn get_order(&self, id: Uuid) -> Result<OrderDetail, AppError> {
        let order = self.repo.get_order(id).await?;
        let items = self.repo.list_order_items(id).await?;
        Ok(OrderDetail { order, items })
    }

    pub async fn create_order(
        &self,
        payload: CreateOrderPayload,
        actor: Uuid,
    ) -> Result<OrderDetail, AppError> {
        payload.validate()?;

        // subtotal calculado dos itens; o total aplica imposto, frete e desconto
        let mut subtotal = Decimal::ZERO;
        let mut lines = Vec::with_capacity(payload.items.len());
        for item in &payload.items {
            let discount = item
                .discount_percent
                .and_then(Decimal::from_f64_retain)
                .unwrap_or(Decimal::ZERO);
            let gross = item.unit_price * Decimal::from(item.quantity);
            subtotal += gross * (Decimal::ONE_HUNDRED - discount) / Decimal::ONE_HUNDRED;
            lines.push((item, discount));
        }
        let total_amount = Order::compute_total(
            subtotal,
            payload.tax_amount.unwrap_or(Decimal::ZERO),
            payload.shipping_amount.unwrap_or(Decimal::ZERO),
            payload.discount_amount.unwrap_or(Decimal::ZERO),
        );

        let mut tx = self.pool.begin().await?;
        let number = self
            .documents
            .next_number(&mut *tx, DocumentKind::Order)
            .await?;
        let order = self
            .repo
            .create_order(&mut *tx, &number, &payload, subtotal, total_amount, actor)
            .await?;

        let mut items = Vec::with_capacity(lines.len());
        for (item, discount) in lines {
            items.push(
                self.repo
                    .insert_order_item(
                        &mut *tx,
                        order.id,
                        item.product_id,
                        item.quantity,
                        item.unit_price,
                        discount,
                    )
                    .await?,
            );
        }
        tx.commit().await?;

        Ok(OrderDetail { order, items })
    }

    pub async fn transition_order(
        &self,
        id: Uuid,
        to: OrderStatus,
        actor: Uuid,
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;
        let order = self.repo.get_order_for_update(&mut *tx, id).await?;
        order.status.ensure(to)?;

        let updated = self.repo.set_order_status(&mut *tx, id, to, actor).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn order_summary(&self) -> Result<OrderSummary, AppError> {
        self.repo.order_summary(None).await
    }
}
