// src/services/inventory_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Pagination},
    db::{inventory_repo::InventoryRepository, stock_repo::StockRepository},
    models::{
        analytics::{InventorySummary, LowStockEntry, MovementType},
        auth::AccessScope,
        inventory::{
            Adjustment, AdjustmentType, CreateAdjustmentPayload, CreateStockBufferPayload,
            CreateStockPayload, CreateTransferPayload, Stock, StockBuffer, StockFilter,
            Transfer, TransferStatus, UpdateStockBufferPayload, UpdateStockPayload,
        },
        workflow::Workflow,
    },
    services::document_service::{DocumentKind, DocumentService},
};

#[derive(Clone)]
pub struct InventoryService {
    pool: PgPool,
    stock_repo: StockRepository,
    inventory_repo: InventoryRepository,
    documents: DocumentService,
}

impl InventoryService {
    pub fn new(
        pool: PgPool,
        stock_repo: StockRepository,
        inventory_repo: InventoryRepository,
        documents: DocumentService,
    ) -> Self {
        Self {
            pool,
            stock_repo,
            inventory_repo,
            documents,
        }
    }

    // ---
    // Saldos
    // ---

    pub async fn list_stocks(
        &self,
        page: Pagination,
        filter: StockFilter,
    ) -> Result<Vec<Stock>, AppError> {
        self.stock_repo.list_stocks(page, &filter).await
    }

    pub async fn get_stock(&self, id: Uuid) -> Result<Stock, AppError> {
        self.stock_repo.get_stock(id).await
    }

    pub async fn create_stock(
        &self,
        payload: CreateStockPayload,
        actor: Uuid,
    ) -> Result<Stock, AppError> {
        payload.validate()?;
        self.stock_repo.create_stock(&payload, actor).await
    }

    pub async fn update_stock(
        &self,
        id: Uuid,
        payload: UpdateStockPayload,
        actor: Uuid,
    ) -> Result<Stock, AppError> {
        payload.validate()?;
        self.stock_repo.update_stock(id, &payload, actor).await
    }

    pub async fn delete_stock(&self, id: Uuid) -> Result<(), AppError> {
        self.stock_repo.delete_stock(id).await
    }

    pub async fn low_stock(&self, page: Pagination) -> Result<Vec<LowStockEntry>, AppError> {
        self.stock_repo.low_stock(page).await
    }

    pub async fn inventory_summary(&self) -> Result<InventorySummary, AppError> {
        self.stock_repo.inventory_summary().await
    }

    // ---
    // Buffers
    // ---

    pub async fn list_buffers(&self, page: Pagination) -> Result<Vec<StockBuffer>, AppError> {
        self.stock_repo.list_buffers(page).await
    }

    pub async fn get_buffer(&self, id: Uuid) -> Result<StockBuffer, AppError> {
        self.stock_repo.get_buffer(id).await
    }

    pub async fn find_buffer_by_product(
        &self,
        product_id: Uuid,
        warehouse_id: Option<Uuid>,
    ) -> Result<StockBuffer, AppError> {
        self.stock_repo
            .find_buffer_by_product(product_id, warehouse_id)
            .await
    }

    pub async fn create_buffer(
        &self,
        payload: CreateStockBufferPayload,
        actor: Uuid,
    ) -> Result<StockBuffer, AppError> {
        payload.validate()?;
        self.stock_repo.create_buffer(&payload, actor).await
    }

    pub async fn update_buffer(
        &self,
        id: Uuid,
        payload: UpdateStockBufferPayload,
        actor: Uuid,
    ) -> Result<StockBuffer, AppError> {
        payload.validate()?;
        self.stock_repo.update_buffer(id, &payload, actor).await
    }

    pub async fn delete_buffer(&self, id: Uuid) -> Result<(), AppError> {
        self.stock_repo.delete_buffer(id).await
    }

    // ---
    // Ajustes
    // ---

    pub async fn list_adjustments(
        &self,
        page: Pagination,
        scope: AccessScope,
        only_pending: bool,
    ) -> Result<Vec<Adjustment>, AppError> {
        self.inventory_repo
            .list_adjustments(page, scope, only_pending)
            .await
    }

    pub async fn get_adjustment(&self, id: Uuid) -> Result<Adjustment, AppError> {
        self.inventory_repo.get_adjustment(id).await
    }

    /// Cria o ajuste já numerado, fotografando a quantidade atual da posição.
    /// O saldo só muda na aprovação.
    pub async fn create_adjustment(
        &self,
        payload: CreateAdjustmentPayload,
        actor: Uuid,
    ) -> Result<Adjustment, AppError> {
        payload.validate()?;

        let mut tx = self.pool.begin().await?;

        let previous_qty = self
            .stock_repo
            .lock_stock(
                &mut *tx,
                payload.product_id,
                payload.warehouse_id,
                payload.location_id,
            )
            .await?
            .map(|s| s.quantity_available)
            .unwrap_or(0);

        let adjustment_type = AdjustmentType::from_delta(payload.adjusted_qty - previous_qty);
        let number = self
            .documents
            .next_number(&mut *tx, DocumentKind::Adjustment)
            .await?;
        let adjustment = self
            .inventory_repo
            .create_adjustment(
                &mut *tx,
                &number,
                &payload,
                previous_qty,
                adjustment_type,
                actor,
            )
            .await?;

        tx.commit().await?;
        Ok(adjustment)
    }

    /// Aprova o ajuste e aplica o delta no saldo, tudo na mesma transação.
    /// Aprovar de novo falha com 400 e não mexe em nada.
    pub async fn approve_adjustment(
        &self,
        id: Uuid,
        approver: Uuid,
    ) -> Result<Adjustment, AppError> {
        let mut tx = self.pool.begin().await?;

        let adjustment = self
            .inventory_repo
            .get_adjustment_for_update(&mut *tx, id)
            .await?;
        if !adjustment.is_pending() {
            return Err(AppError::PreconditionFailed(
                "Ajuste já foi aprovado.".to_string(),
            ));
        }

        let delta = adjustment.quantity_delta();
        let stock = self
            .stock_repo
            .lock_stock(
                &mut *tx,
                adjustment.product_id,
                adjustment.warehouse_id,
                adjustment.location_id,
            )
            .await?;

        let current = stock.as_ref().map(|s| s.quantity_available).unwrap_or(0);
        if current + delta < 0 {
            return Err(AppError::PreconditionFailed(
                "Ajuste deixaria o estoque negativo.".to_string(),
            ));
        }

        let unit_cost = stock.as_ref().and_then(|s| s.unit_cost);
        self.stock_repo
            .apply_delta(
                &mut *tx,
                adjustment.product_id,
                adjustment.warehouse_id,
                adjustment.location_id,
                delta,
                unit_cost,
                approver,
            )
            .await?;

        self.stock_repo
            .record_movement(
                &mut *tx,
                adjustment.product_id,
                adjustment.warehouse_id,
                adjustment.location_id,
                MovementType::Adjustment,
                delta,
                unit_cost,
                "adjustment",
                adjustment.id,
                approver,
                Some(&adjustment.reason),
            )
            .await?;

        // custo derivado do saldo quando o documento não trouxe um
        let cost_impact = adjustment
            .cost_impact
            .or_else(|| unit_cost.map(|c| c * rust_decimal::Decimal::from(delta)));
        let approved = self
            .inventory_repo
            .mark_adjustment_approved(&mut *tx, id, approver, cost_impact)
            .await?;

        tx.commit().await?;
        tracing::info!(adjustment = %approved.adjustment_no, delta, "ajuste aprovado");
        Ok(approved)
    }

    // ---
    // Transferências
    // ---

    pub async fn list_transfers(
        &self,
        page: Pagination,
        scope: AccessScope,
        status: Option<TransferStatus>,
    ) -> Result<Vec<Transfer>, AppError> {
        self.inventory_repo.list_transfers(page, scope, status).await
    }

    pub async fn get_transfer(&self, id: Uuid) -> Result<Transfer, AppError> {
        self.inventory_repo.get_transfer(id).await
    }

    pub async fn create_transfer(
        &self,
        payload: CreateTransferPayload,
        actor: Uuid,
    ) -> Result<Transfer, AppError> {
        payload.validate()?;
        if payload.from_warehouse_id == payload.to_warehouse_id
            && payload.from_location_id == payload.to_location_id
        {
            return Err(AppError::PreconditionFailed(
                "Origem e destino da transferência são a mesma posição.".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let number = self
            .documents
            .next_number(&mut *tx, DocumentKind::Transfer)
            .await?;
        let transfer = self
            .inventory_repo
            .create_transfer(&mut *tx, &number, &payload, actor)
            .await?;
        tx.commit().await?;
        Ok(transfer)
    }

    pub async fn approve_transfer(&self, id: Uuid, approver: Uuid) -> Result<Transfer, AppError> {
        let mut tx = self.pool.begin().await?;
        let transfer = self
            .inventory_repo
            .get_transfer_for_update(&mut *tx, id)
            .await?;
        transfer.status.ensure(TransferStatus::Approved)?;

        let approved = self
            .inventory_repo
            .mark_transfer_approved(&mut *tx, id, approver)
            .await?;
        tx.commit().await?;
        Ok(approved)
    }

    /// Executa uma transferência aprovada: debita a origem, credita o destino
    /// e grava o par de movimentações, tudo ou nada.
    pub async fn execute_transfer(&self, id: Uuid, operator: Uuid) -> Result<Transfer, AppError> {
        let mut tx = self.pool.begin().await?;
        let transfer = self
            .inventory_repo
            .get_transfer_for_update(&mut *tx, id)
            .await?;
        transfer.status.ensure(TransferStatus::Completed)?;

        let source = self
            .stock_repo
            .lock_stock(
                &mut *tx,
                transfer.product_id,
                transfer.from_warehouse_id,
                transfer.from_location_id,
            )
            .await?;
        let available = source.as_ref().map(|s| s.quantity_available).unwrap_or(0);
        if available < transfer.quantity {
            return Err(AppError::PreconditionFailed(
                "Estoque insuficiente na posição de origem.".to_string(),
            ));
        }

        self.stock_repo
            .apply_delta(
                &mut *tx,
                transfer.product_id,
                transfer.from_warehouse_id,
                transfer.from_location_id,
                -transfer.quantity,
                Some(transfer.unit_cost),
                operator,
            )
            .await?;
        self.stock_repo
            .apply_delta(
                &mut *tx,
                transfer.product_id,
                transfer.to_warehouse_id,
                transfer.to_location_id,
                transfer.quantity,
                Some(transfer.unit_cost),
                operator,
            )
            .await?;

        self.stock_repo
            .record_movement(
                &mut *tx,
                transfer.product_id,
                transfer.from_warehouse_id,
                transfer.from_location_id,
                MovementType::Transfer,
                -transfer.quantity,
                Some(transfer.unit_cost),
                "transfer",
                transfer.id,
                operator,
                transfer.notes.as_deref(),
            )
            .await?;
        self.stock_repo
            .record_movement(
                &mut *tx,
                transfer.product_id,
                transfer.to_warehouse_id,
                transfer.to_location_id,
                MovementType::Transfer,
                transfer.quantity,
                Some(transfer.unit_cost),
                "transfer",
                transfer.id,
                operator,
                transfer.notes.as_deref(),
            )
            .await?;

        let completed = self
            .inventory_repo
            .mark_transfer_completed(&mut *tx, id, operator)
            .await?;

        tx.commit().await?;
        tracing::info!(
            transfer = %completed.transfer_no,
            quantity = completed.quantity,
            "transferência executada"
        );
        Ok(completed)
    }

    pub async fn cancel_transfer(&self, id: Uuid, actor: Uuid) -> Result<Transfer, AppError> {
        let mut tx = self.pool.begin().await?;
        let transfer = self
            .inventory_repo
            .get_transfer_for_update(&mut *tx, id)
            .await?;
        transfer.status.ensure(TransferStatus::Cancelled)?;

        let cancelled = self
            .inventory_repo
            .mark_transfer_cancelled(&mut *tx, id, actor)
            .await?;
        tx.commit().await?;
        Ok(cancelled)
    }
}
