// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    db::scope::push_scope,
    models::{
        auth::AccessScope,
        inventory::{
            Adjustment, AdjustmentType, CreateAdjustmentPayload, CreateTransferPayload,
            Transfer, TransferStatus,
        },
    },
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
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
        let mut qb = QueryBuilder::new("SELECT * FROM adjustments WHERE 1=1");
        push_scope(&mut qb, scope, "adjusted_by", &["warehouse_id"]);
        if only_pending {
            qb.push(" AND approved_by IS NULL");
        }
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb
            .build_query_as::<Adjustment>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_adjustment(&self, id: Uuid) -> Result<Adjustment, AppError> {
        sqlx::query_as::<_, Adjustment>("SELECT * FROM adjustments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Ajuste".into()))
    }

    /// Carrega e trava o ajuste para aprovação. O lock impede que duas
    /// aprovações concorrentes passem pela checagem de pendência.
    pub async fn get_adjustment_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Adjustment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Adjustment>("SELECT * FROM adjustments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound("Ajuste".into()))
    }

    /// Insere o documento já numerado, dentro da transação que consumiu a série.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_adjustment<'e, E>(
        &self,
        executor: E,
        adjustment_no: &str,
        payload: &CreateAdjustmentPayload,
        previous_qty: i32,
        adjustment_type: AdjustmentType,
        actor: Uuid,
    ) -> Result<Adjustment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Adjustment>(
            r#"
            INSERT INTO adjustments (
                adjustment_no, product_id, warehouse_id, location_id, previous_qty,
                adjusted_qty, adjustment_type, category, reason, adjusted_by,
                cost_impact, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $10, $10)
            RETURNING *
            "#,
        )
        .bind(adjustment_no)
        .bind(payload.product_id)
        .bind(payload.warehouse_id)
        .bind(payload.location_id)
        .bind(previous_qty)
        .bind(payload.adjusted_qty)
        .bind(adjustment_type)
        .bind(payload.category)
        .bind(&payload.reason)
        .bind(actor)
        .bind(payload.cost_impact)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "número de ajuste"))
    }

    pub async fn mark_adjustment_approved<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        approver: Uuid,
        cost_impact: Option<Decimal>,
    ) -> Result<Adjustment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Adjustment>(
            r#"
            UPDATE adjustments SET
                approved_by = $2,
                approved_at = NOW(),
                cost_impact = COALESCE($3, cost_impact),
                updated_at = NOW(),
                updated_by = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(approver)
        .bind(cost_impact)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Ajuste".into()))
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
        let mut qb = QueryBuilder::new("SELECT * FROM transfers WHERE 1=1");
        push_scope(
            &mut qb,
            scope,
            "requested_by",
            &["from_warehouse_id", "to_warehouse_id"],
        );
        if let Some(status) = status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb
            .build_query_as::<Transfer>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_transfer(&self, id: Uuid) -> Result<Transfer, AppError> {
        sqlx::query_as::<_, Transfer>("SELECT * FROM transfers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Transferência".into()))
    }

    pub async fn get_transfer_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Transfer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Transfer>("SELECT * FROM transfers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound("Transferência".into()))
    }

    pub async fn create_transfer<'e, E>(
        &self,
        executor: E,
        transfer_no: &str,
        payload: &CreateTransferPayload,
        actor: Uuid,
    ) -> Result<Transfer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Transfer>(
            r#"
            INSERT INTO transfers (
                transfer_no, from_warehouse_id, from_location_id, to_warehouse_id,
                to_location_id, product_id, quantity, unit_cost, requested_by,
                notes, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $9, $9)
            RETURNING *
            "#,
        )
        .bind(transfer_no)
        .bind(payload.from_warehouse_id)
        .bind(payload.from_location_id)
        .bind(payload.to_warehouse_id)
        .bind(payload.to_location_id)
        .bind(payload.product_id)
        .bind(payload.quantity)
        .bind(payload.unit_cost)
        .bind(actor)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique(e, "número de transferência"))
    }

    pub async fn mark_transfer_approved<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        approver: Uuid,
    ) -> Result<Transfer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Transfer>(
            r#"
            UPDATE transfers SET
                status = 'approved',
                approved_by = $2,
                approved_at = NOW(),
                updated_at = NOW(),
                updated_by = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(approver)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Transferência".into()))
    }

    pub async fn mark_transfer_completed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        operator: Uuid,
    ) -> Result<Transfer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Transfer>(
            r#"
            UPDATE transfers SET
                status = 'completed',
                transferred_by = $2,
                transferred_at = NOW(),
                updated_at = NOW(),
                updated_by = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(operator)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Transferência".into()))
    }

    pub async fn mark_transfer_cancelled<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        actor: Uuid,
    ) -> Result<Transfer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Transfer>(
            r#"
            UPDATE transfers SET
                status = 'cancelled',
                updated_at = NOW(),
                updated_by = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Transferência".into()))
    }
}
