// src/db/stock_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    models::{
        analytics::{InventorySummary, LowStockEntry, MovementType, StockMovement},
        inventory::{
            CreateStockBufferPayload, CreateStockPayload, Stock, StockBuffer, StockFilter,
            UpdateStockBufferPayload, UpdateStockPayload,
        },
    },
};

// Predicado de estoque baixo, compartilhado entre o relatório e o resumo.
// Avaliado saldo a saldo, sem agregação: uma posição esgotada conta como
// baixa mesmo que outras posições do mesmo produto/armazém estejam cheias.
// A igualdade com o limiar conta como baixo; só estritamente acima dos dois
// limiares fica de fora.
const LOW_STOCK_ROWS: &str = r#"
    SELECT s.id
    FROM stocks s
    JOIN products p ON p.id = s.product_id
    LEFT JOIN stock_buffers b
        ON b.product_id = s.product_id AND b.warehouse_id = s.warehouse_id
    WHERE s.quantity_available <= p.reorder_point
       OR (b.minimum_quantity IS NOT NULL
           AND s.quantity_available <= b.minimum_quantity)
"#;

// Relatório completo, mesmo predicado do LOW_STOCK_ROWS, ordenado pela
// falta crescente.
const LOW_STOCK_REPORT: &str = r#"
    SELECT p.id AS product_id,
           p.sku,
           p.name AS product_name,
           w.id AS warehouse_id,
           w.name AS warehouse_name,
           p.minimum_stock,
           p.reorder_point,
           s.quantity_available::BIGINT AS quantity_available,
           GREATEST(0, p.reorder_point - s.quantity_available)::BIGINT AS shortage,
           b.minimum_quantity
    FROM stocks s
    JOIN products p ON p.id = s.product_id
    JOIN warehouses w ON w.id = s.warehouse_id
    LEFT JOIN stock_buffers b
        ON b.product_id = s.product_id AND b.warehouse_id = s.warehouse_id
    WHERE s.quantity_available <= p.reorder_point
       OR (b.minimum_quantity IS NOT NULL
           AND s.quantity_available <= b.minimum_quantity)
    ORDER BY shortage ASC
    LIMIT $1 OFFSET $2
"#;

#[derive(Clone)]
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Saldos
    // ---

    pub async fn list_stocks(
        &self,
        page: Pagination,
        filter: &StockFilter,
    ) -> Result<Vec<Stock>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM stocks WHERE 1=1");
        if let Some(product) = filter.product_id {
            qb.push(" AND product_id = ");
            qb.push_bind(product);
        }
        if let Some(warehouse) = filter.warehouse_id {
            qb.push(" AND warehouse_id = ");
            qb.push_bind(warehouse);
        }
        if let Some(location) = filter.location_id {
            qb.push(" AND location_id = ");
            qb.push_bind(location);
        }
        if let Some(lot) = &filter.lot_number {
            qb.push(" AND lot_number = ");
            qb.push_bind(lot.clone());
        }
        qb.push(" ORDER BY updated_at DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb.build_query_as::<Stock>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get_stock(&self, id: Uuid) -> Result<Stock, AppError> {
        sqlx::query_as::<_, Stock>("SELECT * FROM stocks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Saldo de estoque".into()))
    }

    /// Carrega e trava (FOR UPDATE) o saldo de uma posição. Usado pelas
    /// transições que debitam estoque, dentro da transação do chamador.
    pub async fn lock_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        warehouse_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<Stock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock = sqlx::query_as::<_, Stock>(
            r#"
            SELECT * FROM stocks
            WHERE product_id = $1 AND warehouse_id = $2 AND location_id = $3
              AND lot_number IS NULL
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .bind(location_id)
        .fetch_optional(executor)
        .await?;
        Ok(stock)
    }

    pub async fn create_stock(
        &self,
        payload: &CreateStockPayload,
        actor: Uuid,
    ) -> Result<Stock, AppError> {
        let available = payload.quantity_available;
        let reserved = payload.quantity_reserved.unwrap_or(0);
        let allocated = payload.quantity_allocated.unwrap_or(0);
        let total_value =
            Stock::compute_total_value(payload.unit_cost, available + reserved + allocated);

        sqlx::query_as::<_, Stock>(
            r#"
            INSERT INTO stocks (
                product_id, warehouse_id, location_id, quantity_available,
                quantity_reserved, quantity_allocated, lot_number, expiry_date,
                manufacturing_date, unit_cost, total_value, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *
            "#,
        )
        .bind(payload.product_id)
        .bind(payload.warehouse_id)
        .bind(payload.location_id)
        .bind(available)
        .bind(reserved)
        .bind(allocated)
        .bind(&payload.lot_number)
        .bind(payload.expiry_date)
        .bind(payload.manufacturing_date)
        .bind(payload.unit_cost)
        .bind(total_value)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, "saldo para produto/armazém/posição/lote"))
    }

    pub async fn update_stock(
        &self,
        id: Uuid,
        payload: &UpdateStockPayload,
        actor: Uuid,
    ) -> Result<Stock, AppError> {
        // total_value é derivado, recalculado aqui com os valores novos
        sqlx::query_as::<_, Stock>(
            r#"
            UPDATE stocks SET
                quantity_available = COALESCE($2, quantity_available),
                quantity_reserved = COALESCE($3, quantity_reserved),
                quantity_allocated = COALESCE($4, quantity_allocated),
                lot_number = COALESCE($5, lot_number),
                expiry_date = COALESCE($6, expiry_date),
                manufacturing_date = COALESCE($7, manufacturing_date),
                unit_cost = COALESCE($8, unit_cost),
                total_value = COALESCE($8, unit_cost) * (
                    COALESCE($2, quantity_available)
                    + COALESCE($3, quantity_reserved)
                    + COALESCE($4, quantity_allocated)
                ),
                updated_at = NOW(),
                updated_by = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.quantity_available)
        .bind(payload.quantity_reserved)
        .bind(payload.quantity_allocated)
        .bind(&payload.lot_number)
        .bind(payload.expiry_date)
        .bind(payload.manufacturing_date)
        .bind(payload.unit_cost)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Saldo de estoque".into()))
    }

    pub async fn delete_stock(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM stocks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Saldo de estoque".into()));
        }
        Ok(())
    }

    /// Aplica um delta no disponível de uma posição, criando o saldo se
    /// ainda não existir. UPSERT atômico no molde de um incremento de
    /// contador; o valor total é rederivado na mesma query.
    pub async fn apply_delta<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        warehouse_id: Uuid,
        location_id: Uuid,
        delta: i32,
        unit_cost: Option<Decimal>,
        actor: Uuid,
    ) -> Result<Stock, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock = sqlx::query_as::<_, Stock>(
            r#"
            INSERT INTO stocks (
                product_id, warehouse_id, location_id, quantity_available,
                unit_cost, total_value, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $5 * $4, $6, $6)
            ON CONFLICT (product_id, warehouse_id, location_id, lot_number)
            DO UPDATE SET
                quantity_available = stocks.quantity_available + $4,
                unit_cost = COALESCE(stocks.unit_cost, $5),
                total_value = COALESCE(stocks.unit_cost, $5) * (
                    stocks.quantity_available + $4
                    + stocks.quantity_reserved
                    + stocks.quantity_allocated
                ),
                updated_at = NOW(),
                updated_by = $6
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .bind(location_id)
        .bind(delta)
        .bind(unit_cost)
        .bind(actor)
        .fetch_one(executor)
        .await?;

        Ok(stock)
    }

    // ---
    // Relatórios de saldo
    // ---

    pub async fn low_stock(&self, page: Pagination) -> Result<Vec<LowStockEntry>, AppError> {
        let rows = sqlx::query_as::<_, LowStockEntry>(LOW_STOCK_REPORT)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn inventory_summary(&self) -> Result<InventorySummary, AppError> {
        let summary = sqlx::query_as::<_, InventorySummary>(&format!(
            r#"
            SELECT COUNT(DISTINCT s.product_id) AS total_products,
                   COUNT(DISTINCT s.warehouse_id) AS total_warehouses,
                   COUNT(DISTINCT s.location_id) AS total_locations,
                   COALESCE(SUM(s.quantity_available), 0)::BIGINT AS total_quantity,
                   COALESCE(SUM(s.total_value), 0) AS total_value,
                   (SELECT COUNT(*) FROM ({LOW_STOCK_ROWS}) low) AS low_stock_count
            FROM stocks s
            "#
        ))
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }

    // ---
    // Buffers de reposição
    // ---

    pub async fn list_buffers(&self, page: Pagination) -> Result<Vec<StockBuffer>, AppError> {
        let rows = sqlx::query_as::<_, StockBuffer>(
            "SELECT * FROM stock_buffers ORDER BY updated_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_buffer(&self, id: Uuid) -> Result<StockBuffer, AppError> {
        sqlx::query_as::<_, StockBuffer>("SELECT * FROM stock_buffers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Buffer de estoque".into()))
    }

    pub async fn find_buffer_by_product(
        &self,
        product_id: Uuid,
        warehouse_id: Option<Uuid>,
    ) -> Result<StockBuffer, AppError> {
        let mut qb =
            QueryBuilder::new("SELECT * FROM stock_buffers WHERE product_id = ");
        qb.push_bind(product_id);
        if let Some(wh) = warehouse_id {
            qb.push(" AND warehouse_id = ");
            qb.push_bind(wh);
        }
        qb.push(" LIMIT 1");

        qb.build_query_as::<StockBuffer>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Buffer de estoque".into()))
    }

    pub async fn create_buffer(
        &self,
        payload: &CreateStockBufferPayload,
        actor: Uuid,
    ) -> Result<StockBuffer, AppError> {
        sqlx::query_as::<_, StockBuffer>(
            r#"
            INSERT INTO stock_buffers (
                product_id, warehouse_id, minimum_quantity, maximum_quantity,
                reorder_point, lead_time_days, safety_factor, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 1), COALESCE($7, 0.20), $8, $8)
            RETURNING *
            "#,
        )
        .bind(payload.product_id)
        .bind(payload.warehouse_id)
        .bind(payload.minimum_quantity)
        .bind(payload.maximum_quantity)
        .bind(payload.reorder_point)
        .bind(payload.lead_time_days)
        .bind(payload.safety_factor)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, "buffer para produto/armazém"))
    }

    pub async fn update_buffer(
        &self,
        id: Uuid,
        payload: &UpdateStockBufferPayload,
        actor: Uuid,
    ) -> Result<StockBuffer, AppError> {
        sqlx::query_as::<_, StockBuffer>(
            r#"
            UPDATE stock_buffers SET
                minimum_quantity = COALESCE($2, minimum_quantity),
                maximum_quantity = COALESCE($3, maximum_quantity),
                reorder_point = COALESCE($4, reorder_point),
                lead_time_days = COALESCE($5, lead_time_days),
                safety_factor = COALESCE($6, safety_factor),
                updated_at = NOW(),
                updated_by = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.minimum_quantity)
        .bind(payload.maximum_quantity)
        .bind(payload.reorder_point)
        .bind(payload.lead_time_days)
        .bind(payload.safety_factor)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Buffer de estoque".into()))
    }

    pub async fn delete_buffer(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM stock_buffers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Buffer de estoque".into()));
        }
        Ok(())
    }

    // ---
    // Livro-razão
    // ---

    /// Grava uma movimentação junto com a mutação de saldo, na mesma transação.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        warehouse_id: Uuid,
        location_id: Uuid,
        movement_type: MovementType,
        quantity: i32,
        unit_cost: Option<Decimal>,
        reference_type: &str,
        reference_id: Uuid,
        performed_by: Uuid,
        notes: Option<&str>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (
                product_id, warehouse_id, location_id, movement_type, quantity,
                unit_cost, reference_type, reference_id, performed_by, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .bind(location_id)
        .bind(movement_type)
        .bind(quantity)
        .bind(unit_cost)
        .bind(reference_type)
        .bind(reference_id)
        .bind(performed_by)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Agregar por produto/armazém mascara posições esgotadas; o predicado
    // tem que olhar cada saldo.
    #[test]
    fn low_stock_evaluates_each_balance_row() {
        for sql in [LOW_STOCK_ROWS, LOW_STOCK_REPORT] {
            assert!(!sql.contains("SUM("));
            assert!(!sql.contains("GROUP BY"));
            assert!(sql.contains("s.quantity_available <= p.reorder_point"));
            assert!(sql.contains("s.quantity_available <= b.minimum_quantity"));
        }
    }

    // Saldo exatamente no limiar conta como baixo (comparação inclusiva);
    // o relatório sai da menor falta para a maior.
    #[test]
    fn low_stock_threshold_is_inclusive_and_report_ascends() {
        assert!(LOW_STOCK_REPORT.contains("<= p.reorder_point"));
        assert!(!LOW_STOCK_REPORT.contains("< p.reorder_point\n"));
        assert!(LOW_STOCK_REPORT.contains("ORDER BY shortage ASC"));
        assert!(LOW_STOCK_REPORT.contains("GREATEST(0, p.reorder_point - s.quantity_available)"));
    }
}
