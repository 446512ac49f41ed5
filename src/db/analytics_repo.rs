// src/db/analytics_repo.rs

use sqlx::{PgPool, QueryBuilder};

use crate::{
    common::{error::AppError, pagination::Pagination},
    models::analytics::{MovementFilter, StockMovement},
};

#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_movements(
        &self,
        page: Pagination,
        filter: &MovementFilter,
    ) -> Result<Vec<StockMovement>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM stock_movements WHERE 1=1");
        if let Some(product) = filter.product_id {
            qb.push(" AND product_id = ");
            qb.push_bind(product);
        }
        if let Some(warehouse) = filter.warehouse_id {
            qb.push(" AND warehouse_id = ");
            qb.push_bind(warehouse);
        }
        if let Some(movement_type) = filter.movement_type {
            qb.push(" AND movement_type = ");
            qb.push_bind(movement_type);
        }
        if let Some(from) = filter.date_from {
            qb.push(" AND movement_date >= ");
            qb.push_bind(from);
        }
        if let Some(to) = filter.date_to {
            qb.push(" AND movement_date <= ");
            qb.push_bind(to);
        }
        qb.push(" ORDER BY movement_date DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb
            .build_query_as::<StockMovement>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn recent_movements(&self, limit: i64) -> Result<Vec<StockMovement>, AppError> {
        let rows = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM stock_movements ORDER BY movement_date DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Contagens de documentos em aberto exibidas no painel.
    pub async fn open_document_counts(&self) -> Result<(i64, i64, i64, i64), AppError> {
        let (transfers, adjustments, receivings, returns): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM transfers WHERE status = 'pending'),
                    (SELECT COUNT(*) FROM adjustments WHERE approved_by IS NULL),
                    (SELECT COUNT(*) FROM receivings
                        WHERE status NOT IN ('approved', 'rejected')),
                    (SELECT COUNT(*) FROM returns
                        WHERE status NOT IN ('rejected', 'processed'))
                "#,
            )
            .fetch_one(&self.pool)
            .await?;
        Ok((transfers, adjustments, receivings, returns))
    }
}
