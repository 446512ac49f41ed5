// src/services/analytics_service.rs

use chrono::{Duration, Utc};

use crate::{
    common::{error::AppError, pagination::Pagination},
    db::{
        analytics_repo::AnalyticsRepository, operations_repo::OperationsRepository,
        stock_repo::StockRepository,
    },
    models::analytics::{
        DashboardSummary, InventorySummary, LowStockEntry, MovementFilter, StockMovement,
    },
};

const DASHBOARD_WINDOW_DAYS: i64 = 30;
const DASHBOARD_RECENT_MOVEMENTS: i64 = 10;

#[derive(Clone)]
pub struct AnalyticsService {
    analytics_repo: AnalyticsRepository,
    stock_repo: StockRepository,
    operations_repo: OperationsRepository,
}

impl AnalyticsService {
    pub fn new(
        analytics_repo: AnalyticsRepository,
        stock_repo: StockRepository,
        operations_repo: OperationsRepository,
    ) -> Self {
        Self {
            analytics_repo,
            stock_repo,
            operations_repo,
        }
    }

    pub async fn stock_movements(
        &self,
        page: Pagination,
        filter: MovementFilter,
    ) -> Result<Vec<StockMovement>, AppError> {
        self.analytics_repo.list_movements(page, &filter).await
    }

    pub async fn inventory_summary(&self) -> Result<InventorySummary, AppError> {
        self.stock_repo.inventory_summary().await
    }

    pub async fn low_stock_report(
        &self,
        page: Pagination,
    ) -> Result<Vec<LowStockEntry>, AppError> {
        self.stock_repo.low_stock(page).await
    }

    /// Painel consolidado: estoque, pedidos dos últimos 30 dias, documentos
    /// em aberto e as movimentações mais recentes.
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, AppError> {
        let since = Utc::now() - Duration::days(DASHBOARD_WINDOW_DAYS);

        let inventory = self.stock_repo.inventory_summary().await?;
        let orders = self.operations_repo.order_summary(Some(since)).await?;
        let (pending_transfers, pending_adjustments, open_receivings, open_returns) =
            self.analytics_repo.open_document_counts().await?;
        let recent_movements = self
            .analytics_repo
            .recent_movements(DASHBOARD_RECENT_MOVEMENTS)
            .await?;

        Ok(DashboardSummary {
            inventory,
            orders,
            pending_transfers,
            pending_adjustments,
            open_receivings,
            open_returns,
            recent_movements,
        })
    }
}
