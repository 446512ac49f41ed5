// src/config.rs

use std::time::Duration;

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::{
        analytics_repo::AnalyticsRepository, inventory_repo::InventoryRepository,
        master_repo::MasterRepository, operations_repo::OperationsRepository,
        sequence_repo::SequenceRepository, stock_repo::StockRepository,
        user_repo::UserRepository,
    },
    services::{
        analytics_service::AnalyticsService, auth_service::AuthService,
        document_service::DocumentService, inventory_service::InventoryService,
        master_service::MasterService, operations_service::OperationsService,
    },
};

// Estado compartilhado da aplicação: a pool e o grafo de serviços.
// Clonar é barato, tudo aqui dentro é Arc por baixo.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub master_service: MasterService,
    pub inventory_service: InventoryService,
    pub operations_service: OperationsService,
    pub analytics_service: AnalyticsService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .context("A variável de ambiente DATABASE_URL precisa estar definida")?;
        let jwt_secret = std::env::var("JWT_SECRET")
            .context("A variável de ambiente JWT_SECRET precisa estar definida")?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        Ok(Self::with_pool(pool, jwt_secret))
    }

    pub fn with_pool(pool: PgPool, jwt_secret: String) -> Self {
        let user_repo = UserRepository::new(pool.clone());
        let master_repo = MasterRepository::new(pool.clone());
        let stock_repo = StockRepository::new(pool.clone());
        let inventory_repo = InventoryRepository::new(pool.clone());
        let operations_repo = OperationsRepository::new(pool.clone());
        let analytics_repo = AnalyticsRepository::new(pool.clone());
        let documents = DocumentService::new(SequenceRepository::new());

        let auth_service = AuthService::new(user_repo, jwt_secret);
        let master_service = MasterService::new(master_repo);
        let inventory_service = InventoryService::new(
            pool.clone(),
            stock_repo.clone(),
            inventory_repo,
            documents.clone(),
        );
        let operations_service =
            OperationsService::new(pool.clone(), operations_repo.clone(), documents);
        let analytics_service =
            AnalyticsService::new(analytics_repo, stock_repo, operations_repo);

        Self {
            pool,
            auth_service,
            master_service,
            inventory_service,
            operations_service,
            analytics_service,
        }
    }
}
