// src/main.rs

use axum::{Router, middleware as axum_middleware, routing::get};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Se a configuração falhar, a aplicação não deve subir.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("Migrações do banco de dados executadas com sucesso.");

    if let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        app_state
            .auth_service
            .ensure_admin(&email, &password)
            .await
            .expect("Falha ao criar o administrador inicial.");
    }

    // Rotas de autenticação: emissão de token é pública, /me é protegida.
    let auth_routes = handlers::auth::public_routes().merge(
        handlers::auth::protected_routes().layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        )),
    );

    let guarded = |routes: Router<AppState>| {
        routes.layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
    };

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/master", guarded(handlers::master::routes()))
        .nest("/api/inventory", guarded(handlers::inventory::routes()))
        .nest("/api/operations", guarded(handlers::operations::routes()))
        .nest("/api/analytics", guarded(handlers::analytics::routes()))
        .with_state(app_state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
