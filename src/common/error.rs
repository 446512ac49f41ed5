use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// A taxonomia cobre: validação (400), pré-condição de transição (400),
// recurso inexistente (404), autenticação (401/403), conflito (409) e 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Transição de documento fora do estado esperado. A mensagem já vem
    // pronta para o cliente (ex: "Transferência não está aprovada").
    #[error("{0}")]
    PreconditionFailed(String),

    #[error("{0} não encontrado(a)")]
    NotFound(String),

    #[error("Parâmetro obrigatório ausente: {0}")]
    MissingParameter(&'static str),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Registro duplicado: {0}")]
    UniqueViolation(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Converte violações de unicidade do Postgres em 409; o resto segue o fluxo normal.
    pub fn from_unique(err: sqlx::Error, what: &str) -> AppError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::UniqueViolation(what.to_string());
            }
        }
        err.into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::PreconditionFailed(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(what) => {
                let body = Json(json!({ "error": format!("{} não encontrado(a).", what) }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::MissingParameter(name) => {
                let body = Json(json!({ "error": format!("O parâmetro '{}' é obrigatório.", name) }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::UniqueViolation(what) => {
                let body = Json(json!({ "error": format!("Já existe um registro com este {}.", what) }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos."),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Acesso negado."),

            // RowNotFound vira 404 em vez de 500: é o caminho normal de um GET por id.
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, "Recurso não encontrado.")
            }

            // Todos os outros erros viram 500. O `tracing` loga a mensagem
            // detalhada; o cliente recebe só o genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
