// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// --- Papéis e situação da conta ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    WarehouseManager,
    Operator,
    Viewer,
    Accountant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub employee_id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: UserRole,
    pub assigned_warehouse_id: Option<Uuid>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_manager(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::WarehouseManager)
    }

    /// Escopo de visibilidade do usuário sobre listagens (documentos e estoque).
    /// Admin/gerente enxergam tudo; os demais, só o que criaram ou o que
    /// pertence ao armazém atribuído.
    pub fn access_scope(&self) -> AccessScope {
        if self.is_manager() {
            AccessScope::Unrestricted
        } else {
            AccessScope::Restricted {
                user_id: self.id,
                warehouse_id: self.assigned_warehouse_id,
            }
        }
    }
}

// Filtro de linha aplicado na camada de acesso a dados, não espalhado
// pelos endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    Unrestricted,
    Restricted {
        user_id: Uuid,
        warehouse_id: Option<Uuid>,
    },
}

// --- JWT ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // Subject (ID do usuário)
    pub exp: usize,      // Expiration time
    pub iat: usize,      // Issued At
    pub kind: TokenKind, // access ou refresh
}

// --- Payloads e respostas ---

#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshPayload {
    #[validate(length(min = 1, message = "O refresh token é obrigatório."))]
    pub refresh: String,
}

// Par de tokens devolvido pelo login (POST /api/auth/token)
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user(role: UserRole, warehouse: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            employee_id: None,
            full_name: "Fulano de Tal".into(),
            email: "fulano@example.com".into(),
            phone: None,
            password_hash: "x".into(),
            role,
            assigned_warehouse_id: warehouse,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn managers_are_unrestricted() {
        assert_eq!(
            sample_user(UserRole::Admin, None).access_scope(),
            AccessScope::Unrestricted
        );
        assert_eq!(
            sample_user(UserRole::WarehouseManager, Some(Uuid::new_v4())).access_scope(),
            AccessScope::Unrestricted
        );
    }

    #[test]
    fn operators_are_scoped_to_own_rows_and_warehouse() {
        let wh = Uuid::new_v4();
        let user = sample_user(UserRole::Operator, Some(wh));
        match user.access_scope() {
            AccessScope::Restricted {
                user_id,
                warehouse_id,
            } => {
                assert_eq!(user_id, user.id);
                assert_eq!(warehouse_id, Some(wh));
            }
            _ => panic!("operador deveria ter escopo restrito"),
        }
    }
}
