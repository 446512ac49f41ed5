// src/services/auth_service.rs

use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    common::error::AppError,
    db::user_repo::UserRepository,
    models::auth::{Claims, TokenKind, TokenPair, User, UserRole, UserStatus},
};

const ACCESS_TTL: chrono::Duration = chrono::Duration::hours(1);
const REFRESH_TTL: chrono::Duration = chrono::Duration::days(7);

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self {
            user_repo,
            jwt_secret,
        }
    }

    /// Cria o administrador inicial se o e-mail ainda não existir. Chamado
    /// na subida do serviço quando ADMIN_EMAIL/ADMIN_PASSWORD estão definidos;
    /// sem isso um banco recém-migrado não teria como autenticar ninguém.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(());
        }

        let password_clone = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password_clone, DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hash de senha: {}", e))??;

        let admin = self
            .user_repo
            .create("Administrador", email, &password_hash, UserRole::Admin, None)
            .await?;
        tracing::info!(email = %admin.email, "administrador inicial criado");
        Ok(())
    }

    /// POST /api/auth/token: valida as credenciais e emite o par de tokens.
    /// Contas inativas ou suspensas falham como credencial inválida, sem
    /// revelar o motivo.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // bcrypt é caro; roda fora do executor assíncrono
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        if user.status != UserStatus::Active {
            return Err(AppError::InvalidCredentials);
        }

        Ok(TokenPair {
            access: self.create_token(&user, TokenKind::Access)?,
            refresh: self.create_token(&user, TokenKind::Refresh)?,
        })
    }

    /// POST /api/auth/token/refresh: troca um refresh válido por um access novo.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let claims = self.decode_claims(refresh_token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AppError::InvalidToken);
        }

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;
        if user.status != UserStatus::Active {
            return Err(AppError::InvalidToken);
        }

        self.create_token(&user, TokenKind::Access)
    }

    /// Valida o bearer token das rotas protegidas e carrega o usuário.
    pub async fn validate_access_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_claims(token)?;
        if claims.kind != TokenKind::Access {
            return Err(AppError::InvalidToken);
        }

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;
        if user.status != UserStatus::Active {
            return Err(AppError::InvalidToken);
        }
        Ok(user)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    fn create_token(&self, user: &User, kind: TokenKind) -> Result<String, AppError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => ACCESS_TTL,
            TokenKind::Refresh => REFRESH_TTL,
        };

        let claims = Claims {
            sub: user.id,
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
            kind,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
