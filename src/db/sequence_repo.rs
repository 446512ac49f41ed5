// src/db/sequence_repo.rs

use sqlx::{Executor, Postgres};

use crate::common::error::AppError;

// Sem estado próprio: o contador sempre roda dentro da transação do chamador.
#[derive(Clone)]
pub struct SequenceRepository;

impl SequenceRepository {
    pub fn new() -> Self {
        Self
    }

    /// Incrementa e devolve o próximo número da série (prefixo, ano).
    ///
    /// O UPSERT é atômico: duas criações concorrentes serializam no lock da
    /// linha do contador e nunca recebem o mesmo número. Deve rodar dentro
    /// da mesma transação que insere o documento, para que um rollback não
    /// deixe buraco visível.
    pub async fn next_number<'e, E>(
        &self,
        executor: E,
        prefix: &str,
        year: i32,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (last_number,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO document_sequences (prefix, year, last_number)
            VALUES ($1, $2, 1)
            ON CONFLICT (prefix, year)
            DO UPDATE SET last_number = document_sequences.last_number + 1
            RETURNING last_number
            "#,
        )
        .bind(prefix)
        .bind(year)
        .fetch_one(executor)
        .await?;

        Ok(last_number)
    }
}
