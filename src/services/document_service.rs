// src/services/document_service.rs

use chrono::{Datelike, Utc};
use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, db::sequence_repo::SequenceRepository};

/// Tipos de documento numerados, cada um com seu prefixo de série.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Adjustment,
    Transfer,
    Receiving,
    Shipment,
    Return,
    Order,
}

impl DocumentKind {
    pub fn prefix(self) -> &'static str {
        match self {
            DocumentKind::Adjustment => "ADJ",
            DocumentKind::Transfer => "TRF",
            DocumentKind::Receiving => "RCV",
            DocumentKind::Shipment => "SHP",
            DocumentKind::Return => "RTN",
            DocumentKind::Order => "ORD",
        }
    }
}

#[derive(Clone)]
pub struct DocumentService {
    sequences: SequenceRepository,
}

impl DocumentService {
    pub fn new(sequences: SequenceRepository) -> Self {
        Self { sequences }
    }

    /// Próximo número da série do tipo, no formato PREFIXO-ANO-NNN.
    /// Roda dentro da transação que insere o documento; a numeração é
    /// consumida exatamente uma vez, na criação.
    pub async fn next_number<'e, E>(
        &self,
        executor: E,
        kind: DocumentKind,
    ) -> Result<String, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let year = Utc::now().year();
        let seq = self
            .sequences
            .next_number(executor, kind.prefix(), year)
            .await?;
        Ok(Self::format_number(kind, year, seq))
    }

    pub fn format_number(kind: DocumentKind, year: i32, seq: i32) -> String {
        format!("{}-{}-{:03}", kind.prefix(), year, seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_is_zero_padded() {
        assert_eq!(
            DocumentService::format_number(DocumentKind::Adjustment, 2025, 1),
            "ADJ-2025-001"
        );
        assert_eq!(
            DocumentService::format_number(DocumentKind::Transfer, 2025, 42),
            "TRF-2025-042"
        );
    }

    #[test]
    fn number_widens_past_999() {
        assert_eq!(
            DocumentService::format_number(DocumentKind::Order, 2025, 1000),
            "ORD-2025-1000"
        );
    }

    #[test]
    fn each_kind_has_its_prefix() {
        let kinds = [
            (DocumentKind::Adjustment, "ADJ"),
            (DocumentKind::Transfer, "TRF"),
            (DocumentKind::Receiving, "RCV"),
            (DocumentKind::Shipment, "SHP"),
            (DocumentKind::Return, "RTN"),
            (DocumentKind::Order, "ORD"),
        ];
        for (kind, prefix) in kinds {
            assert_eq!(kind.prefix(), prefix);
            let number = DocumentService::format_number(kind, 2025, 7);
            assert_eq!(number, format!("{}-2025-007", prefix));
        }
    }
}
