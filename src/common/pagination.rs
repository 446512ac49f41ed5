use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

// Paginação padrão via query string (?limit=&offset=), usada em todas as listagens.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_absent() {
        let p = Pagination::default();
        assert_eq!(p.limit(), 50);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn clamps_limit_and_offset() {
        let p = Pagination {
            limit: Some(9999),
            offset: Some(-3),
        };
        assert_eq!(p.limit(), 200);
        assert_eq!(p.offset(), 0);

        let p = Pagination {
            limit: Some(0),
            offset: Some(10),
        };
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 10);
    }
}
