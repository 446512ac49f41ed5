// src/db/scope.rs

use sqlx::{Postgres, QueryBuilder};

use crate::models::auth::AccessScope;

/// Injeta o filtro de visibilidade nas listagens. Admin e gerente não geram
/// predicado nenhum; os demais só enxergam linhas que criaram (coluna do
/// "dono" varia por documento) ou que pertencem ao armazém atribuído.
///
/// A query base precisa terminar em uma cláusula WHERE aberta (o chamador
/// usa `WHERE 1=1` e filtros encadeados com AND).
pub fn push_scope(
    qb: &mut QueryBuilder<'_, Postgres>,
    scope: AccessScope,
    owner_column: &str,
    warehouse_columns: &[&str],
) {
    let AccessScope::Restricted {
        user_id,
        warehouse_id,
    } = scope
    else {
        return;
    };

    qb.push(" AND (");
    qb.push(owner_column);
    qb.push(" = ");
    qb.push_bind(user_id);
    if let Some(wh) = warehouse_id {
        for column in warehouse_columns {
            qb.push(" OR ");
            qb.push(*column);
            qb.push(" = ");
            qb.push_bind(wh);
        }
    }
    qb.push(")");
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn unrestricted_scope_adds_nothing() {
        let mut qb = QueryBuilder::new("SELECT * FROM transfers WHERE 1=1");
        push_scope(
            &mut qb,
            AccessScope::Unrestricted,
            "requested_by",
            &["from_warehouse_id"],
        );
        assert_eq!(qb.sql(), "SELECT * FROM transfers WHERE 1=1");
    }

    #[test]
    fn restricted_scope_filters_owner_and_warehouses() {
        let mut qb = QueryBuilder::new("SELECT * FROM transfers WHERE 1=1");
        push_scope(
            &mut qb,
            AccessScope::Restricted {
                user_id: Uuid::new_v4(),
                warehouse_id: Some(Uuid::new_v4()),
            },
            "requested_by",
            &["from_warehouse_id", "to_warehouse_id"],
        );
        let sql = qb.sql();
        assert!(sql.contains("requested_by = $1"));
        assert!(sql.contains("from_warehouse_id = $2"));
        assert!(sql.contains("to_warehouse_id = $3"));
        assert!(sql.ends_with(")"));
    }

    #[test]
    fn restricted_without_warehouse_filters_owner_only() {
        let mut qb = QueryBuilder::new("SELECT * FROM adjustments WHERE 1=1");
        push_scope(
            &mut qb,
            AccessScope::Restricted {
                user_id: Uuid::new_v4(),
                warehouse_id: None,
            },
            "adjusted_by",
            &["warehouse_id"],
        );
        let sql = qb.sql();
        assert!(sql.contains("adjusted_by = $1"));
        assert!(!sql.contains("warehouse_id"));
    }
}
