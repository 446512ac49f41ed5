// src/db/master_repo.rs

use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    models::master::{
        Category, CreateCategoryPayload, CreateLocationPayload, CreateProductPayload,
        CreateSupplierPayload, CreateWarehousePayload, Location, Product, Supplier,
        UpdateCategoryPayload, UpdateLocationPayload, UpdateProductPayload,
        UpdateSupplierPayload, UpdateWarehousePayload, Warehouse,
    },
};

// Converte violação de FK em erro de pré-condição legível (ex: apagar
// categoria que ainda tem produtos).
fn protect(err: sqlx::Error, msg: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return AppError::PreconditionFailed(msg.to_string());
        }
    }
    err.into()
}

#[derive(Clone)]
pub struct MasterRepository {
    pool: PgPool,
}

impl MasterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Categorias
    // ---

    pub async fn list_categories(
        &self,
        page: Pagination,
        search: Option<&str>,
    ) -> Result<Vec<Category>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM categories WHERE 1=1");
        if let Some(term) = search {
            qb.push(" AND name ILIKE ");
            qb.push_bind(format!("%{}%", term));
        }
        qb.push(" ORDER BY name ASC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb.build_query_as::<Category>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Categoria".into()))
    }

    pub async fn create_category(
        &self,
        payload: &CreateCategoryPayload,
        actor: Uuid,
    ) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, parent_id, status, created_by, updated_by)
            VALUES ($1, $2, $3, COALESCE($4, 'active'), $5, $5)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.parent_id)
        .bind(payload.status)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, "nome de categoria"))
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        payload: &UpdateCategoryPayload,
        actor: Uuid,
    ) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                parent_id = COALESCE($4, parent_id),
                status = COALESCE($5, status),
                updated_at = NOW(),
                updated_by = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.parent_id)
        .bind(payload.status)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, "nome de categoria"))?
        .ok_or_else(|| AppError::NotFound("Categoria".into()))
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| protect(e, "Categoria possui produtos vinculados e não pode ser removida."))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Categoria".into()));
        }
        Ok(())
    }

    // ---
    // Fornecedores
    // ---

    pub async fn list_suppliers(
        &self,
        page: Pagination,
        search: Option<&str>,
    ) -> Result<Vec<Supplier>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM suppliers WHERE 1=1");
        if let Some(term) = search {
            qb.push(" AND (name ILIKE ");
            qb.push_bind(format!("%{}%", term));
            qb.push(" OR code ILIKE ");
            qb.push_bind(format!("%{}%", term));
            qb.push(")");
        }
        qb.push(" ORDER BY name ASC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb.build_query_as::<Supplier>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get_supplier(&self, id: Uuid) -> Result<Supplier, AppError> {
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Fornecedor".into()))
    }

    pub async fn create_supplier(
        &self,
        payload: &CreateSupplierPayload,
        actor: Uuid,
    ) -> Result<Supplier, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (
                code, name, contact_person, phone, email, address, city, country,
                tax_id, payment_terms, lead_time_days, minimum_order_value, rating,
                status, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    COALESCE($14, 'active'), $15, $15)
            RETURNING *
            "#,
        )
        .bind(&payload.code)
        .bind(&payload.name)
        .bind(&payload.contact_person)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.country)
        .bind(&payload.tax_id)
        .bind(&payload.payment_terms)
        .bind(payload.lead_time_days)
        .bind(payload.minimum_order_value)
        .bind(payload.rating)
        .bind(payload.status)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, "código de fornecedor"))
    }

    pub async fn update_supplier(
        &self,
        id: Uuid,
        payload: &UpdateSupplierPayload,
        actor: Uuid,
    ) -> Result<Supplier, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers SET
                name = COALESCE($2, name),
                contact_person = COALESCE($3, contact_person),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                address = COALESCE($6, address),
                city = COALESCE($7, city),
                country = COALESCE($8, country),
                tax_id = COALESCE($9, tax_id),
                payment_terms = COALESCE($10, payment_terms),
                lead_time_days = COALESCE($11, lead_time_days),
                minimum_order_value = COALESCE($12, minimum_order_value),
                rating = COALESCE($13, rating),
                status = COALESCE($14, status),
                updated_at = NOW(),
                updated_by = $15
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.contact_person)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.country)
        .bind(&payload.tax_id)
        .bind(&payload.payment_terms)
        .bind(payload.lead_time_days)
        .bind(payload.minimum_order_value)
        .bind(payload.rating)
        .bind(payload.status)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Fornecedor".into()))
    }

    pub async fn delete_supplier(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Fornecedor".into()));
        }
        Ok(())
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products(
        &self,
        page: Pagination,
        category_id: Option<Uuid>,
        search: Option<&str>,
    ) -> Result<Vec<Product>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM products WHERE 1=1");
        if let Some(cat) = category_id {
            qb.push(" AND category_id = ");
            qb.push_bind(cat);
        }
        if let Some(term) = search {
            qb.push(" AND (name ILIKE ");
            qb.push_bind(format!("%{}%", term));
            qb.push(" OR sku ILIKE ");
            qb.push_bind(format!("%{}%", term));
            qb.push(")");
        }
        qb.push(" ORDER BY name ASC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb.build_query_as::<Product>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Produto".into()))
    }

    pub async fn find_product_by_sku(&self, sku: &str) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE sku = $1")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Produto".into()))
    }

    pub async fn create_product(
        &self,
        payload: &CreateProductPayload,
        actor: Uuid,
    ) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                sku, barcode, name, description, category_id, brand, product_group,
                unit, cost_price, selling_price, minimum_stock, maximum_stock,
                reorder_point, primary_supplier_id, weight, dimensions, status,
                image_url, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'pcs'), $9, $10,
                    COALESCE($11, 0), $12, COALESCE($13, 0), $14, $15, $16,
                    COALESCE($17, 'active'), $18, $19, $19)
            RETURNING *
            "#,
        )
        .bind(&payload.sku)
        .bind(&payload.barcode)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.category_id)
        .bind(&payload.brand)
        .bind(&payload.product_group)
        .bind(&payload.unit)
        .bind(payload.cost_price)
        .bind(payload.selling_price)
        .bind(payload.minimum_stock)
        .bind(payload.maximum_stock)
        .bind(payload.reorder_point)
        .bind(payload.primary_supplier_id)
        .bind(payload.weight)
        .bind(&payload.dimensions)
        .bind(payload.status)
        .bind(&payload.image_url)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, "SKU"))
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        payload: &UpdateProductPayload,
        actor: Uuid,
    ) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                barcode = COALESCE($2, barcode),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                category_id = COALESCE($5, category_id),
                brand = COALESCE($6, brand),
                product_group = COALESCE($7, product_group),
                unit = COALESCE($8, unit),
                cost_price = COALESCE($9, cost_price),
                selling_price = COALESCE($10, selling_price),
                minimum_stock = COALESCE($11, minimum_stock),
                maximum_stock = COALESCE($12, maximum_stock),
                reorder_point = COALESCE($13, reorder_point),
                primary_supplier_id = COALESCE($14, primary_supplier_id),
                weight = COALESCE($15, weight),
                dimensions = COALESCE($16, dimensions),
                status = COALESCE($17, status),
                image_url = COALESCE($18, image_url),
                updated_at = NOW(),
                updated_by = $19
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.barcode)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.category_id)
        .bind(&payload.brand)
        .bind(&payload.product_group)
        .bind(&payload.unit)
        .bind(payload.cost_price)
        .bind(payload.selling_price)
        .bind(payload.minimum_stock)
        .bind(payload.maximum_stock)
        .bind(payload.reorder_point)
        .bind(payload.primary_supplier_id)
        .bind(payload.weight)
        .bind(&payload.dimensions)
        .bind(payload.status)
        .bind(&payload.image_url)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Produto".into()))
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Produto".into()));
        }
        Ok(())
    }

    // ---
    // Armazéns
    // ---

    pub async fn list_warehouses(&self, page: Pagination) -> Result<Vec<Warehouse>, AppError> {
        let rows = sqlx::query_as::<_, Warehouse>(
            "SELECT * FROM warehouses ORDER BY name ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_warehouse(&self, id: Uuid) -> Result<Warehouse, AppError> {
        sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Armazém".into()))
    }

    pub async fn create_warehouse(
        &self,
        payload: &CreateWarehousePayload,
        actor: Uuid,
    ) -> Result<Warehouse, AppError> {
        sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (
                code, name, warehouse_type, address, contact_person, phone, email,
                capacity, status, created_by, updated_by
            )
            VALUES ($1, $2, COALESCE($3, 'main'), $4, $5, $6, $7, $8,
                    COALESCE($9, 'active'), $10, $10)
            RETURNING *
            "#,
        )
        .bind(&payload.code)
        .bind(&payload.name)
        .bind(payload.warehouse_type)
        .bind(&payload.address)
        .bind(&payload.contact_person)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(payload.capacity)
        .bind(payload.status)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, "código de armazém"))
    }

    pub async fn update_warehouse(
        &self,
        id: Uuid,
        payload: &UpdateWarehousePayload,
        actor: Uuid,
    ) -> Result<Warehouse, AppError> {
        sqlx::query_as::<_, Warehouse>(
            r#"
            UPDATE warehouses SET
                name = COALESCE($2, name),
                warehouse_type = COALESCE($3, warehouse_type),
                address = COALESCE($4, address),
                contact_person = COALESCE($5, contact_person),
                phone = COALESCE($6, phone),
                email = COALESCE($7, email),
                capacity = COALESCE($8, capacity),
                status = COALESCE($9, status),
                updated_at = NOW(),
                updated_by = $10
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(payload.warehouse_type)
        .bind(&payload.address)
        .bind(&payload.contact_person)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(payload.capacity)
        .bind(payload.status)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Armazém".into()))
    }

    pub async fn delete_warehouse(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Armazém".into()));
        }
        Ok(())
    }

    // ---
    // Posições
    // ---

    pub async fn list_locations(
        &self,
        page: Pagination,
        warehouse_id: Option<Uuid>,
    ) -> Result<Vec<Location>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM locations WHERE 1=1");
        if let Some(wh) = warehouse_id {
            qb.push(" AND warehouse_id = ");
            qb.push_bind(wh);
        }
        qb.push(" ORDER BY code ASC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb.build_query_as::<Location>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get_location(&self, id: Uuid) -> Result<Location, AppError> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Posição".into()))
    }

    pub async fn create_location(
        &self,
        payload: &CreateLocationPayload,
        code: &str,
        actor: Uuid,
    ) -> Result<Location, AppError> {
        sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (
                warehouse_id, zone, aisle, rack, bin, level, code, barcode,
                capacity, description, status, created_by, updated_by
            )
            VALUES ($1, COALESCE($2, 'storage'), $3, $4, $5, $6, $7, $8, $9, $10,
                    COALESCE($11, 'active'), $12, $12)
            RETURNING *
            "#,
        )
        .bind(payload.warehouse_id)
        .bind(payload.zone)
        .bind(&payload.aisle)
        .bind(&payload.rack)
        .bind(&payload.bin)
        .bind(payload.level)
        .bind(code)
        .bind(&payload.barcode)
        .bind(payload.capacity)
        .bind(&payload.description)
        .bind(payload.status)
        .bind(actor)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique(e, "endereço de posição"))
    }

    pub async fn update_location(
        &self,
        id: Uuid,
        payload: &UpdateLocationPayload,
        actor: Uuid,
    ) -> Result<Location, AppError> {
        sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations SET
                zone = COALESCE($2, zone),
                barcode = COALESCE($3, barcode),
                capacity = COALESCE($4, capacity),
                current_utilization = COALESCE($5, current_utilization),
                description = COALESCE($6, description),
                status = COALESCE($7, status),
                updated_at = NOW(),
                updated_by = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.zone)
        .bind(&payload.barcode)
        .bind(payload.capacity)
        .bind(payload.current_utilization)
        .bind(&payload.description)
        .bind(payload.status)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Posição".into()))
    }

    pub async fn delete_location(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Posição".into()));
        }
        Ok(())
    }

    /// Posições de um armazém específico (GET /warehouses/{id}/locations).
    pub async fn locations_of_warehouse(
        &self,
        warehouse_id: Uuid,
    ) -> Result<Vec<Location>, AppError> {
        let rows = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations WHERE warehouse_id = $1 ORDER BY code ASC",
        )
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
