use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, types::BigDecimal};
use time::OffsetDateTime;

use crate::{
    application::{
        pagination::PageWindow,
        repos::{ProductQueryFilter, ProductsRepo, ProductsWriteRepo, RepoError},
    },
    domain::{entities::ProductRecord, products::ProductDraft},
};

use super::{PostgresRepositories, map_sqlx_error, util::contains_pattern};

const PRODUCT_COLUMNS: &str =
    "p.id, p.name, p.description, p.price, p.category_id, p.created_at, p.updated_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: BigDecimal,
    category_id: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresRepositories {
    fn apply_product_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q ProductQueryFilter) {
        if let Some(category) = filter.category.as_ref() {
            qb.push(" AND c.name ILIKE ");
            qb.push_bind(contains_pattern(category));
        }

        if let Some(price_min) = filter.price_min.as_ref() {
            qb.push(" AND p.price >= ");
            qb.push_bind(price_min);
        }

        if let Some(price_max) = filter.price_max.as_ref() {
            qb.push(" AND p.price <= ");
            qb.push_bind(price_max);
        }
    }
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn count_products(&self, filter: &ProductQueryFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT COUNT(*) FROM products p \
             INNER JOIN categories c ON c.id = p.category_id \
             WHERE TRUE",
        );
        Self::apply_product_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Self::convert_count(count)
    }

    async fn list_products(
        &self,
        filter: &ProductQueryFilter,
        window: PageWindow,
    ) -> Result<Vec<ProductRecord>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(PRODUCT_COLUMNS);
        qb.push(
            " FROM products p \
             INNER JOIN categories c ON c.id = p.category_id \
             WHERE TRUE",
        );
        Self::apply_product_filter(&mut qb, filter);
        qb.push(" ORDER BY p.id LIMIT ");
        qb.push_bind(window.limit);
        qb.push(" OFFSET ");
        qb.push_bind(window.offset);

        let rows: Vec<ProductRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    async fn find_product(&self, id: i64) -> Result<Option<ProductRecord>, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(RepoError::from_persistence)?;

        Ok(row.map(ProductRecord::from))
    }
}

#[async_trait]
impl ProductsWriteRepo for PostgresRepositories {
    async fn create_product(&self, draft: ProductDraft) -> Result<ProductRecord, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (name, description, price, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price, category_id, created_at, updated_at
            "#,
        )
        .bind(draft.name)
        .bind(draft.description)
        .bind(draft.price)
        .bind(draft.category_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_product(
        &self,
        id: i64,
        draft: ProductDraft,
    ) -> Result<ProductRecord, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET name = $2,
                description = $3,
                price = $4,
                category_id = $5,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, price, category_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(draft.name)
        .bind(draft.description)
        .bind(draft.price)
        .bind(draft.category_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(ProductRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_product(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
