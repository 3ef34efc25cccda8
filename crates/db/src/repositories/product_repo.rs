//! Repository for the `products` table.

use netcrm_core::pagination::PageRequest;
use netcrm_core::search::search_pattern;
use netcrm_core::status::{BillingCycle, ProductType};
use netcrm_core::types::DbId;
use sqlx::PgPool;

use crate::models::non_blank;
use crate::models::product::{
    CreateProduct, Product, ProductChoices, ProductFilter, ProductOption, UpdateProduct,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, type, price, billing_cycle, speed_mbps, \
                       is_active, created_at, updated_at";

const FILTER: &str = "WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR description ILIKE $1)
                       AND ($2::TEXT IS NULL OR type = $2)
                       AND ($3::TEXT IS NULL OR billing_cycle = $3)
                       AND ($4::BOOL IS NULL OR is_active = $4)";

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProduct,
        product_type: ProductType,
        billing_cycle: BillingCycle,
    ) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (name, description, type, price, billing_cycle, speed_mbps, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(product_type.as_str())
            .bind(input.price.unwrap_or_default())
            .bind(billing_cycle.as_str())
            .bind(input.speed_mbps)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a product by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of products matching `filter`, newest first, with the total count.
    pub async fn list(
        pool: &PgPool,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), sqlx::Error> {
        let search = search_pattern(filter.search.as_deref());
        let product_type = non_blank(filter.product_type.as_deref());
        let billing_cycle = non_blank(filter.billing_cycle.as_deref());

        let query = format!(
            "SELECT {COLUMNS} FROM products {FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, Product>(&query)
            .bind(&search)
            .bind(product_type)
            .bind(billing_cycle)
            .bind(filter.is_active)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM products {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&search)
            .bind(product_type)
            .bind(billing_cycle)
            .bind(filter.is_active)
            .fetch_one(pool)
            .await?;

        Ok((rows, total))
    }

    /// Active products for form selects.
    pub async fn active_options(pool: &PgPool) -> Result<Vec<ProductOption>, sqlx::Error> {
        sqlx::query_as::<_, ProductOption>(
            "SELECT id, name, price FROM products WHERE is_active = true ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a product. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
        choices: ProductChoices,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                type = COALESCE($4, type),
                price = COALESCE($5, price),
                billing_cycle = COALESCE($6, billing_cycle),
                speed_mbps = COALESCE($7, speed_mbps),
                is_active = COALESCE($8, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(choices.product_type.map(ProductType::as_str))
            .bind(input.price)
            .bind(choices.billing_cycle.map(BillingCycle::as_str))
            .bind(input.speed_mbps)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a product by ID. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign key violation while projects or services use it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
