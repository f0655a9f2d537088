use async_trait::async_trait;
use shop_core::{
    CatalogStore, Category, Department, Page, Pagination, Product, ShippingRegion, ShippingType,
    ShopResult,
};

use crate::{store_err, PgStore};

const PRODUCT_COLUMNS: &str = "p.product_id, p.name, p.description, p.price, \
     p.discounted_price, p.image, p.thumbnail, p.display";

/// Escape LIKE wildcards and wrap for a contains match
fn contains_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Shared WHERE clause for product listings; unset filters match everything
const PRODUCT_FILTER: &str = "($1::text IS NULL OR p.name ILIKE $1 OR p.description ILIKE $1) \
     AND ($2::int IS NULL OR p.product_id IN \
         (SELECT pc.product_id FROM product_category pc WHERE pc.category_id = $2)) \
     AND ($3::int IS NULL OR p.product_id IN \
         (SELECT pc.product_id FROM product_category pc \
          JOIN category c ON c.category_id = pc.category_id \
          WHERE c.department_id = $3))";

#[derive(Debug, Default)]
struct ProductFilter {
    pattern: Option<String>,
    category_id: Option<i32>,
    department_id: Option<i32>,
}

impl PgStore {
    /// One page of filtered products plus the unpaged count
    async fn product_page(&self, filter: ProductFilter, page: Pagination) -> ShopResult<Page<Product>> {
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM product p WHERE {PRODUCT_FILTER}"))
                .bind(&filter.pattern)
                .bind(filter.category_id)
                .bind(filter.department_id)
                .fetch_one(&self.pool)
                .await
                .map_err(store_err)?;

        let rows: Vec<Product> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product p WHERE {PRODUCT_FILTER} \
             ORDER BY p.product_id LIMIT $4 OFFSET $5"
        ))
        .bind(&filter.pattern)
        .bind(filter.category_id)
        .bind(filter.department_id)
        .bind(i64::from(page.limit))
        .bind(i64::try_from(page.offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(Page {
            rows,
            total: u64::try_from(total).unwrap_or(0),
        })
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn get_product(&self, product_id: i32) -> ShopResult<Option<Product>> {
        sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product p WHERE p.product_id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn list_products(
        &self,
        search: Option<&str>,
        page: Pagination,
    ) -> ShopResult<Page<Product>> {
        let filter = ProductFilter {
            pattern: search.map(contains_pattern),
            ..Default::default()
        };
        self.product_page(filter, page).await
    }

    async fn list_products_in_category(
        &self,
        category_id: i32,
        page: Pagination,
    ) -> ShopResult<Page<Product>> {
        let filter = ProductFilter {
            category_id: Some(category_id),
            ..Default::default()
        };
        self.product_page(filter, page).await
    }

    async fn list_products_in_department(
        &self,
        department_id: i32,
        page: Pagination,
    ) -> ShopResult<Page<Product>> {
        let filter = ProductFilter {
            department_id: Some(department_id),
            ..Default::default()
        };
        self.product_page(filter, page).await
    }

    async fn list_departments(&self) -> ShopResult<Vec<Department>> {
        sqlx::query_as(
            "SELECT department_id, name, description FROM department ORDER BY department_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn get_department(&self, department_id: i32) -> ShopResult<Option<Department>> {
        sqlx::query_as(
            "SELECT department_id, name, description FROM department WHERE department_id = $1",
        )
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn list_categories(&self) -> ShopResult<Vec<Category>> {
        sqlx::query_as(
            "SELECT category_id, department_id, name, description FROM category \
             ORDER BY category_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn list_shipping_regions(&self) -> ShopResult<Vec<ShippingRegion>> {
        sqlx::query_as(
            "SELECT shipping_region_id, shipping_region FROM shipping_region \
             ORDER BY shipping_region_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn list_shipping_types(&self, shipping_region_id: i32) -> ShopResult<Vec<ShippingType>> {
        sqlx::query_as(
            "SELECT shipping_id, shipping_type, shipping_cost, shipping_region_id FROM shipping \
             WHERE shipping_region_id = $1 ORDER BY shipping_id",
        )
        .bind(shipping_region_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn get_shipping_type(&self, shipping_id: i32) -> ShopResult<Option<ShippingType>> {
        sqlx::query_as(
            "SELECT shipping_id, shipping_type, shipping_cost, shipping_region_id FROM shipping \
             WHERE shipping_id = $1",
        )
        .bind(shipping_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn get_shipping_region(
        &self,
        shipping_region_id: i32,
    ) -> ShopResult<Option<ShippingRegion>> {
        sqlx::query_as(
            "SELECT shipping_region_id, shipping_region FROM shipping_region \
             WHERE shipping_region_id = $1",
        )
        .bind(shipping_region_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("arc"), "%arc%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
