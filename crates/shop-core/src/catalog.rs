//! # Catalog Types
//!
//! Products, departments, categories and shipping reference data. All of it
//! is read-only from the storefront's perspective; a development catalog can
//! be loaded from `config/catalog.toml`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub product_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    /// Per-unit amount subtracted from the order total
    #[serde(default)]
    pub discounted_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Display flag (0 hidden, 1 on catalog, 2 on department, 3 on both)
    #[serde(default)]
    pub display: i16,
}

impl Product {
    pub fn new(product_id: i32, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            product_id,
            name: name.into(),
            description: String::new(),
            price,
            discounted_price: Decimal::ZERO,
            image: None,
            thumbnail: None,
            display: 0,
        }
    }

    /// Builder: set the per-unit discount
    pub fn with_discount(mut self, discounted_price: Decimal) -> Self {
        self.discounted_price = discounted_price;
        self
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Case-insensitive match against name and description
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Department {
    pub department_id: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Category {
    pub category_id: i32,
    pub department_id: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct ShippingRegion {
    pub shipping_region_id: i32,
    pub shipping_region: String,
}

/// A shipping option with a fixed cost, scoped to a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct ShippingType {
    pub shipping_id: i32,
    pub shipping_type: String,
    pub shipping_cost: Decimal,
    pub shipping_region_id: i32,
}

/// Product-to-category membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub product_id: i32,
    pub category_id: i32,
}

/// Catalog snapshot used to seed a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub product_categories: Vec<ProductCategory>,
    #[serde(default)]
    pub shipping_regions: Vec<ShippingRegion>,
    #[serde(default)]
    pub shipping_types: Vec<ShippingType>,
}

impl CatalogSeed {
    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_builder() {
        let product = Product::new(7, "Chartres Cathedral", dec!(16.95))
            .with_discount(dec!(15.95))
            .with_description("The Fur Merchants");

        assert_eq!(product.product_id, 7);
        assert_eq!(product.discounted_price, dec!(15.95));
        assert!(product.matches("fur"));
        assert!(product.matches("CHARTRES"));
        assert!(!product.matches("arc"));
    }

    #[test]
    fn test_seed_from_toml() {
        let seed = CatalogSeed::from_toml(
            r#"
            [[departments]]
            department_id = 1
            name = "Regional"

            [[products]]
            product_id = 1
            name = "Arc d'Triomphe"
            price = "14.99"
            discounted_price = "0.00"

            [[shipping_types]]
            shipping_id = 1
            shipping_type = "Next Day Delivery"
            shipping_cost = "20.00"
            shipping_region_id = 2
            "#,
        )
        .unwrap();

        assert_eq!(seed.departments.len(), 1);
        assert_eq!(seed.products[0].price, dec!(14.99));
        assert_eq!(seed.shipping_types[0].shipping_cost, dec!(20.00));
        assert!(seed.categories.is_empty());
    }
}
