use async_trait::async_trait;
use shop_core::{
    AddressUpdate, Customer, CustomerStore, NewCustomer, ProfileUpdate, ShopError, ShopResult,
};

use crate::{store_err, PgStore};

const CUSTOMER_COLUMNS: &str = "customer_id, name, email, password_hash, credit_card, \
     address_1, address_2, city, region, postal_code, country, shipping_region_id, \
     day_phone, eve_phone, mob_phone";

#[async_trait]
impl CustomerStore for PgStore {
    async fn create_customer(&self, customer: &NewCustomer) -> ShopResult<Customer> {
        sqlx::query_as(&format!(
            "INSERT INTO customer (name, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return ShopError::Conflict("User with this email already exists".to_string());
                }
            }
            store_err(e)
        })
    }

    async fn find_by_email(&self, email: &str) -> ShopResult<Option<Customer>> {
        sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn find_by_id(&self, customer_id: i32) -> ShopResult<Option<Customer>> {
        sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE customer_id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn update_profile(
        &self,
        customer_id: i32,
        update: &ProfileUpdate,
    ) -> ShopResult<Option<Customer>> {
        sqlx::query_as(&format!(
            "UPDATE customer SET name = $2, day_phone = $3, eve_phone = $4, mob_phone = $5 \
             WHERE customer_id = $1 RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(customer_id)
        .bind(&update.name)
        .bind(&update.day_phone)
        .bind(&update.eve_phone)
        .bind(&update.mob_phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn update_address(
        &self,
        customer_id: i32,
        update: &AddressUpdate,
    ) -> ShopResult<Option<Customer>> {
        sqlx::query_as(&format!(
            "UPDATE customer SET address_1 = $2, address_2 = $3, city = $4, region = $5, \
                 postal_code = $6, country = $7, shipping_region_id = $8 \
             WHERE customer_id = $1 RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(customer_id)
        .bind(&update.address_1)
        .bind(&update.address_2)
        .bind(&update.city)
        .bind(&update.region)
        .bind(&update.postal_code)
        .bind(&update.country)
        .bind(update.shipping_region_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn update_credit_card(
        &self,
        customer_id: i32,
        masked_card: &str,
    ) -> ShopResult<Option<Customer>> {
        sqlx::query_as(&format!(
            "UPDATE customer SET credit_card = $2 WHERE customer_id = $1 \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(customer_id)
        .bind(masked_card)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn update_password(
        &self,
        customer_id: i32,
        password_hash: &str,
    ) -> ShopResult<Option<Customer>> {
        sqlx::query_as(&format!(
            "UPDATE customer SET password_hash = $2 WHERE customer_id = $1 \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(customer_id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)
    }
}
