//! Customer accounts: signup, login and profile maintenance.

use crate::customer::{mask_card, AddressUpdate, Customer, CustomerProfile, NewCustomer, ProfileUpdate};
use crate::error::{ShopError, ShopResult};
use crate::password::{hash_password, verify_password};
use crate::store::{CatalogStore, CustomerStore};
use crate::token::{Identity, TokenService};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

const INVALID_CREDENTIALS: &str = "Email or password is invalid";

/// Profile plus a fresh bearer token
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub customer: CustomerProfile,
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AccountService {
    customers: Arc<dyn CustomerStore>,
    catalog: Arc<dyn CatalogStore>,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        catalog: Arc<dyn CatalogStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            customers,
            catalog,
            tokens,
        }
    }

    fn session_for(&self, customer: &Customer) -> ShopResult<AuthSession> {
        let identity = Identity {
            customer_id: customer.customer_id,
            name: customer.name.clone(),
            email: customer.email.clone(),
        };
        let token = self
            .tokens
            .issue(&identity)
            .map_err(|e| ShopError::Internal(e.to_string()))?;

        Ok(AuthSession {
            customer: customer.profile(),
            access_token: format!("Bearer {token}"),
            expires_in: self.tokens.ttl().num_seconds(),
        })
    }

    /// Register a customer; the email must not be taken
    #[instrument(skip(self, password))]
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> ShopResult<AuthSession> {
        let customer = self
            .customers
            .create_customer(&NewCustomer {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password)?,
            })
            .await?;

        info!(customer_id = customer.customer_id, "customer registered");
        self.session_for(&customer)
    }

    /// Same error for an unknown email and a wrong password
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ShopResult<AuthSession> {
        let customer = self
            .customers
            .find_by_email(email)
            .await?
            .filter(|c| verify_password(password, &c.password_hash))
            .ok_or_else(|| ShopError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        self.session_for(&customer)
    }

    pub async fn profile(&self, customer_id: i32) -> ShopResult<CustomerProfile> {
        self.customers
            .find_by_id(customer_id)
            .await?
            .map(|c| c.profile())
            .ok_or(ShopError::CustomerNotFound)
    }

    pub async fn update_profile(
        &self,
        customer_id: i32,
        update: &ProfileUpdate,
    ) -> ShopResult<CustomerProfile> {
        self.customers
            .update_profile(customer_id, update)
            .await?
            .map(|c| c.profile())
            .ok_or(ShopError::CustomerNotFound)
    }

    pub async fn update_address(
        &self,
        customer_id: i32,
        update: &AddressUpdate,
    ) -> ShopResult<CustomerProfile> {
        let region = update.shipping_region_id;
        if self.catalog.get_shipping_region(region).await?.is_none() {
            return Err(ShopError::ValidationFailed(format!(
                "shipping region {region} does not exist"
            )));
        }

        self.customers
            .update_address(customer_id, update)
            .await?
            .map(|c| c.profile())
            .ok_or(ShopError::CustomerNotFound)
    }

    /// Stores only the masked card number
    pub async fn update_credit_card(
        &self,
        customer_id: i32,
        card_number: &str,
    ) -> ShopResult<CustomerProfile> {
        let masked = mask_card(card_number);
        if masked.len() < 12 {
            return Err(ShopError::ValidationFailed(
                "credit card number is too short".to_string(),
            ));
        }

        self.customers
            .update_credit_card(customer_id, &masked)
            .await?
            .map(|c| c.profile())
            .ok_or(ShopError::CustomerNotFound)
    }

    #[instrument(skip(self, current, new_password))]
    pub async fn change_password(
        &self,
        customer_id: i32,
        current: &str,
        new_password: &str,
    ) -> ShopResult<()> {
        let customer = self
            .customers
            .find_by_id(customer_id)
            .await?
            .ok_or(ShopError::CustomerNotFound)?;

        if !verify_password(current, &customer.password_hash) {
            return Err(ShopError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        self.customers
            .update_password(customer_id, &hash_password(new_password)?)
            .await?
            .ok_or(ShopError::CustomerNotFound)?;

        info!("password changed");
        Ok(())
    }
}
