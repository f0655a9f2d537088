//! # Customer Types
//!
//! Customer accounts: identity, contact and billing details. The password
//! hash never leaves the store layer in a serialized response; handlers work
//! with [`CustomerProfile`].

use serde::{Deserialize, Serialize};

/// Customer row as stored
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Customer {
    pub customer_id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub credit_card: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub shipping_region_id: i32,
    pub day_phone: Option<String>,
    pub eve_phone: Option<String>,
    pub mob_phone: Option<String>,
}

impl Customer {
    pub fn profile(&self) -> CustomerProfile {
        CustomerProfile {
            customer_id: self.customer_id,
            name: self.name.clone(),
            email: self.email.clone(),
            credit_card: self.credit_card.clone(),
            address_1: self.address_1.clone(),
            address_2: self.address_2.clone(),
            city: self.city.clone(),
            region: self.region.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
            shipping_region_id: self.shipping_region_id,
            day_phone: self.day_phone.clone(),
            eve_phone: self.eve_phone.clone(),
            mob_phone: self.mob_phone.clone(),
        }
    }
}

/// Customer view without credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: i32,
    pub name: String,
    pub email: String,
    pub credit_card: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub shipping_region_id: i32,
    pub day_phone: Option<String>,
    pub eve_phone: Option<String>,
    pub mob_phone: Option<String>,
}

/// Signup payload after hashing
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(default)]
    pub day_phone: Option<String>,
    #[serde(default)]
    pub eve_phone: Option<String>,
    #[serde(default)]
    pub mob_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressUpdate {
    pub address_1: String,
    #[serde(default)]
    pub address_2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub shipping_region_id: i32,
}

/// Mask a card number down to its last four digits.
///
/// Only the masked form is ever persisted.
pub fn mask_card(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(|c| c.is_ascii_digit()).collect();
    let keep = digits.len().min(4);
    let (hidden, shown) = digits.split_at(digits.len() - keep);
    let mut masked = "X".repeat(hidden.len());
    masked.extend(shown);
    masked
}
