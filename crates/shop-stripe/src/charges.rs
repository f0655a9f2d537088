//! # Stripe Charges
//!
//! Direct charges against a card token: a Stripe customer is created from
//! the token, then charged the order total.

use crate::config::StripeConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shop_core::{Charge, ChargeRequest, PaymentProcessor, ShopError, ShopResult};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Charges card tokens through the Stripe REST API
pub struct StripeChargeProcessor {
    config: StripeConfig,
    client: Client,
}

impl StripeChargeProcessor {
    pub fn new(config: StripeConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ShopError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/v1/{endpoint}", self.config.api_base_url))
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
    }

    /// Send a request and decode the body, mapping Stripe errors
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ShopResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ShopError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!(%status, "Stripe API error: {body}");

            let message = match serde_json::from_str::<StripeErrorResponse>(&body) {
                Ok(parsed) => parsed.error.message,
                Err(_) => format!("HTTP {status}: {body}"),
            };
            return Err(ShopError::ProviderError {
                provider: PROVIDER.to_string(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse Stripe response: {e}"))
        })
    }
}

#[async_trait]
impl PaymentProcessor for StripeChargeProcessor {
    #[instrument(skip(self, email, payment_token))]
    async fn create_customer(&self, email: &str, payment_token: &str) -> ShopResult<String> {
        let params = [("email", email), ("source", payment_token)];
        let customer: StripeCustomer = self.send(self.post("customers").form(&params)).await?;

        debug!(customer = %customer.id, "Stripe customer created");
        Ok(customer.id)
    }

    #[instrument(skip(self, request), fields(amount = request.amount_minor, currency = request.currency.as_str()))]
    async fn charge(&self, request: &ChargeRequest) -> ShopResult<Charge> {
        if request.amount_minor <= 0 {
            return Err(ShopError::InvalidAmount {
                message: format!("cannot charge {} minor units", request.amount_minor),
            });
        }

        let params = [
            ("amount", request.amount_minor.to_string()),
            ("currency", request.currency.as_str().to_string()),
            ("customer", request.payor_id.clone()),
            ("description", request.description.clone()),
        ];

        let mut builder = self.post("charges").form(&params);
        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        let charge: StripeCharge = self.send(builder).await?;

        if !charge.paid {
            return Err(ShopError::ProviderError {
                provider: PROVIDER.to_string(),
                message: charge
                    .failure_message
                    .unwrap_or_else(|| format!("charge {} was not paid", charge.id)),
            });
        }

        info!(charge = %charge.id, "Stripe charge succeeded");

        Ok(Charge {
            charge_id: charge.id,
            provider: PROVIDER.to_string(),
            amount_minor: charge.amount,
            currency: request.currency,
            paid: charge.paid,
            receipt_url: charge.receipt_url,
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeCharge {
    id: String,
    amount: i64,
    #[serde(default)]
    paid: bool,
    #[serde(default)]
    receipt_url: Option<String>,
    #[serde(default)]
    failure_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shop_core::Currency;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn processor(server: &MockServer) -> StripeChargeProcessor {
        let config = StripeConfig::new("sk_test_abc123")
            .unwrap()
            .with_api_base_url(server.uri());
        StripeChargeProcessor::new(config).unwrap()
    }

    fn request(amount_minor: i64) -> ChargeRequest {
        ChargeRequest {
            payor_id: "cus_123".into(),
            amount_minor,
            currency: Currency::USD,
            description: "2 item(s) ordered by johndoe".into(),
            idempotency_key: Some("order-1-cus_123".into()),
        }
    }

    #[tokio::test]
    async fn test_create_customer_from_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/customers"))
            .and(header("Authorization", "Bearer sk_test_abc123"))
            .and(body_string_contains("source=tok_visa"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cus_123",
                "object": "customer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = processor(&server)
            .await
            .create_customer("jd@mail.com", "tok_visa")
            .await
            .unwrap();
        assert_eq!(id, "cus_123");
    }

    #[tokio::test]
    async fn test_charge_sends_minor_units_and_idempotency_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/charges"))
            .and(header("Idempotency-Key", "order-1-cus_123"))
            .and(body_string_contains("amount=4400"))
            .and(body_string_contains("customer=cus_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ch_1",
                "amount": 4400,
                "currency": "usd",
                "paid": true,
                "receipt_url": "https://pay.stripe.com/receipts/ch_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let charge = processor(&server).await.charge(&request(4400)).await.unwrap();
        assert_eq!(charge.charge_id, "ch_1");
        assert_eq!(charge.amount_minor, 4400);
        assert!(charge.paid);
        assert_eq!(charge.provider, "stripe");
    }

    #[tokio::test]
    async fn test_card_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/charges"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": {
                    "type": "card_error",
                    "code": "card_declined",
                    "message": "Your card was declined."
                }
            })))
            .mount(&server)
            .await;

        let err = processor(&server).await.charge(&request(4400)).await.unwrap_err();
        match err {
            ShopError::ProviderError { provider, message } => {
                assert_eq!(provider, "stripe");
                assert_eq!(message, "Your card was declined.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unpaid_charge_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/charges"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ch_2",
                "amount": 4400,
                "paid": false,
                "failure_message": "insufficient funds"
            })))
            .mount(&server)
            .await;

        let err = processor(&server).await.charge(&request(4400)).await.unwrap_err();
        assert!(matches!(err, ShopError::ProviderError { ref message, .. } if message == "insufficient funds"));
    }

    #[tokio::test]
    async fn test_zero_amount_never_hits_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = processor(&server).await.charge(&request(0)).await.unwrap_err();
        assert!(matches!(err, ShopError::InvalidAmount { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_network_error() {
        let config = StripeConfig::new("sk_test_abc123")
            .unwrap()
            .with_api_base_url("http://127.0.0.1:1");
        let processor = StripeChargeProcessor::new(config).unwrap();

        let err = processor.create_customer("jd@mail.com", "tok_visa").await.unwrap_err();
        assert!(matches!(err, ShopError::NetworkError(_)));
        assert!(err.is_retryable());
    }
}
