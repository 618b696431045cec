use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::BoxError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentSessionStatus {
    Unpaid,
    Paid,
    Expired,
}

/// A hosted checkout session created with the external payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session id (e.g. cs_123)
    pub id: String,
    pub url: Option<String>,
    pub payment_status: PaymentSessionStatus,
}

/// Everything the provider needs to render a checkout page for one booking
/// request. The reservation ids ride along as opaque metadata and come back
/// on the provider's webhook events.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_email: String,
    pub product_label: String,
    pub product_description: String,
    pub unit_amount_cents: i32,
    pub quantity: u32,
    pub primary_reservation_id: String,
    pub reservation_ids: Vec<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session with the provider.
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, BoxError>;

    /// Retrieve the current state of a session.
    async fn get_session(&self, session_id: &str) -> Result<CheckoutSession, BoxError>;
}
