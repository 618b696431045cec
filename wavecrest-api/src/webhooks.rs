use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payments", post(handle_payment_webhook))
}

#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    #[serde(rename = "type")]
    pub type_: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: CheckoutSessionObject,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub metadata: Option<Value>,
}

/// POST /v1/webhooks/payments
/// Reconcile checkout-session events from the payment provider into ledger
/// status transitions.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhook>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    tracing::info!(
        "Received webhook: {} for session {}",
        payload.type_,
        payload.data.object.id
    );

    let ids = reservation_ids(payload.data.object.metadata.as_ref());

    match payload.type_.as_str() {
        "checkout.session.completed" => {
            state.booking.on_payment_confirmed(&ids).await?;
        }
        "checkout.session.expired" => {
            state.booking.on_payment_expired(&ids).await?;
        }
        _ => {}
    }

    Ok((StatusCode::OK, Json(json!({ "received": true }))))
}

/// The session metadata carries every reservation id in the group as a
/// comma-separated list, with the primary id as a fallback for sessions
/// created before grouping existed.
fn reservation_ids(metadata: Option<&Value>) -> Vec<String> {
    let Some(metadata) = metadata else {
        return Vec::new();
    };

    if let Some(joined) = metadata.get("reservation_ids").and_then(Value::as_str) {
        return joined
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    metadata
        .get("reservation_id")
        .and_then(Value::as_str)
        .map(|id| vec![id.to_string()])
        .unwrap_or_default()
}
