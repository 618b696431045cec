use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wavecrest_booking::CheckoutOutcome;

use crate::bookings::CreateBookingBody;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/checkout", post(create_checkout))
        .route("/v1/checkout/verify", get(verify_checkout))
}

async fn create_checkout(
    State(state): State<AppState>,
    Json(body): Json<CreateBookingBody>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let outcome = state.booking.create_checkout(body.into_request()?).await?;

    match outcome {
        CheckoutOutcome::Direct(receipt) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "mode": "no-payment",
                "booking": receipt.primary,
                "reservation_ids": receipt.reservation_ids,
                "total_price_cents": receipt.total_price_cents,
            })),
        )),
        CheckoutOutcome::Deferred(receipt) => Ok((
            StatusCode::OK,
            Json(json!({
                "reservation_ids": receipt.reservation_ids,
                "session_id": receipt.session_id,
                "checkout_url": receipt.checkout_url,
            })),
        )),
    }
}

#[derive(Debug, Deserialize)]
struct VerifyQuery {
    session_id: Option<String>,
    reservation_id: String,
}

#[derive(Debug, Serialize)]
struct VerifyResponse {
    booking: Value,
}

/// Post-checkout landing page fallback: confirm the reservation directly if
/// the provider already reports the session paid, without waiting for the
/// webhook.
async fn verify_checkout(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<VerifyResponse>, AppError> {
    let booking = state
        .booking
        .verify_checkout(
            query.session_id.as_deref().unwrap_or(""),
            &query.reservation_id,
        )
        .await?;

    Ok(Json(VerifyResponse {
        booking: json!({
            "id": booking.id,
            "date": booking.date,
            "start_time": booking.start_time,
            "total_price_cents": booking.total_price_cents,
            "status": booking.status,
            "customer_email": booking.customer_email,
        }),
    }))
}
