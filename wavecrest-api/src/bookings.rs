use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Timelike, Utc};
use serde::{Deserialize, Serialize};
use wavecrest_booking::{BookingError, BookingRequest, BookingTarget, ALL_UNITS_TARGET};
use wavecrest_core::time::{parse_date, time_to_minutes};
use wavecrest_ledger::{Reservation, ReservationStatus};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/availability", get(available_times))
        .route("/v1/bookings", get(list_bookings).post(create_booking))
        .route(
            "/v1/bookings/{id}",
            axum::routing::patch(update_booking_status),
        )
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    unit_id: String,
    date: String,
    duration_class_id: String,
    /// Client timezone offset in minutes; when the requested date is the
    /// client's today, already-elapsed times are filtered out. Presentation
    /// concern only, layered over the engine's raw output.
    tz_offset: Option<i64>,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    available_times: Vec<String>,
}

async fn available_times(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let date = parse_date(&query.date).map_err(BookingError::from)?;

    let classes = state
        .catalog
        .list_duration_classes()
        .await
        .map_err(AppError::store)?;
    let class = classes
        .iter()
        .find(|c| c.id == query.duration_class_id)
        .ok_or_else(|| {
            BookingError::Validation(format!("Unknown duration class: {}", query.duration_class_id))
        })?;

    let mut times = if query.unit_id == ALL_UNITS_TARGET {
        state
            .engine
            .available_start_times_all(date, class.duration_minutes)
            .await?
    } else {
        state
            .engine
            .available_start_times(&query.unit_id, date, class.duration_minutes)
            .await?
    };

    if let Some(offset) = query.tz_offset {
        let client_now = Utc::now() - chrono::Duration::minutes(offset);
        if client_now.date_naive() == date {
            let now_minutes = client_now.hour() * 60 + client_now.minute();
            times.retain(|t| {
                time_to_minutes(t)
                    .map(|m| m > now_minutes)
                    .unwrap_or(false)
            });
        }
    }

    Ok(Json(AvailabilityResponse {
        available_times: times,
    }))
}

#[derive(Debug, Serialize)]
struct BookingListResponse {
    bookings: Vec<Reservation>,
}

async fn list_bookings(
    State(state): State<AppState>,
) -> Result<Json<BookingListResponse>, AppError> {
    let bookings = state.ledger.list_all().await.map_err(AppError::store)?;
    Ok(Json(BookingListResponse { bookings }))
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingBody {
    pub unit_id: Option<String>,
    pub date: Option<String>,
    pub duration_class_id: Option<String>,
    pub start_time: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub is_manual: bool,
    pub waiver_reference: Option<String>,
}

impl CreateBookingBody {
    pub fn into_request(self) -> Result<BookingRequest, BookingError> {
        let unit_id = self.unit_id.unwrap_or_default();
        if unit_id.is_empty() {
            return Err(BookingError::Validation("Missing unit_id".to_string()));
        }
        let date = parse_date(self.date.as_deref().unwrap_or(""))?;

        Ok(BookingRequest {
            target: BookingTarget::parse(&unit_id),
            date,
            duration_class_id: self.duration_class_id.unwrap_or_default(),
            start_time: self.start_time.unwrap_or_default(),
            customer_name: self.customer_name.unwrap_or_default(),
            customer_email: self.customer_email.unwrap_or_default(),
            customer_phone: self.customer_phone.unwrap_or_default(),
            is_manual: self.is_manual,
            waiver_reference: self.waiver_reference,
        })
    }
}

#[derive(Debug, Serialize)]
struct BookingResponse {
    booking: Reservation,
    reservation_ids: Vec<String>,
    total_price_cents: i32,
}

async fn create_booking(
    State(state): State<AppState>,
    Json(body): Json<CreateBookingBody>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let receipt = state.booking.create_booking(body.into_request()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            booking: receipt.primary,
            reservation_ids: receipt.reservation_ids,
            total_price_cents: receipt.total_price_cents,
        }),
    ))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusBody {
    status: ReservationStatus,
}

#[derive(Debug, Serialize)]
struct UpdatedBookingResponse {
    booking: Reservation,
}

async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<UpdatedBookingResponse>, AppError> {
    let booking = state.booking.update_status(&id, body.status).await?;
    Ok(Json(UpdatedBookingResponse { booking }))
}
