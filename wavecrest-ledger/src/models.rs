use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "completed" => Ok(ReservationStatus::Completed),
            other => Err(format!("Unknown reservation status: {}", other)),
        }
    }
}

/// One customer's claim on one unit for one interval on one day.
///
/// `total_price_cents` is computed once at creation from the duration class
/// in effect at that moment and is never recomputed, so later catalog price
/// edits do not retroactively reprice existing reservations. The occupied
/// interval is `[start_time, start_time + duration)` where the duration comes
/// from the reservation's own duration class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub unit_id: String,
    pub date: NaiveDate,
    pub duration_class_id: String,
    pub start_time: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub total_price_cents: i32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    /// Operator-entered walk-in vs. customer self-service
    pub is_manual: bool,
    /// Opaque reference to the external checkout session, if any
    pub checkout_session_id: Option<String>,
    /// Opaque link to signed waiver evidence; plays no part in scheduling
    pub waiver_reference: Option<String>,
}

impl Reservation {
    pub fn new_id() -> String {
        format!("bk-{}", Uuid::new_v4().simple())
    }
}
