use async_trait::async_trait;
use chrono::NaiveDate;
use wavecrest_core::BoxError;

use crate::models::{Reservation, ReservationStatus};

/// Write/read contract for the reservation ledger.
///
/// `create` is a pure write: availability is the booking orchestrator's
/// concern and has already been checked by the time a record reaches the
/// ledger.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn create(&self, reservation: Reservation) -> Result<(), BoxError>;

    /// Update status in place. Returns the updated record, or `None` when the
    /// id is unknown so the caller can surface a not-found outcome.
    async fn set_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> Result<Option<Reservation>, BoxError>;

    /// Stamp the external checkout-session reference on a reservation.
    async fn set_checkout_session(&self, id: &str, session_id: &str) -> Result<(), BoxError>;

    /// Remove records by id; used to roll back provisional holds when
    /// external payment-session creation fails.
    async fn delete_many(&self, ids: &[String]) -> Result<(), BoxError>;

    /// All reservations, newest first.
    async fn list_all(&self) -> Result<Vec<Reservation>, BoxError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, BoxError>;

    /// Non-cancelled reservations for one unit on one date; the availability
    /// engine's overlap scan reads exactly this set.
    async fn list_active_for_unit_date(
        &self,
        unit_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, BoxError>;
}
