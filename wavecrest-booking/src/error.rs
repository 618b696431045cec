use wavecrest_core::time::TimeError;
use wavecrest_core::BoxError;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Missing or malformed booking fields, rejected before any store access
    #[error("Invalid booking request: {0}")]
    Validation(String),

    /// Expected contention outcome; the caller re-queries availability and
    /// picks a different slot
    #[error("This slot is no longer available")]
    SlotUnavailable,

    #[error("Reservation not found: {0}")]
    NotFound(String),

    /// External payment integration failure; provisional holds have been
    /// rolled back
    #[error("Payment session creation failed: {0}")]
    SessionCreationFailed(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl BookingError {
    pub fn store(err: BoxError) -> Self {
        BookingError::Store(err.to_string())
    }
}

impl From<TimeError> for BookingError {
    fn from(err: TimeError) -> Self {
        BookingError::Validation(err.to_string())
    }
}
