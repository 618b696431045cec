use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use wavecrest_booking::BookingError;
use wavecrest_core::BoxError;

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    Internal(String),
}

impl AppError {
    pub fn store(err: BoxError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Booking(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Booking(err) => {
                let status = match err {
                    BookingError::Validation(_) => StatusCode::BAD_REQUEST,
                    BookingError::SlotUnavailable => StatusCode::CONFLICT,
                    BookingError::NotFound(_) => StatusCode::NOT_FOUND,
                    BookingError::SessionCreationFailed(_) => StatusCode::BAD_GATEWAY,
                    BookingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Internal Server Error: {}", err);
                    (status, "Internal Server Error".to_string())
                } else {
                    (status, err.to_string())
                }
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
