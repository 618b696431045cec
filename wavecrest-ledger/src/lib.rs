pub mod models;
pub mod repository;

pub use models::{Reservation, ReservationStatus};
pub use repository::ReservationRepository;
