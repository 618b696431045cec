pub mod availability;
pub mod error;
pub mod orchestrator;

pub use availability::{AvailabilityEngine, SLOT_STEP_MINUTES};
pub use error::BookingError;
pub use orchestrator::{
    BookingReceipt, BookingRequest, BookingService, BookingTarget, CheckoutOutcome,
    DeferredBookingReceipt, MockCheckoutGateway, ALL_UNITS_TARGET,
};
