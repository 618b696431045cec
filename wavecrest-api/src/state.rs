use std::sync::Arc;

use wavecrest_booking::{AvailabilityEngine, BookingService};
use wavecrest_catalog::CatalogRepository;
use wavecrest_ledger::ReservationRepository;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub ledger: Arc<dyn ReservationRepository>,
    pub engine: AvailabilityEngine,
    pub booking: Arc<BookingService>,
}
