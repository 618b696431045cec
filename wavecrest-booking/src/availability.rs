use std::sync::Arc;

use chrono::NaiveDate;
use wavecrest_catalog::{CatalogRepository, UnitStatus};
use wavecrest_core::time::{minutes_to_time, time_to_minutes};
use wavecrest_ledger::ReservationRepository;

use crate::error::BookingError;

/// Candidate start times are offered on a fixed quarter-hour grid.
pub const SLOT_STEP_MINUTES: u32 = 15;

/// Determines single-slot availability and enumerates valid start times.
///
/// The engine owns no state: every answer is recomputed from the current
/// catalog and ledger snapshots, so results are identical regardless of which
/// store implementation backs the repositories.
#[derive(Clone)]
pub struct AvailabilityEngine {
    catalog: Arc<dyn CatalogRepository>,
    ledger: Arc<dyn ReservationRepository>,
}

impl AvailabilityEngine {
    pub fn new(catalog: Arc<dyn CatalogRepository>, ledger: Arc<dyn ReservationRepository>) -> Self {
        Self { catalog, ledger }
    }

    /// Whether one unit can be booked for `[start_time, start_time + duration)`
    /// on the given date.
    pub async fn is_available(
        &self,
        unit_id: &str,
        date: NaiveDate,
        start_time: &str,
        duration_minutes: u32,
    ) -> Result<bool, BookingError> {
        // 1. Unit must exist and be in service
        let units = self
            .catalog
            .list_units()
            .await
            .map_err(BookingError::store)?;
        let Some(unit) = units.iter().find(|u| u.id == unit_id) else {
            return Ok(false);
        };
        if unit.status == UnitStatus::Maintenance {
            return Ok(false);
        }

        // 2. A blackout date closes every unit regardless of bookings
        let blackouts = self
            .catalog
            .list_blackout_dates()
            .await
            .map_err(BookingError::store)?;
        if blackouts.iter().any(|b| b.date == date) {
            return Ok(false);
        }

        let requested_start = time_to_minutes(start_time)?;
        let requested_end = requested_start + duration_minutes;

        // 3. Half-open interval overlap scan against the unit's non-cancelled
        //    reservations; touching endpoints do not conflict
        let classes = self
            .catalog
            .list_duration_classes()
            .await
            .map_err(BookingError::store)?;
        let existing = self
            .ledger
            .list_active_for_unit_date(unit_id, date)
            .await
            .map_err(BookingError::store)?;

        for held in &existing {
            // A reservation whose duration class was dropped from the catalog
            // has no computable interval; it is skipped here.
            let Some(class) = classes.iter().find(|c| c.id == held.duration_class_id) else {
                continue;
            };
            let Ok(held_start) = time_to_minutes(&held.start_time) else {
                continue;
            };
            let held_end = held_start + class.duration_minutes;
            if requested_start < held_end && requested_end > held_start {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// All bookable start times for one unit on one date, ascending. A rental
    /// must fit entirely within operating hours; no start time is offered
    /// whose interval would run past closing.
    pub async fn available_start_times(
        &self,
        unit_id: &str,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> Result<Vec<String>, BookingError> {
        let settings = self
            .catalog
            .get_settings()
            .await
            .map_err(BookingError::store)?;
        let open = time_to_minutes(&settings.operating_hours_start)?;
        let close = time_to_minutes(&settings.operating_hours_end)?;

        let mut times = Vec::new();
        let mut candidate = open;
        while candidate + duration_minutes <= close {
            let clock = minutes_to_time(candidate);
            if self
                .is_available(unit_id, date, &clock, duration_minutes)
                .await?
            {
                times.push(clock);
            }
            candidate += SLOT_STEP_MINUTES;
        }
        Ok(times)
    }

    /// Start times at which every currently-available unit is free at once:
    /// the set intersection of the per-unit lists, not their union. Zero
    /// available units yields the empty list.
    pub async fn available_start_times_all(
        &self,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> Result<Vec<String>, BookingError> {
        let units = self
            .catalog
            .list_units()
            .await
            .map_err(BookingError::store)?;

        let mut combined: Option<Vec<String>> = None;
        for unit in units.iter().filter(|u| u.status == UnitStatus::Available) {
            let times = self
                .available_start_times(&unit.id, date, duration_minutes)
                .await?;
            combined = Some(match combined {
                None => times,
                Some(acc) => acc.into_iter().filter(|t| times.contains(t)).collect(),
            });
        }
        Ok(combined.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wavecrest_catalog::{BlackoutDate, Unit};
    use wavecrest_core::time::parse_date;
    use wavecrest_ledger::{Reservation, ReservationStatus};
    use wavecrest_store::MemoryStore;

    fn fixture() -> (Arc<MemoryStore>, AvailabilityEngine) {
        let store = Arc::new(MemoryStore::new());
        let engine = AvailabilityEngine::new(store.clone(), store.clone());
        (store, engine)
    }

    fn reservation(unit_id: &str, date: &str, start: &str, class: &str) -> Reservation {
        Reservation {
            id: Reservation::new_id(),
            unit_id: unit_id.to_string(),
            date: parse_date(date).unwrap(),
            duration_class_id: class.to_string(),
            start_time: start.to_string(),
            customer_name: "Mike T.".to_string(),
            customer_email: "mike@example.com".to_string(),
            customer_phone: String::new(),
            total_price_cents: 10000,
            status: ReservationStatus::Confirmed,
            created_at: Utc::now(),
            is_manual: false,
            checkout_session_id: None,
            waiver_reference: None,
        }
    }

    #[tokio::test]
    async fn test_open_day_enumerates_quarter_hour_grid() {
        let (_store, engine) = fixture();
        let date = parse_date("2026-03-04").unwrap();

        // 09:00-18:00 hours, 60-minute rental: 09:00 through 17:00
        let times = engine.available_start_times("js-1", date, 60).await.unwrap();
        assert_eq!(times.len(), 13);
        assert_eq!(times.first().unwrap(), "09:00");
        assert_eq!(times.last().unwrap(), "17:00");
        assert!(times.contains(&"09:15".to_string()));
    }

    #[tokio::test]
    async fn test_no_start_time_past_closing() {
        let (_store, engine) = fixture();
        let date = parse_date("2026-03-04").unwrap();

        let times = engine
            .available_start_times("js-1", date, 120)
            .await
            .unwrap();
        let close = time_to_minutes("18:00").unwrap();
        for t in &times {
            assert!(time_to_minutes(t).unwrap() + 120 <= close, "{} overruns", t);
        }
        assert_eq!(times.last().unwrap(), "16:00");
    }

    #[tokio::test]
    async fn test_overlap_blocks_and_touching_does_not() {
        let (store, engine) = fixture();
        let date = parse_date("2026-03-04").unwrap();
        store
            .create(reservation("js-1", "2026-03-04", "10:00", "ts-60"))
            .await
            .unwrap();

        // Overlapping requests fail
        assert!(!engine.is_available("js-1", date, "10:30", 60).await.unwrap());
        assert!(!engine.is_available("js-1", date, "09:30", 60).await.unwrap());
        assert!(!engine.is_available("js-1", date, "10:00", 15).await.unwrap());

        // Touching endpoints are fine on both sides
        assert!(engine.is_available("js-1", date, "11:00", 60).await.unwrap());
        assert!(engine.is_available("js-1", date, "09:00", 60).await.unwrap());

        // The other unit is unaffected
        assert!(engine.is_available("js-2", date, "10:00", 60).await.unwrap());
    }

    #[tokio::test]
    async fn test_cancelled_reservations_do_not_block() {
        let (store, engine) = fixture();
        let date = parse_date("2026-03-04").unwrap();
        let held = reservation("js-1", "2026-03-04", "10:00", "ts-60");
        let id = held.id.clone();
        store.create(held).await.unwrap();

        assert!(!engine.is_available("js-1", date, "10:00", 60).await.unwrap());
        store
            .set_status(&id, ReservationStatus::Cancelled)
            .await
            .unwrap();
        assert!(engine.is_available("js-1", date, "10:00", 60).await.unwrap());
    }

    #[tokio::test]
    async fn test_maintenance_unit_is_never_available() {
        let (store, engine) = fixture();
        let date = parse_date("2026-03-04").unwrap();
        let mut units = store.list_units().await.unwrap();
        units[0].status = UnitStatus::Maintenance;
        store.replace_units(units).await.unwrap();

        assert!(!engine.is_available("js-1", date, "10:00", 60).await.unwrap());
        let times = engine.available_start_times("js-1", date, 60).await.unwrap();
        assert!(times.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_unit_is_not_available() {
        let (_store, engine) = fixture();
        let date = parse_date("2026-03-04").unwrap();
        assert!(!engine.is_available("js-9", date, "10:00", 60).await.unwrap());
    }

    #[tokio::test]
    async fn test_blackout_closes_every_unit() {
        let (store, engine) = fixture();
        let date = parse_date("2026-07-04").unwrap();
        store
            .replace_blackout_dates(vec![BlackoutDate {
                id: "bd-1".to_string(),
                date,
                reason: "Regatta".to_string(),
            }])
            .await
            .unwrap();

        assert!(!engine.is_available("js-1", date, "10:00", 60).await.unwrap());
        assert!(!engine.is_available("js-2", date, "10:00", 60).await.unwrap());
        let other_day = parse_date("2026-07-05").unwrap();
        assert!(engine
            .is_available("js-1", other_day, "10:00", 60)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_combined_query_is_the_intersection() {
        let (store, engine) = fixture();
        let date = parse_date("2026-03-04").unwrap();

        // Shrink the window so each unit has exactly two candidate slots,
        // overlapping on 10:15 only.
        store
            .update_settings(wavecrest_catalog::SettingsPatch {
                operating_hours_start: Some("10:00".to_string()),
                operating_hours_end: Some("11:30".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        // js-1 free at 10:00 and 10:15; js-2 free at 10:15 and 10:30
        store
            .create(reservation("js-1", "2026-03-04", "10:30", "ts-60"))
            .await
            .unwrap();
        store
            .create(reservation("js-2", "2026-03-04", "10:00", "ts-15"))
            .await
            .unwrap();

        let a = engine.available_start_times("js-1", date, 15).await.unwrap();
        let b = engine.available_start_times("js-2", date, 15).await.unwrap();
        assert!(a.contains(&"10:00".to_string()) && a.contains(&"10:15".to_string()));
        assert!(b.contains(&"10:15".to_string()) && !b.contains(&"10:00".to_string()));

        let both = engine.available_start_times_all(date, 15).await.unwrap();
        assert_eq!(both, vec!["10:15".to_string()]);
    }

    #[tokio::test]
    async fn test_combined_query_with_no_available_units() {
        let (store, engine) = fixture();
        let date = parse_date("2026-03-04").unwrap();
        let units = store
            .list_units()
            .await
            .unwrap()
            .into_iter()
            .map(|mut u| {
                u.status = UnitStatus::Maintenance;
                u
            })
            .collect::<Vec<Unit>>();
        store.replace_units(units).await.unwrap();

        let both = engine.available_start_times_all(date, 60).await.unwrap();
        assert!(both.is_empty());
    }
}
