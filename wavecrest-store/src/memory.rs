use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use wavecrest_catalog::defaults;
use wavecrest_catalog::{
    BlackoutDate, CatalogRepository, DurationClass, Settings, SettingsPatch, Unit,
};
use wavecrest_core::BoxError;
use wavecrest_ledger::{Reservation, ReservationRepository, ReservationStatus};

/// Process-local store used by tests, demos, and as the fallback when the
/// configured database is unreachable. Seeded with the default catalog.
pub struct MemoryStore {
    units: RwLock<Vec<Unit>>,
    duration_classes: RwLock<Vec<DurationClass>>,
    blackout_dates: RwLock<Vec<BlackoutDate>>,
    settings: RwLock<Settings>,
    reservations: RwLock<Vec<Reservation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            units: RwLock::new(defaults::default_units()),
            duration_classes: RwLock::new(defaults::default_duration_classes()),
            blackout_dates: RwLock::new(Vec::new()),
            settings: RwLock::new(defaults::default_settings()),
            reservations: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn list_units(&self) -> Result<Vec<Unit>, BoxError> {
        Ok(self.units.read().await.clone())
    }

    async fn replace_units(&self, units: Vec<Unit>) -> Result<(), BoxError> {
        *self.units.write().await = units;
        Ok(())
    }

    async fn list_duration_classes(&self) -> Result<Vec<DurationClass>, BoxError> {
        Ok(self.duration_classes.read().await.clone())
    }

    async fn replace_duration_classes(&self, classes: Vec<DurationClass>) -> Result<(), BoxError> {
        *self.duration_classes.write().await = classes;
        Ok(())
    }

    async fn list_blackout_dates(&self) -> Result<Vec<BlackoutDate>, BoxError> {
        Ok(self.blackout_dates.read().await.clone())
    }

    async fn replace_blackout_dates(&self, dates: Vec<BlackoutDate>) -> Result<(), BoxError> {
        *self.blackout_dates.write().await = dates;
        Ok(())
    }

    async fn get_settings(&self) -> Result<Settings, BoxError> {
        Ok(self.settings.read().await.clone())
    }

    async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, BoxError> {
        let mut settings = self.settings.write().await;
        settings.apply(patch);
        Ok(settings.clone())
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn create(&self, reservation: Reservation) -> Result<(), BoxError> {
        self.reservations.write().await.push(reservation);
        Ok(())
    }

    async fn set_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> Result<Option<Reservation>, BoxError> {
        let mut reservations = self.reservations.write().await;
        match reservations.iter_mut().find(|r| r.id == id) {
            Some(reservation) => {
                reservation.status = status;
                Ok(Some(reservation.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_checkout_session(&self, id: &str, session_id: &str) -> Result<(), BoxError> {
        let mut reservations = self.reservations.write().await;
        if let Some(reservation) = reservations.iter_mut().find(|r| r.id == id) {
            reservation.checkout_session_id = Some(session_id.to_string());
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<(), BoxError> {
        self.reservations
            .write()
            .await
            .retain(|r| !ids.contains(&r.id));
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Reservation>, BoxError> {
        let mut reservations = self.reservations.read().await.clone();
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reservations)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, BoxError> {
        Ok(self
            .reservations
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn list_active_for_unit_date(
        &self,
        unit_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, BoxError> {
        Ok(self
            .reservations
            .read()
            .await
            .iter()
            .filter(|r| {
                r.unit_id == unit_id && r.date == date && r.status != ReservationStatus::Cancelled
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wavecrest_core::time::parse_date;

    fn reservation(id: &str, unit_id: &str, status: ReservationStatus) -> Reservation {
        Reservation {
            id: id.to_string(),
            unit_id: unit_id.to_string(),
            date: parse_date("2026-03-04").unwrap(),
            duration_class_id: "ts-60".to_string(),
            start_time: "10:00".to_string(),
            customer_name: "Jason R.".to_string(),
            customer_email: "jason@example.com".to_string(),
            customer_phone: String::new(),
            total_price_cents: 10000,
            status,
            created_at: Utc::now(),
            is_manual: false,
            checkout_session_id: None,
            waiver_reference: None,
        }
    }

    #[tokio::test]
    async fn test_replace_is_a_whole_collection_overwrite() {
        let store = MemoryStore::new();
        assert_eq!(store.list_units().await.unwrap().len(), 2);

        let keep = vec![store.list_units().await.unwrap().remove(0)];
        store.replace_units(keep).await.unwrap();
        assert_eq!(store.list_units().await.unwrap().len(), 1);

        store.replace_duration_classes(Vec::new()).await.unwrap();
        assert!(store.list_duration_classes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_status_on_unknown_id_returns_none() {
        let store = MemoryStore::new();
        let updated = store
            .set_status("bk-missing", ReservationStatus::Cancelled)
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_active_listing_excludes_cancelled_and_other_units() {
        let store = MemoryStore::new();
        store
            .create(reservation("bk-1", "js-1", ReservationStatus::Confirmed))
            .await
            .unwrap();
        store
            .create(reservation("bk-2", "js-1", ReservationStatus::Pending))
            .await
            .unwrap();
        store
            .create(reservation("bk-3", "js-1", ReservationStatus::Cancelled))
            .await
            .unwrap();
        store
            .create(reservation("bk-4", "js-2", ReservationStatus::Confirmed))
            .await
            .unwrap();

        let date = parse_date("2026-03-04").unwrap();
        let active = store.list_active_for_unit_date("js-1", date).await.unwrap();
        let ids: Vec<&str> = active.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["bk-1", "bk-2"]);
    }

    #[tokio::test]
    async fn test_delete_many_removes_only_named_ids() {
        let store = MemoryStore::new();
        store
            .create(reservation("bk-1", "js-1", ReservationStatus::Pending))
            .await
            .unwrap();
        store
            .create(reservation("bk-2", "js-1", ReservationStatus::Pending))
            .await
            .unwrap();

        store
            .delete_many(&["bk-1".to_string(), "bk-9".to_string()])
            .await
            .unwrap();
        let remaining = store.list_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "bk-2");
    }

    #[tokio::test]
    async fn test_settings_patch_round_trip() {
        let store = MemoryStore::new();
        let updated = store
            .update_settings(SettingsPatch {
                operating_hours_start: Some("08:00".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.operating_hours_start, "08:00");
        assert_eq!(store.get_settings().await.unwrap().operating_hours_start, "08:00");
    }
}
