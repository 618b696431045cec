use async_trait::async_trait;
use wavecrest_core::BoxError;

use crate::models::{BlackoutDate, DurationClass, Settings, SettingsPatch, Unit};

/// Read/write contract for the rentable-unit catalog, the duration/price
/// menu, blackout dates and operating-hours settings.
///
/// Replace operations are whole-collection overwrites, matching the
/// administrative bulk-edit workflow: a replace with a shorter list drops
/// the missing records. No business validation happens at this layer.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_units(&self) -> Result<Vec<Unit>, BoxError>;

    async fn replace_units(&self, units: Vec<Unit>) -> Result<(), BoxError>;

    async fn list_duration_classes(&self) -> Result<Vec<DurationClass>, BoxError>;

    async fn replace_duration_classes(&self, classes: Vec<DurationClass>) -> Result<(), BoxError>;

    async fn list_blackout_dates(&self) -> Result<Vec<BlackoutDate>, BoxError>;

    async fn replace_blackout_dates(&self, dates: Vec<BlackoutDate>) -> Result<(), BoxError>;

    async fn get_settings(&self) -> Result<Settings, BoxError>;

    /// Apply a partial update and return the resulting settings.
    async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, BoxError>;
}
