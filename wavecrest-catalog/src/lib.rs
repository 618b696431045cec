pub mod defaults;
pub mod models;
pub mod repository;

pub use models::{BlackoutDate, DurationClass, Settings, SettingsPatch, Unit, UnitStatus};
pub use repository::CatalogRepository;
