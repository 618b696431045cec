use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wavecrest_core::time::is_weekend;

/// Operational status of a rentable unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Available,
    Maintenance,
}

impl UnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Available => "available",
            UnitStatus::Maintenance => "maintenance",
        }
    }
}

impl std::str::FromStr for UnitStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "available" => Ok(UnitStatus::Available),
            "maintenance" => Ok(UnitStatus::Maintenance),
            other => Err(format!("Unknown unit status: {}", other)),
        }
    }
}

/// A single rentable jet ski
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: UnitStatus,
}

/// A named rental length with its own weekday/weekend price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationClass {
    pub id: String,
    pub label: String,
    pub duration_minutes: u32,
    pub weekday_price_cents: i32,
    pub weekend_price_cents: i32,
}

impl DurationClass {
    /// Price for a rental starting on the given calendar date.
    pub fn price_for(&self, date: NaiveDate) -> i32 {
        if is_weekend(date) {
            self.weekend_price_cents
        } else {
            self.weekday_price_cents
        }
    }
}

/// A calendar day on which no unit may be booked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackoutDate {
    pub id: String,
    pub date: NaiveDate,
    pub reason: String,
}

/// Business settings; the operating-hours window bounds the start times the
/// availability engine may offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub business_name: String,
    pub business_phone: String,
    pub business_email: String,
    pub business_address: String,
    pub operating_hours_start: String,
    pub operating_hours_end: String,
}

impl Settings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.business_name {
            self.business_name = v;
        }
        if let Some(v) = patch.business_phone {
            self.business_phone = v;
        }
        if let Some(v) = patch.business_email {
            self.business_email = v;
        }
        if let Some(v) = patch.business_address {
            self.business_address = v;
        }
        if let Some(v) = patch.operating_hours_start {
            self.operating_hours_start = v;
        }
        if let Some(v) = patch.operating_hours_end {
            self.operating_hours_end = v;
        }
    }
}

/// Partial settings update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub business_name: Option<String>,
    pub business_phone: Option<String>,
    pub business_email: Option<String>,
    pub business_address: Option<String>,
    pub operating_hours_start: Option<String>,
    pub operating_hours_end: Option<String>,
}
