use crate::models::{DurationClass, Settings, Unit, UnitStatus};

/// Seed fleet used by fresh stores until an operator replaces the inventory.
pub fn default_units() -> Vec<Unit> {
    vec![
        Unit {
            id: "js-1".to_string(),
            name: "Wave Runner 1".to_string(),
            description: "Yamaha EX Sport. Stable, easy to handle, great for beginners and families."
                .to_string(),
            status: UnitStatus::Available,
        },
        Unit {
            id: "js-2".to_string(),
            name: "Wave Runner 2".to_string(),
            description: "Sea-Doo Spark. Lightweight and agile, built for speed and tight turns."
                .to_string(),
            status: UnitStatus::Available,
        },
    ]
}

pub fn default_duration_classes() -> Vec<DurationClass> {
    vec![
        DurationClass {
            id: "ts-15".to_string(),
            label: "15 Minutes".to_string(),
            duration_minutes: 15,
            weekday_price_cents: 3500,
            weekend_price_cents: 4500,
        },
        DurationClass {
            id: "ts-30".to_string(),
            label: "30 Minutes".to_string(),
            duration_minutes: 30,
            weekday_price_cents: 6000,
            weekend_price_cents: 7500,
        },
        DurationClass {
            id: "ts-60".to_string(),
            label: "1 Hour".to_string(),
            duration_minutes: 60,
            weekday_price_cents: 10000,
            weekend_price_cents: 12500,
        },
        DurationClass {
            id: "ts-120".to_string(),
            label: "2 Hours".to_string(),
            duration_minutes: 120,
            weekday_price_cents: 17500,
            weekend_price_cents: 22000,
        },
    ]
}

pub fn default_settings() -> Settings {
    Settings {
        business_name: "Wavecrest Jet Ski Rentals".to_string(),
        business_phone: "(850) 555-0188".to_string(),
        business_email: "info@wavecrest.example".to_string(),
        business_address: "Coastal Florida".to_string(),
        operating_hours_start: "09:00".to_string(),
        operating_hours_end: "18:00".to_string(),
    }
}
