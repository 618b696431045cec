use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use wavecrest_catalog::defaults;
use wavecrest_catalog::{
    BlackoutDate, CatalogRepository, DurationClass, Settings, SettingsPatch, Unit, UnitStatus,
};
use wavecrest_core::BoxError;
use wavecrest_ledger::{Reservation, ReservationRepository, ReservationStatus};

/// Postgres-backed store.
///
/// The no-double-booking invariant is enforced by the orchestrator's
/// serialized write path, not by a table constraint, so a deployment running
/// several processes against one database needs an additional store-level
/// constraint before it is safe under concurrent writers.
pub struct PgStore {
    pool: PgPool,
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS units (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL DEFAULT 'available'
    )",
    "CREATE TABLE IF NOT EXISTS duration_classes (
        id TEXT PRIMARY KEY,
        label TEXT NOT NULL,
        duration_minutes INT NOT NULL,
        weekday_price_cents INT NOT NULL,
        weekend_price_cents INT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS blackout_dates (
        id TEXT PRIMARY KEY,
        date DATE NOT NULL,
        reason TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS settings (
        id INT PRIMARY KEY CHECK (id = 1),
        business_name TEXT NOT NULL,
        business_phone TEXT NOT NULL,
        business_email TEXT NOT NULL,
        business_address TEXT NOT NULL,
        operating_hours_start TEXT NOT NULL,
        operating_hours_end TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS reservations (
        id TEXT PRIMARY KEY,
        unit_id TEXT NOT NULL,
        date DATE NOT NULL,
        duration_class_id TEXT NOT NULL,
        start_time TEXT NOT NULL,
        customer_name TEXT NOT NULL,
        customer_email TEXT NOT NULL,
        customer_phone TEXT NOT NULL DEFAULT '',
        total_price_cents INT NOT NULL,
        status TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        is_manual BOOLEAN NOT NULL DEFAULT FALSE,
        checkout_session_id TEXT,
        waiver_reference TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_reservations_unit_date
        ON reservations (unit_id, date)",
];

impl PgStore {
    pub async fn connect(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        info!("Ensuring database schema...");
        for ddl in SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Seed the default catalog into an empty database, matching what a
    /// fresh in-memory store starts with.
    pub async fn seed_defaults(&self) -> Result<(), BoxError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM units")
            .fetch_one(&self.pool)
            .await?;
        if count == 0 {
            info!("Seeding default catalog");
            self.replace_units(defaults::default_units()).await?;
            self.replace_duration_classes(defaults::default_duration_classes())
                .await?;
        }

        let (settings_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM settings")
            .fetch_one(&self.pool)
            .await?;
        if settings_count == 0 {
            self.write_settings(&defaults::default_settings()).await?;
        }
        Ok(())
    }

    async fn write_settings(&self, settings: &Settings) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO settings (id, business_name, business_phone, business_email,
                                   business_address, operating_hours_start, operating_hours_end)
             VALUES (1, $1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                business_name = EXCLUDED.business_name,
                business_phone = EXCLUDED.business_phone,
                business_email = EXCLUDED.business_email,
                business_address = EXCLUDED.business_address,
                operating_hours_start = EXCLUDED.operating_hours_start,
                operating_hours_end = EXCLUDED.operating_hours_end",
        )
        .bind(&settings.business_name)
        .bind(&settings.business_phone)
        .bind(&settings.business_email)
        .bind(&settings.business_address)
        .bind(&settings.operating_hours_start)
        .bind(&settings.operating_hours_end)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// Internal structs for type-safe querying

#[derive(sqlx::FromRow)]
struct UnitRow {
    id: String,
    name: String,
    description: String,
    status: String,
}

impl UnitRow {
    fn into_unit(self) -> Result<Unit, BoxError> {
        Ok(Unit {
            id: self.id,
            name: self.name,
            description: self.description,
            status: UnitStatus::from_str(&self.status)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DurationClassRow {
    id: String,
    label: String,
    duration_minutes: i32,
    weekday_price_cents: i32,
    weekend_price_cents: i32,
}

impl DurationClassRow {
    fn into_class(self) -> DurationClass {
        DurationClass {
            id: self.id,
            label: self.label,
            duration_minutes: self.duration_minutes.max(0) as u32,
            weekday_price_cents: self.weekday_price_cents,
            weekend_price_cents: self.weekend_price_cents,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BlackoutDateRow {
    id: String,
    date: NaiveDate,
    reason: String,
}

#[derive(sqlx::FromRow)]
struct SettingsRow {
    business_name: String,
    business_phone: String,
    business_email: String,
    business_address: String,
    operating_hours_start: String,
    operating_hours_end: String,
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: String,
    unit_id: String,
    date: NaiveDate,
    duration_class_id: String,
    start_time: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    total_price_cents: i32,
    status: String,
    created_at: DateTime<Utc>,
    is_manual: bool,
    checkout_session_id: Option<String>,
    waiver_reference: Option<String>,
}

impl ReservationRow {
    fn into_reservation(self) -> Result<Reservation, BoxError> {
        Ok(Reservation {
            id: self.id,
            unit_id: self.unit_id,
            date: self.date,
            duration_class_id: self.duration_class_id,
            start_time: self.start_time,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            total_price_cents: self.total_price_cents,
            status: ReservationStatus::from_str(&self.status)?,
            created_at: self.created_at,
            is_manual: self.is_manual,
            checkout_session_id: self.checkout_session_id,
            waiver_reference: self.waiver_reference,
        })
    }
}

const RESERVATION_COLUMNS: &str = "id, unit_id, date, duration_class_id, start_time, \
     customer_name, customer_email, customer_phone, total_price_cents, status, \
     created_at, is_manual, checkout_session_id, waiver_reference";

async fn clear_table(tx: &mut Transaction<'_, Postgres>, table: &str) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("DELETE FROM {}", table))
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl CatalogRepository for PgStore {
    async fn list_units(&self) -> Result<Vec<Unit>, BoxError> {
        let rows: Vec<UnitRow> =
            sqlx::query_as("SELECT id, name, description, status FROM units ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(UnitRow::into_unit).collect()
    }

    async fn replace_units(&self, units: Vec<Unit>) -> Result<(), BoxError> {
        let mut tx = self.pool.begin().await?;
        clear_table(&mut tx, "units").await?;
        for unit in &units {
            sqlx::query("INSERT INTO units (id, name, description, status) VALUES ($1, $2, $3, $4)")
                .bind(&unit.id)
                .bind(&unit.name)
                .bind(&unit.description)
                .bind(unit.status.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_duration_classes(&self) -> Result<Vec<DurationClass>, BoxError> {
        let rows: Vec<DurationClassRow> = sqlx::query_as(
            "SELECT id, label, duration_minutes, weekday_price_cents, weekend_price_cents
             FROM duration_classes ORDER BY duration_minutes",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(DurationClassRow::into_class).collect())
    }

    async fn replace_duration_classes(&self, classes: Vec<DurationClass>) -> Result<(), BoxError> {
        let mut tx = self.pool.begin().await?;
        clear_table(&mut tx, "duration_classes").await?;
        for class in &classes {
            sqlx::query(
                "INSERT INTO duration_classes
                     (id, label, duration_minutes, weekday_price_cents, weekend_price_cents)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&class.id)
            .bind(&class.label)
            .bind(class.duration_minutes as i32)
            .bind(class.weekday_price_cents)
            .bind(class.weekend_price_cents)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_blackout_dates(&self) -> Result<Vec<BlackoutDate>, BoxError> {
        let rows: Vec<BlackoutDateRow> =
            sqlx::query_as("SELECT id, date, reason FROM blackout_dates ORDER BY date")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|r| BlackoutDate {
                id: r.id,
                date: r.date,
                reason: r.reason,
            })
            .collect())
    }

    async fn replace_blackout_dates(&self, dates: Vec<BlackoutDate>) -> Result<(), BoxError> {
        let mut tx = self.pool.begin().await?;
        clear_table(&mut tx, "blackout_dates").await?;
        for date in &dates {
            sqlx::query("INSERT INTO blackout_dates (id, date, reason) VALUES ($1, $2, $3)")
                .bind(&date.id)
                .bind(date.date)
                .bind(&date.reason)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_settings(&self) -> Result<Settings, BoxError> {
        let row: Option<SettingsRow> = sqlx::query_as(
            "SELECT business_name, business_phone, business_email, business_address,
                    operating_hours_start, operating_hours_end
             FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(r) => Settings {
                business_name: r.business_name,
                business_phone: r.business_phone,
                business_email: r.business_email,
                business_address: r.business_address,
                operating_hours_start: r.operating_hours_start,
                operating_hours_end: r.operating_hours_end,
            },
            None => defaults::default_settings(),
        })
    }

    async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, BoxError> {
        let mut settings = self.get_settings().await?;
        settings.apply(patch);
        self.write_settings(&settings).await?;
        Ok(settings)
    }
}

#[async_trait]
impl ReservationRepository for PgStore {
    async fn create(&self, reservation: Reservation) -> Result<(), BoxError> {
        sqlx::query(
            "INSERT INTO reservations
                 (id, unit_id, date, duration_class_id, start_time, customer_name,
                  customer_email, customer_phone, total_price_cents, status, created_at,
                  is_manual, checkout_session_id, waiver_reference)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(&reservation.id)
        .bind(&reservation.unit_id)
        .bind(reservation.date)
        .bind(&reservation.duration_class_id)
        .bind(&reservation.start_time)
        .bind(&reservation.customer_name)
        .bind(&reservation.customer_email)
        .bind(&reservation.customer_phone)
        .bind(reservation.total_price_cents)
        .bind(reservation.status.as_str())
        .bind(reservation.created_at)
        .bind(reservation.is_manual)
        .bind(&reservation.checkout_session_id)
        .bind(&reservation.waiver_reference)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> Result<Option<Reservation>, BoxError> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "UPDATE reservations SET status = $1 WHERE id = $2 RETURNING {}",
            RESERVATION_COLUMNS
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ReservationRow::into_reservation).transpose()
    }

    async fn set_checkout_session(&self, id: &str, session_id: &str) -> Result<(), BoxError> {
        sqlx::query("UPDATE reservations SET checkout_session_id = $1 WHERE id = $2")
            .bind(session_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<(), BoxError> {
        sqlx::query("DELETE FROM reservations WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Reservation>, BoxError> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reservations ORDER BY created_at DESC",
            RESERVATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(ReservationRow::into_reservation)
            .collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, BoxError> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reservations WHERE id = $1",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ReservationRow::into_reservation).transpose()
    }

    async fn list_active_for_unit_date(
        &self,
        unit_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, BoxError> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM reservations
             WHERE unit_id = $1 AND date = $2 AND status <> 'cancelled'",
            RESERVATION_COLUMNS
        ))
        .bind(unit_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(ReservationRow::into_reservation)
            .collect()
    }
}
