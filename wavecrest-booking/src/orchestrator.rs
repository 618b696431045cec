use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};
use wavecrest_catalog::{CatalogRepository, DurationClass, UnitStatus};
use wavecrest_core::payment::{
    CheckoutRequest, CheckoutSession, PaymentGateway, PaymentSessionStatus,
};
use wavecrest_core::BoxError;
use wavecrest_ledger::{Reservation, ReservationRepository, ReservationStatus};

use crate::availability::AvailabilityEngine;
use crate::error::BookingError;

/// Wire value a client sends to book every currently-available unit at once.
pub const ALL_UNITS_TARGET: &str = "__all__";

/// Which unit(s) a booking request claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingTarget {
    Unit(String),
    /// Every unit currently in `available` status, all-or-nothing.
    AllAvailable,
}

impl BookingTarget {
    pub fn parse(raw: &str) -> Self {
        if raw == ALL_UNITS_TARGET {
            BookingTarget::AllAvailable
        } else {
            BookingTarget::Unit(raw.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub target: BookingTarget,
    pub date: NaiveDate,
    pub duration_class_id: String,
    pub start_time: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub is_manual: bool,
    pub waiver_reference: Option<String>,
}

/// Outcome of a direct (no external payment) booking.
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    /// The designated primary record; its id is the external reference for
    /// the whole group.
    pub primary: Reservation,
    pub reservation_ids: Vec<String>,
    /// Per-unit price times unit count.
    pub total_price_cents: i32,
}

/// Outcome of a deferred booking: provisional holds plus the session the
/// customer must complete with the payment provider.
#[derive(Debug, Clone)]
pub struct DeferredBookingReceipt {
    pub reservation_ids: Vec<String>,
    pub session_id: String,
    pub checkout_url: Option<String>,
}

/// What a checkout call produced, depending on whether a payment gateway is
/// configured.
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    Direct(BookingReceipt),
    Deferred(DeferredBookingReceipt),
}

/// Turns a validated availability check into durable reservations and
/// reconciles payment-provider events into ledger status transitions.
pub struct BookingService {
    engine: AvailabilityEngine,
    catalog: Arc<dyn CatalogRepository>,
    ledger: Arc<dyn ReservationRepository>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    /// Serializes every check-then-create section so concurrent requests for
    /// the same slot cannot both pass the availability re-check. Sufficient
    /// for a single-process deployment; a multi-process deployment needs a
    /// store-level constraint as well.
    write_gate: Mutex<()>,
}

impl BookingService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        ledger: Arc<dyn ReservationRepository>,
        gateway: Option<Arc<dyn PaymentGateway>>,
    ) -> Self {
        let engine = AvailabilityEngine::new(catalog.clone(), ledger.clone());
        Self {
            engine,
            catalog,
            ledger,
            gateway,
            write_gate: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &AvailabilityEngine {
        &self.engine
    }

    /// Book directly into `confirmed` status, the no-payment / walk-in path.
    pub async fn create_booking(&self, req: BookingRequest) -> Result<BookingReceipt, BookingError> {
        validate(&req)?;
        let class = self.duration_class(&req.duration_class_id).await?;
        let per_unit_cents = class.price_for(req.date);

        let _gate = self.write_gate.lock().await;
        let unit_ids = self.resolve_targets(&req.target).await?;
        self.recheck_all(&unit_ids, &req, &class).await?;

        let reservations =
            build_reservations(&unit_ids, &req, per_unit_cents, ReservationStatus::Confirmed);
        for r in &reservations {
            self.ledger
                .create(r.clone())
                .await
                .map_err(BookingError::store)?;
        }

        let primary = reservations
            .first()
            .cloned()
            .ok_or(BookingError::SlotUnavailable)?;
        info!(booking_id = %primary.id, units = unit_ids.len(), "booking confirmed");

        Ok(BookingReceipt {
            reservation_ids: reservations.iter().map(|r| r.id.clone()).collect(),
            total_price_cents: per_unit_cents * reservations.len() as i32,
            primary,
        })
    }

    /// Book with deferred external payment when a gateway is configured,
    /// falling back to direct booking when none is.
    pub async fn create_checkout(&self, req: BookingRequest) -> Result<CheckoutOutcome, BookingError> {
        let Some(gateway) = self.gateway.clone() else {
            warn!("no payment gateway configured, falling back to direct booking");
            return self.create_booking(req).await.map(CheckoutOutcome::Direct);
        };

        validate(&req)?;
        let class = self.duration_class(&req.duration_class_id).await?;
        let per_unit_cents = class.price_for(req.date);

        // Hold the slots as pending before talking to the provider, so
        // concurrent attempts on the same slot lose the re-check.
        let (reservations, unit_names) = {
            let _gate = self.write_gate.lock().await;
            let unit_ids = self.resolve_targets(&req.target).await?;
            self.recheck_all(&unit_ids, &req, &class).await?;

            let reservations =
                build_reservations(&unit_ids, &req, per_unit_cents, ReservationStatus::Pending);
            for r in &reservations {
                self.ledger
                    .create(r.clone())
                    .await
                    .map_err(BookingError::store)?;
            }
            (reservations, self.unit_names(&unit_ids).await?)
        };

        let ids: Vec<String> = reservations.iter().map(|r| r.id.clone()).collect();
        let session_req = CheckoutRequest {
            customer_email: req.customer_email.clone(),
            product_label: format!("Jet Ski Rental - {}", class.label),
            product_description: format!(
                "{} on {} at {}",
                unit_names.join(" & "),
                req.date,
                req.start_time
            ),
            unit_amount_cents: per_unit_cents,
            quantity: ids.len() as u32,
            primary_reservation_id: ids[0].clone(),
            reservation_ids: ids.clone(),
        };

        match gateway.create_session(&session_req).await {
            Ok(session) => {
                for id in &ids {
                    if let Err(err) = self.ledger.set_checkout_session(id, &session.id).await {
                        warn!(%id, %err, "failed to stamp checkout session on hold");
                    }
                }
                info!(session_id = %session.id, holds = ids.len(), "checkout session created");
                Ok(CheckoutOutcome::Deferred(DeferredBookingReceipt {
                    reservation_ids: ids,
                    session_id: session.id,
                    checkout_url: session.url,
                }))
            }
            Err(err) => {
                // Roll back every hold this request just created.
                if let Err(del) = self.ledger.delete_many(&ids).await {
                    warn!(%del, "rollback of provisional holds failed");
                }
                Err(BookingError::SessionCreationFailed(err.to_string()))
            }
        }
    }

    /// Payment provider reported the session completed: confirm every
    /// referenced hold.
    pub async fn on_payment_confirmed(&self, ids: &[String]) -> Result<(), BookingError> {
        for id in ids {
            match self
                .ledger
                .set_status(id, ReservationStatus::Confirmed)
                .await
                .map_err(BookingError::store)?
            {
                Some(_) => info!(%id, "reservation confirmed by payment"),
                None => warn!(%id, "payment confirmation referenced unknown reservation"),
            }
        }
        Ok(())
    }

    /// Payment provider reported the session expired: cancel the referenced
    /// holds that are still pending. Confirmed or already-cancelled records
    /// are left untouched.
    pub async fn on_payment_expired(&self, ids: &[String]) -> Result<(), BookingError> {
        for id in ids {
            match self
                .ledger
                .find_by_id(id)
                .await
                .map_err(BookingError::store)?
            {
                Some(r) if r.status == ReservationStatus::Pending => {
                    self.ledger
                        .set_status(id, ReservationStatus::Cancelled)
                        .await
                        .map_err(BookingError::store)?;
                    info!(%id, "pending hold cancelled after session expiry");
                }
                Some(_) => {}
                None => warn!(%id, "payment expiry referenced unknown reservation"),
            }
        }
        Ok(())
    }

    /// Operator cancellation; the freed interval immediately stops counting
    /// toward availability.
    pub async fn cancel(&self, id: &str) -> Result<Reservation, BookingError> {
        self.update_status(id, ReservationStatus::Cancelled).await
    }

    /// Generic status transition used by the admin surface; unknown ids are
    /// surfaced, never swallowed.
    pub async fn update_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> Result<Reservation, BookingError> {
        self.ledger
            .set_status(id, status)
            .await
            .map_err(BookingError::store)?
            .ok_or_else(|| BookingError::NotFound(id.to_string()))
    }

    /// Confirm a reservation once the gateway reports its session paid; used
    /// by the post-checkout landing page as a webhook fallback.
    pub async fn verify_checkout(
        &self,
        session_id: &str,
        reservation_id: &str,
    ) -> Result<Reservation, BookingError> {
        let reservation = self
            .ledger
            .find_by_id(reservation_id)
            .await
            .map_err(BookingError::store)?
            .ok_or_else(|| BookingError::NotFound(reservation_id.to_string()))?;

        if let Some(gateway) = &self.gateway {
            match gateway.get_session(session_id).await {
                Ok(CheckoutSession {
                    payment_status: PaymentSessionStatus::Paid,
                    ..
                }) => {
                    return self
                        .update_status(reservation_id, ReservationStatus::Confirmed)
                        .await;
                }
                Ok(_) => {}
                // Verification failure still returns the reservation as-is;
                // the webhook remains the source of truth.
                Err(err) => warn!(%err, "checkout session verification failed"),
            }
        }
        Ok(reservation)
    }

    async fn duration_class(&self, id: &str) -> Result<DurationClass, BookingError> {
        self.catalog
            .list_duration_classes()
            .await
            .map_err(BookingError::store)?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| BookingError::Validation(format!("Unknown duration class: {}", id)))
    }

    async fn resolve_targets(&self, target: &BookingTarget) -> Result<Vec<String>, BookingError> {
        match target {
            BookingTarget::Unit(id) => Ok(vec![id.clone()]),
            BookingTarget::AllAvailable => {
                let units = self
                    .catalog
                    .list_units()
                    .await
                    .map_err(BookingError::store)?;
                let ids: Vec<String> = units
                    .into_iter()
                    .filter(|u| u.status == UnitStatus::Available)
                    .map(|u| u.id)
                    .collect();
                if ids.is_empty() {
                    return Err(BookingError::SlotUnavailable);
                }
                Ok(ids)
            }
        }
    }

    /// All-or-nothing availability re-check across every target unit; closes
    /// the race window between the client's earlier query and this write.
    async fn recheck_all(
        &self,
        unit_ids: &[String],
        req: &BookingRequest,
        class: &DurationClass,
    ) -> Result<(), BookingError> {
        for unit_id in unit_ids {
            if !self
                .engine
                .is_available(unit_id, req.date, &req.start_time, class.duration_minutes)
                .await?
            {
                return Err(BookingError::SlotUnavailable);
            }
        }
        Ok(())
    }

    async fn unit_names(&self, unit_ids: &[String]) -> Result<Vec<String>, BookingError> {
        let units = self
            .catalog
            .list_units()
            .await
            .map_err(BookingError::store)?;
        Ok(unit_ids
            .iter()
            .map(|id| {
                units
                    .iter()
                    .find(|u| &u.id == id)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Jet Ski".to_string())
            })
            .collect())
    }
}

fn validate(req: &BookingRequest) -> Result<(), BookingError> {
    if let BookingTarget::Unit(id) = &req.target {
        if id.is_empty() {
            return Err(BookingError::Validation("Missing unit id".to_string()));
        }
    }
    for (field, value) in [
        ("duration_class_id", &req.duration_class_id),
        ("start_time", &req.start_time),
        ("customer_name", &req.customer_name),
        ("customer_email", &req.customer_email),
    ] {
        if value.is_empty() {
            return Err(BookingError::Validation(format!("Missing {}", field)));
        }
    }
    Ok(())
}

fn build_reservations(
    unit_ids: &[String],
    req: &BookingRequest,
    per_unit_cents: i32,
    status: ReservationStatus,
) -> Vec<Reservation> {
    unit_ids
        .iter()
        .map(|unit_id| Reservation {
            id: Reservation::new_id(),
            unit_id: unit_id.clone(),
            date: req.date,
            duration_class_id: req.duration_class_id.clone(),
            start_time: req.start_time.clone(),
            customer_name: req.customer_name.clone(),
            customer_email: req.customer_email.clone(),
            customer_phone: req.customer_phone.clone(),
            total_price_cents: per_unit_cents,
            status,
            created_at: Utc::now(),
            is_manual: req.is_manual,
            checkout_session_id: None,
            waiver_reference: req.waiver_reference.clone(),
        })
        .collect()
}

/// Stand-in gateway for tests and demo deployments, mirroring the hosted
/// checkout contract: deterministic session ids, a failure trigger for
/// rollback paths, and sessions that report paid on retrieval.
pub struct MockCheckoutGateway;

#[async_trait]
impl PaymentGateway for MockCheckoutGateway {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession, BoxError> {
        if request.customer_email.contains("fail-gateway") {
            return Err("Simulated checkout session failure".into());
        }
        Ok(CheckoutSession {
            id: format!("cs_mock_{}", request.primary_reservation_id),
            url: Some(format!(
                "https://checkout.example/pay/{}",
                request.primary_reservation_id
            )),
            payment_status: PaymentSessionStatus::Unpaid,
        })
    }

    async fn get_session(&self, session_id: &str) -> Result<CheckoutSession, BoxError> {
        Ok(CheckoutSession {
            id: session_id.to_string(),
            url: None,
            payment_status: PaymentSessionStatus::Paid,
        })
    }
}
