//! Booking service: slot availability, admission and the appointment
//! lifecycle.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::slot_watch::SlotWatch;
use crate::domain::occupancy::blocked_slots;
use crate::domain::{
    AdmissionRules, AppointmentId, AppointmentLedger, AppointmentRecord, AppointmentStatus,
    CapacityPolicy, ClinicDirectory, ClinicId, Clock, EventBus, LedgerEvent, PetId, Slot,
    TransitionOutcome, Urgency, UserId, VetId,
};
use crate::error::GatewayError;

/// Tunable booking rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// How to treat clinics without a usable staff count.
    pub capacity_policy: CapacityPolicy,
    /// Maximum pending appointments per user; `None` for no limit.
    pub max_pending_per_user: Option<usize>,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            capacity_policy: CapacityPolicy::DefaultToOne,
            max_pending_per_user: Some(3),
        }
    }
}

/// Which clinic, day and pet a slot lookup is for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotQuery {
    /// Clinic being booked.
    pub clinic_id: ClinicId,
    /// Calendar day.
    pub date: NaiveDate,
    /// Pet the owner wants to book for.
    pub pet_id: PetId,
}

/// Blocked slots together with the capacity they were computed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAvailability {
    /// Clinic capacity per slot.
    pub capacity: u32,
    /// Slots that cannot be booked.
    pub blocked: BTreeSet<Slot>,
}

impl SlotAvailability {
    /// Slots that can still be booked, in chronological order.
    #[must_use]
    pub fn available(&self) -> Vec<Slot> {
        Slot::all().filter(|s| !self.blocked.contains(s)).collect()
    }
}

/// A new booking as submitted by an owner.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    /// Clinic to book at.
    pub clinic_id: ClinicId,
    /// Pet to be seen.
    pub pet_id: PetId,
    /// Owner making the request.
    pub user_id: UserId,
    /// Day of the visit.
    pub date: NaiveDate,
    /// Hour slot of the visit.
    pub slot: Slot,
    /// Reason for the visit.
    pub reason: String,
    /// Urgency level.
    pub urgency: Urgency,
    /// Quoted price; must not be negative.
    pub price: i64,
}

/// An appointment together with the status shown to users right now.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentView {
    /// Stored record.
    pub record: AppointmentRecord,
    /// Status after the time-based completed classification.
    pub display_status: AppointmentStatus,
}

/// Activity figures for a clinic's dashboard.
///
/// Counts only appointments that have taken place: stored as completed,
/// or confirmed with a start time in the past.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClinicStats {
    /// Appointments that took place.
    pub visits: usize,
    /// Distinct owners seen.
    pub distinct_clients: usize,
    /// Distinct pets treated.
    pub distinct_pets: usize,
    /// Sum of appointment prices.
    pub revenue: u64,
}

/// Orchestration layer for slot allocation and the appointment lifecycle.
///
/// Owns references to the [`ClinicDirectory`] and [`AppointmentLedger`]
/// for state and the [`EventBus`] for event emission. Every mutation
/// follows the pattern: validate input → atomic ledger call → emit event
/// → return the record.
#[derive(Debug, Clone)]
pub struct BookingService {
    directory: Arc<ClinicDirectory>,
    ledger: Arc<AppointmentLedger>,
    event_bus: EventBus,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
}

impl BookingService {
    /// Creates a new `BookingService`.
    #[must_use]
    pub fn new(
        directory: Arc<ClinicDirectory>,
        ledger: Arc<AppointmentLedger>,
        event_bus: EventBus,
        clock: Arc<dyn Clock>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            directory,
            ledger,
            event_bus,
            clock,
            policy,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`AppointmentLedger`].
    #[must_use]
    pub fn ledger(&self) -> &Arc<AppointmentLedger> {
        &self.ledger
    }

    /// Computes the slots the pet cannot book at the clinic on that day.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ClinicNotFound`] for an unknown clinic and
    /// [`GatewayError::ClinicCapacityMissing`] under the strict capacity
    /// policy.
    pub async fn compute_blocked_slots(
        &self,
        query: &SlotQuery,
    ) -> Result<BTreeSet<Slot>, GatewayError> {
        Ok(self.slot_availability(query).await?.blocked)
    }

    /// Like [`Self::compute_blocked_slots`], also reporting the capacity.
    ///
    /// # Errors
    ///
    /// Same as [`Self::compute_blocked_slots`].
    pub async fn slot_availability(
        &self,
        query: &SlotQuery,
    ) -> Result<SlotAvailability, GatewayError> {
        let clinic = self.directory.get(&query.clinic_id).await?;
        let capacity = clinic.capacity(self.policy.capacity_policy)?;
        let records = self.ledger.on_date(query.date).await;
        let blocked = blocked_slots(
            &records,
            &query.clinic_id,
            capacity,
            query.date,
            &query.pet_id,
            self.clock.now(),
        );
        Ok(SlotAvailability { capacity, blocked })
    }

    /// Opens a live subscription to the blocked slots of `query`.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::compute_blocked_slots`] if the initial
    /// computation fails.
    pub async fn watch_blocked_slots(&self, query: SlotQuery) -> Result<SlotWatch, GatewayError> {
        let receiver = self.event_bus.subscribe();
        let initial = self.compute_blocked_slots(&query).await?;
        Ok(SlotWatch::new(self.clone(), query, receiver, initial))
    }

    /// Admits a new pending appointment.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidRequest`] for a blank reason or negative price.
    /// - [`GatewayError::ClinicNotFound`] for an unknown clinic.
    /// - [`GatewayError::SlotElapsed`] if the slot has already started.
    /// - Any admission error from [`AppointmentLedger::admit`].
    pub async fn submit_booking(
        &self,
        request: BookingRequest,
    ) -> Result<AppointmentRecord, GatewayError> {
        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "reason must not be empty".to_string(),
            ));
        }
        let price = u64::try_from(request.price).map_err(|_| {
            GatewayError::InvalidRequest(format!("price must not be negative: {}", request.price))
        })?;

        let clinic = self.directory.get(&request.clinic_id).await?;
        let capacity = clinic.capacity(self.policy.capacity_policy)?;

        let scheduled_at = request.slot.on(request.date);
        if scheduled_at < self.clock.now() {
            return Err(GatewayError::SlotElapsed(scheduled_at));
        }

        let created_at = Utc::now();
        let record = AppointmentRecord {
            id: AppointmentId::new(),
            clinic_id: request.clinic_id,
            pet_id: request.pet_id,
            user_id: request.user_id,
            vet_id: None,
            reason: reason.to_string(),
            urgency: request.urgency,
            price,
            scheduled_at,
            status: AppointmentStatus::Pending,
            created_at,
            updated_at: created_at,
        };

        let rules = AdmissionRules {
            capacity,
            max_pending_per_user: self.policy.max_pending_per_user,
        };
        let record = self
            .ledger
            .admit_with(record, rules, |admitted| {
                let _ = self.event_bus.publish(LedgerEvent::AppointmentBooked {
                    appointment: admitted.clone(),
                    timestamp: created_at,
                });
            })
            .await
            .inspect_err(|e| {
                tracing::info!(clinic_id = %clinic.id, %scheduled_at, error = %e, "booking refused");
            })?;

        tracing::info!(
            appointment_id = %record.id,
            clinic_id = %record.clinic_id,
            pet_id = %record.pet_id,
            %scheduled_at,
            "appointment booked"
        );
        Ok(record)
    }

    /// Cancels an appointment. Cancelling twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AppointmentNotFound`] for an unknown id and
    /// [`GatewayError::InvalidTransition`] for rejected or completed
    /// appointments.
    pub async fn cancel_booking(&self, id: AppointmentId) -> Result<AppointmentRecord, GatewayError> {
        self.transition(id, AppointmentStatus::Cancelled, None).await
    }

    /// Confirms a pending appointment and assigns it to `vet_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless the appointment is
    /// pending, and [`GatewayError::VetUnavailable`] if the vet already has
    /// a confirmed appointment at that time.
    pub async fn confirm_booking(
        &self,
        id: AppointmentId,
        vet_id: VetId,
    ) -> Result<AppointmentRecord, GatewayError> {
        self.transition(id, AppointmentStatus::Confirmed, Some(vet_id))
            .await
    }

    /// Rejects a pending appointment.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless the appointment is
    /// pending.
    pub async fn reject_booking(&self, id: AppointmentId) -> Result<AppointmentRecord, GatewayError> {
        self.transition(id, AppointmentStatus::Rejected, None).await
    }

    /// Records that a confirmed appointment took place.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] unless the appointment is
    /// confirmed, and [`GatewayError::InvalidRequest`] before its start time.
    pub async fn complete_booking(
        &self,
        id: AppointmentId,
    ) -> Result<AppointmentRecord, GatewayError> {
        self.transition(id, AppointmentStatus::Completed, None).await
    }

    /// Returns one appointment.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AppointmentNotFound`] for an unknown id.
    pub async fn get_appointment(&self, id: AppointmentId) -> Result<AppointmentView, GatewayError> {
        let record = self.ledger.get(id).await?;
        Ok(self.view(record))
    }

    /// All appointments of a pet, newest first.
    pub async fn pet_history(&self, pet_id: &PetId) -> Vec<AppointmentView> {
        let mut records = self.ledger.for_pet(pet_id).await;
        records.reverse();
        self.views(records)
    }

    /// The pet's earliest active appointment that has not started yet.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NoUpcomingAppointment`] if there is none.
    pub async fn next_appointment(&self, pet_id: &PetId) -> Result<AppointmentView, GatewayError> {
        let now = self.clock.now();
        self.ledger
            .for_pet(pet_id)
            .await
            .into_iter()
            .find(|r| r.is_active() && r.scheduled_at > now)
            .map(|r| self.view(r))
            .ok_or_else(|| GatewayError::NoUpcomingAppointment(pet_id.clone()))
    }

    /// All appointments booked by a user, oldest first.
    pub async fn user_appointments(&self, user_id: &UserId) -> Vec<AppointmentView> {
        let records = self.ledger.for_user(user_id).await;
        self.views(records)
    }

    /// A clinic's appointments, optionally restricted to one stored status.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ClinicNotFound`] for an unknown clinic.
    pub async fn clinic_queue(
        &self,
        clinic_id: &ClinicId,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<AppointmentView>, GatewayError> {
        self.directory.get(clinic_id).await?;
        let records = self.ledger.for_clinic(clinic_id, status).await;
        Ok(self.views(records))
    }

    /// Dashboard figures over the clinic's appointments that took place.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ClinicNotFound`] for an unknown clinic.
    pub async fn clinic_stats(&self, clinic_id: &ClinicId) -> Result<ClinicStats, GatewayError> {
        self.directory.get(clinic_id).await?;
        let now = self.clock.now();
        let records = self.ledger.for_clinic(clinic_id, None).await;

        let mut clients = HashSet::new();
        let mut pets = HashSet::new();
        let mut stats = ClinicStats::default();
        for record in records
            .iter()
            .filter(|r| r.display_status(now) == AppointmentStatus::Completed)
        {
            stats.visits += 1;
            stats.revenue = stats.revenue.saturating_add(record.price);
            clients.insert(&record.user_id);
            pets.insert(&record.pet_id);
        }
        stats.distinct_clients = clients.len();
        stats.distinct_pets = pets.len();
        Ok(stats)
    }

    async fn transition(
        &self,
        id: AppointmentId,
        to: AppointmentStatus,
        vet_id: Option<VetId>,
    ) -> Result<AppointmentRecord, GatewayError> {
        let outcome = self
            .ledger
            .transition_with(id, to, vet_id, self.clock.now(), Utc::now(), |t| {
                let _ = self.event_bus.publish(LedgerEvent::AppointmentStatusChanged {
                    appointment: t.record.clone(),
                    previous_status: t.previous,
                    timestamp: t.record.updated_at,
                });
            })
            .await?;

        match outcome {
            TransitionOutcome::Applied(t) => {
                tracing::info!(
                    appointment_id = %id,
                    from = %t.previous,
                    to = %t.record.status,
                    "appointment status changed"
                );
                Ok(t.record)
            }
            TransitionOutcome::Unchanged(record) => {
                tracing::debug!(appointment_id = %id, status = %record.status, "no status change");
                Ok(record)
            }
        }
    }

    fn view(&self, record: AppointmentRecord) -> AppointmentView {
        let display_status = record.display_status(self.clock.now());
        AppointmentView {
            record,
            display_status,
        }
    }

    fn views(&self, records: Vec<AppointmentRecord>) -> Vec<AppointmentView> {
        let now = self.clock.now();
        records
            .into_iter()
            .map(|record| AppointmentView {
                display_status: record.display_status(now),
                record,
            })
            .collect()
    }
}
