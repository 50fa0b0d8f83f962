//! Appointment ledger with atomic admission and status transitions.
//!
//! [`AppointmentLedger`] holds every [`AppointmentRecord`] ever admitted,
//! indexed by calendar date. Records are never removed, only moved through
//! the status state machine.
//!
//! # Concurrency
//!
//! Admission re-validates the pet-conflict, slot-capacity and pending-limit
//! rules and inserts the record inside one write-lock critical section, so
//! two concurrent requests for the last seat of a slot cannot both be
//! admitted. Status transitions are serialized the same way.
//!
//! The capacity in [`AdmissionRules`] is resolved from the clinic profile
//! before the lock is taken. A clinic upsert that lowers `staff_count`
//! while an admission is in flight only applies to later admissions.
//!
//! The `*_with` variants run a commit hook while the write lock is still
//! held. Events published from the hook reach subscribers in the same
//! order the ledger applied the changes.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio::sync::RwLock;

use super::appointment::TransitionCheck;
use super::occupancy::SlotOccupancy;
use super::{
    AppointmentId, AppointmentRecord, AppointmentStatus, ClinicId, PetId, Slot, UserId, VetId,
};
use crate::error::GatewayError;

/// Limits checked when a new booking is admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionRules {
    /// Maximum active appointments per clinic slot.
    pub capacity: u32,
    /// Maximum pending appointments per user; `None` for no limit.
    pub max_pending_per_user: Option<usize>,
}

/// A status change that was written to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Status before the change.
    pub previous: AppointmentStatus,
    /// Record after the change.
    pub record: AppointmentRecord,
}

/// Outcome of [`AppointmentLedger::transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The record changed status.
    Applied(Transition),
    /// The record was already in the requested status.
    Unchanged(AppointmentRecord),
}

impl TransitionOutcome {
    /// Returns the record as it stands after the call.
    #[must_use]
    pub fn record(&self) -> &AppointmentRecord {
        match self {
            Self::Applied(t) => &t.record,
            Self::Unchanged(r) => r,
        }
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    records: HashMap<AppointmentId, AppointmentRecord>,
    by_date: HashMap<NaiveDate, Vec<AppointmentId>>,
}

impl LedgerState {
    fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &AppointmentRecord> + '_ {
        self.by_date
            .get(&date)
            .into_iter()
            .flatten()
            .filter_map(|id| self.records.get(id))
    }

    fn insert(&mut self, record: AppointmentRecord) {
        let id = record.id;
        let date = record.date();
        if self.records.insert(id, record).is_none() {
            self.by_date.entry(date).or_default().push(id);
        }
    }

    fn pending_for(&self, user_id: &UserId) -> usize {
        self.records
            .values()
            .filter(|r| r.status == AppointmentStatus::Pending && &r.user_id == user_id)
            .count()
    }

    fn pet_busy(&self, pet_id: &PetId, date: NaiveDate, slot: Slot) -> bool {
        self.on_date(date)
            .any(|r| r.is_active() && &r.pet_id == pet_id && r.slot() == Some(slot))
    }

    fn vet_busy(&self, vet_id: &VetId, record: &AppointmentRecord) -> bool {
        let slot = record.slot();
        self.on_date(record.date()).any(|r| {
            r.id != record.id
                && r.status == AppointmentStatus::Confirmed
                && r.slot() == slot
                && r.vet_id.as_ref() == Some(vet_id)
        })
    }
}

/// Authoritative in-memory set of appointment records.
#[derive(Debug, Default)]
pub struct AppointmentLedger {
    state: RwLock<LedgerState>,
}

impl AppointmentLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-loads records, replacing any with the same id.
    ///
    /// Used at startup to warm the ledger from persistence. No booking
    /// rules are checked.
    pub async fn restore(&self, records: Vec<AppointmentRecord>) -> usize {
        let mut state = self.state.write().await;
        let count = records.len();
        for record in records {
            if let Some(existing) = state.records.get(&record.id)
                && existing.date() != record.date()
            {
                let old_date = existing.date();
                if let Some(ids) = state.by_date.get_mut(&old_date) {
                    ids.retain(|id| *id != record.id);
                }
                state.records.remove(&record.id);
            }
            state.insert(record);
        }
        count
    }

    /// Admits a new pending record if every booking rule still holds.
    ///
    /// # Errors
    ///
    /// See [`AppointmentLedger::admit_with`].
    pub async fn admit(
        &self,
        record: AppointmentRecord,
        rules: AdmissionRules,
    ) -> Result<AppointmentRecord, GatewayError> {
        self.admit_with(record, rules, |_| {}).await
    }

    /// Admits a new pending record and runs `on_admit` before releasing
    /// the write lock.
    ///
    /// Pet conflicts are keyed on the hour slot, the same key the slot
    /// lookup blocks on.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidSlot`] if the record is outside opening hours.
    /// - [`GatewayError::PetAlreadyBooked`] if the pet already has an active
    ///   appointment in the same slot, at any clinic.
    /// - [`GatewayError::SlotFull`] if the clinic slot has reached capacity.
    /// - [`GatewayError::PendingLimitReached`] if the owner has too many
    ///   pending requests.
    pub async fn admit_with<F>(
        &self,
        record: AppointmentRecord,
        rules: AdmissionRules,
        on_admit: F,
    ) -> Result<AppointmentRecord, GatewayError>
    where
        F: FnOnce(&AppointmentRecord),
    {
        let slot = record.slot().ok_or_else(|| {
            GatewayError::InvalidSlot(record.scheduled_at.format("%H:%M").to_string())
        })?;
        let date = record.date();

        let mut state = self.state.write().await;

        if state.pet_busy(&record.pet_id, date, slot) {
            return Err(GatewayError::PetAlreadyBooked {
                pet_id: record.pet_id.clone(),
                scheduled_at: record.scheduled_at,
            });
        }

        let occupancy = SlotOccupancy::tally(state.on_date(date), &record.clinic_id, date);
        if occupancy.count(slot) >= rules.capacity {
            return Err(GatewayError::SlotFull {
                slot,
                capacity: rules.capacity,
            });
        }

        if let Some(limit) = rules.max_pending_per_user
            && state.pending_for(&record.user_id) >= limit
        {
            return Err(GatewayError::PendingLimitReached { limit });
        }

        state.insert(record.clone());
        on_admit(&record);
        Ok(record)
    }

    /// Moves a record to `to`, validating the state machine atomically.
    ///
    /// Confirming requires `vet_id`, which must not already hold another
    /// confirmed appointment in the same slot.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::AppointmentNotFound`] for an unknown id.
    /// - [`GatewayError::InvalidTransition`] when the state machine forbids it.
    /// - [`GatewayError::InvalidRequest`] when confirming without a vet.
    /// - [`GatewayError::VetUnavailable`] when the vet is double-booked.
    pub async fn transition(
        &self,
        id: AppointmentId,
        to: AppointmentStatus,
        vet_id: Option<VetId>,
        now: NaiveDateTime,
        updated_at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, GatewayError> {
        self.transition_with(id, to, vet_id, now, updated_at, |_| {})
            .await
    }

    /// Same as [`AppointmentLedger::transition`], running `on_applied`
    /// before releasing the write lock when the status actually changed.
    ///
    /// # Errors
    ///
    /// See [`AppointmentLedger::transition`].
    pub async fn transition_with<F>(
        &self,
        id: AppointmentId,
        to: AppointmentStatus,
        vet_id: Option<VetId>,
        now: NaiveDateTime,
        updated_at: DateTime<Utc>,
        on_applied: F,
    ) -> Result<TransitionOutcome, GatewayError>
    where
        F: FnOnce(&Transition),
    {
        let mut state = self.state.write().await;

        let current = state
            .records
            .get(&id)
            .ok_or(GatewayError::AppointmentNotFound(id))?;

        if current.check_transition(to, now)? == TransitionCheck::AlreadyApplied {
            return Ok(TransitionOutcome::Unchanged(current.clone()));
        }

        let assigned_vet = if to == AppointmentStatus::Confirmed {
            let vet = vet_id.ok_or_else(|| {
                GatewayError::InvalidRequest("vet_id is required to confirm".to_string())
            })?;
            if state.vet_busy(&vet, current) {
                return Err(GatewayError::VetUnavailable {
                    vet_id: vet,
                    scheduled_at: current.scheduled_at,
                });
            }
            Some(vet)
        } else {
            None
        };

        let record = state
            .records
            .get_mut(&id)
            .ok_or(GatewayError::AppointmentNotFound(id))?;
        let previous = record.status;
        record.status = to;
        record.updated_at = updated_at;
        if assigned_vet.is_some() {
            record.vet_id = assigned_vet;
        }

        let transition = Transition {
            previous,
            record: record.clone(),
        };
        on_applied(&transition);
        Ok(TransitionOutcome::Applied(transition))
    }

    /// Returns a copy of one record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AppointmentNotFound`] for an unknown id.
    pub async fn get(&self, id: AppointmentId) -> Result<AppointmentRecord, GatewayError> {
        let state = self.state.read().await;
        state
            .records
            .get(&id)
            .cloned()
            .ok_or(GatewayError::AppointmentNotFound(id))
    }

    /// Snapshot of every record scheduled on `date`, in any status.
    pub async fn on_date(&self, date: NaiveDate) -> Vec<AppointmentRecord> {
        let state = self.state.read().await;
        state.on_date(date).cloned().collect()
    }

    /// All records of a pet, oldest first.
    pub async fn for_pet(&self, pet_id: &PetId) -> Vec<AppointmentRecord> {
        self.collect_sorted(|r| &r.pet_id == pet_id).await
    }

    /// All records booked by a user, oldest first.
    pub async fn for_user(&self, user_id: &UserId) -> Vec<AppointmentRecord> {
        self.collect_sorted(|r| &r.user_id == user_id).await
    }

    /// Records of a clinic, optionally restricted to one status, oldest first.
    pub async fn for_clinic(
        &self,
        clinic_id: &ClinicId,
        status: Option<AppointmentStatus>,
    ) -> Vec<AppointmentRecord> {
        self.collect_sorted(|r| {
            &r.clinic_id == clinic_id && status.is_none_or(|s| r.status == s)
        })
        .await
    }

    /// Returns the number of records.
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Returns `true` if the ledger holds no records.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }

    async fn collect_sorted<F>(&self, predicate: F) -> Vec<AppointmentRecord>
    where
        F: Fn(&AppointmentRecord) -> bool,
    {
        let state = self.state.read().await;
        let mut records: Vec<AppointmentRecord> = state
            .records
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.scheduled_at
                .cmp(&b.scheduled_at)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        records
    }
}
