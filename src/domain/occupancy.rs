//! Slot occupancy and blocked-slot computation.
//!
//! Everything here is pure: callers snapshot the ledger, pass the
//! records in, and get a fresh answer. Nothing is cached between calls.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};

use super::slot::Slot;
use super::{AppointmentRecord, ClinicId, PetId};

/// Active appointment count per slot for one clinic and date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotOccupancy {
    counts: BTreeMap<Slot, u32>,
}

impl SlotOccupancy {
    /// Counts active records of `clinic_id` on `date`, grouped by slot.
    pub fn tally<'a, I>(records: I, clinic_id: &ClinicId, date: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a AppointmentRecord>,
    {
        let mut counts = BTreeMap::new();
        for record in records {
            if !record.is_active() || record.date() != date || &record.clinic_id != clinic_id {
                continue;
            }
            if let Some(slot) = record.slot() {
                let count: &mut u32 = counts.entry(slot).or_default();
                *count = count.saturating_add(1);
            }
        }
        Self { counts }
    }

    /// Active appointments in `slot`.
    #[must_use]
    pub fn count(&self, slot: Slot) -> u32 {
        self.counts.get(&slot).copied().unwrap_or(0)
    }

    /// Slots whose count has reached `capacity`.
    pub fn saturated(&self, capacity: u32) -> impl Iterator<Item = Slot> + '_ {
        self.counts
            .iter()
            .filter(move |(_, count)| **count >= capacity)
            .map(|(slot, _)| *slot)
    }
}

/// Slots already taken by `pet_id` on `date`, at any clinic.
pub fn pet_slots<'a, I>(records: I, pet_id: &PetId, date: NaiveDate) -> BTreeSet<Slot>
where
    I: IntoIterator<Item = &'a AppointmentRecord>,
{
    records
        .into_iter()
        .filter(|r| r.is_active() && r.date() == date && &r.pet_id == pet_id)
        .filter_map(AppointmentRecord::slot)
        .collect()
}

/// Slots of `date` that have already started at wall-clock time `now`.
///
/// Empty unless `date` is today.
#[must_use]
pub fn elapsed_slots(date: NaiveDate, now: NaiveDateTime) -> BTreeSet<Slot> {
    if date != now.date() {
        return BTreeSet::new();
    }
    let time = now.time();
    Slot::all().filter(|slot| slot.start_time() < time).collect()
}

/// Unavailable slots for `pet_id` at `clinic_id` on `date`.
///
/// Union of the clinic's saturated slots, the pet's own bookings that day
/// anywhere, and, when `date` is today, the slots that have started.
pub fn blocked_slots(
    records: &[AppointmentRecord],
    clinic_id: &ClinicId,
    capacity: u32,
    date: NaiveDate,
    pet_id: &PetId,
    now: NaiveDateTime,
) -> BTreeSet<Slot> {
    let occupancy = SlotOccupancy::tally(records, clinic_id, date);
    let mut blocked: BTreeSet<Slot> = occupancy.saturated(capacity).collect();
    blocked.extend(pet_slots(records, pet_id, date));
    blocked.extend(elapsed_slots(date, now));
    blocked
}
