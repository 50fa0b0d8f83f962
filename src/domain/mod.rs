//! Domain layer: identifiers, clinics, appointments, occupancy and events.
//!
//! This module contains the booking model: the clinic directory, the
//! appointment ledger with its status state machine, the pure slot
//! occupancy computation, and the event bus broadcasting every mutation.

pub mod appointment;
pub mod clinic;
pub mod clinic_directory;
pub mod clock;
pub mod event_bus;
pub mod ids;
pub mod ledger;
pub mod ledger_event;
pub mod occupancy;
pub mod slot;

pub use appointment::{AppointmentRecord, AppointmentStatus, Urgency};
pub use clinic::{CapacityPolicy, ClinicProfile, Contact, Coordinates};
pub use clinic_directory::ClinicDirectory;
pub use clock::{Clock, FixedClock, SystemClock};
pub use event_bus::EventBus;
pub use ids::{AppointmentId, ClinicId, PetId, UserId, VetId};
pub use ledger::{AdmissionRules, AppointmentLedger, Transition, TransitionOutcome};
pub use ledger_event::LedgerEvent;
pub use slot::Slot;
