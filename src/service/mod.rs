//! Service layer: business logic orchestration.
//!
//! [`BookingService`] computes slot availability, admits bookings and
//! drives the appointment lifecycle. [`ClinicService`] manages clinic
//! profiles. Both emit events through the [`super::domain::EventBus`].

pub mod booking_service;
pub mod clinic_service;
pub mod slot_watch;

pub use booking_service::{
    AppointmentView, BookingPolicy, BookingRequest, BookingService, ClinicStats, SlotAvailability,
    SlotQuery,
};
pub use clinic_service::ClinicService;
pub use slot_watch::SlotWatch;
