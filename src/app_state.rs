//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{AppointmentLedger, ClinicDirectory, Clock, EventBus};
use crate::service::{BookingPolicy, BookingService, ClinicService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Slot allocation and appointment lifecycle.
    pub booking_service: Arc<BookingService>,
    /// Clinic profile management.
    pub clinic_service: Arc<ClinicService>,
}

impl AppState {
    /// Wires both services over the same directory, ledger and event bus.
    #[must_use]
    pub fn new(
        directory: Arc<ClinicDirectory>,
        ledger: Arc<AppointmentLedger>,
        event_bus: EventBus,
        clock: Arc<dyn Clock>,
        policy: BookingPolicy,
    ) -> Self {
        let clinic_service = Arc::new(ClinicService::new(
            Arc::clone(&directory),
            event_bus.clone(),
        ));
        let booking_service = Arc::new(BookingService::new(
            directory, ledger, event_bus, clock, policy,
        ));
        Self {
            booking_service,
            clinic_service,
        }
    }
}
