//! # petify-gateway
//!
//! REST API and WebSocket gateway for veterinary appointment slot
//! allocation.
//!
//! Clinics expose twelve hourly slots a day (09:00 to 20:00) and can host
//! as many appointments per slot as they have staff. Owners look up which
//! slots their pet cannot take, book one, and later cancel; clinic staff
//! confirm, reject and complete. Every admission re-checks capacity, the
//! pet's other bookings and the owner's pending limit atomically, so two
//! owners racing for the last seat cannot both get it.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── BookingService / ClinicService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── ClinicDirectory + AppointmentLedger (domain/)
//!     ├── occupancy (pure blocked-slot computation)
//!     │
//!     └── PostgreSQL Persistence (write-through from the EventBus)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod server;
pub mod service;
pub mod ws;
