//! Data Transfer Objects for REST request/response serialization.
//!
//! Identifiers travel as plain strings and are validated into domain ids
//! by the handlers. Dates use `YYYY-MM-DD`, slots `HH:00` and appointment
//! times `YYYY-MM-DD HH:MM`.

pub mod appointment_dto;
pub mod clinic_dto;
pub mod common_dto;
pub mod slot_dto;

pub use appointment_dto::*;
pub use clinic_dto::*;
pub use common_dto::*;
pub use slot_dto::*;
