//! WebSocket layer: connection handling, message routing, slot watches.
//!
//! The WebSocket endpoint at `/ws` lets booking screens watch the blocked
//! slots of a clinic day and receive a fresh set whenever it changes.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
