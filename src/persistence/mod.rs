//! Persistence layer: PostgreSQL clinic and appointment tables plus an
//! append-only ledger event log.
//!
//! Memory is authoritative. At startup the ledger and directory are warmed
//! from the tables; afterwards a writer task subscribed to the event bus
//! mirrors every mutation. The concrete implementation uses
//! `sqlx::PgPool` for async PostgreSQL access.

pub mod models;
pub mod postgres;
pub mod writer;

pub use postgres::PostgresPersistence;
pub use writer::{spawn_event_log_cleanup, spawn_ledger_writer};
