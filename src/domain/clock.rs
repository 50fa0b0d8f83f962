//! Wall-clock source for time-dependent booking rules.
//!
//! Slots that have already started today are unavailable, and confirmed
//! appointments in the past display as completed. Both rules read the
//! clinic's local time through [`Clock`] so they can be pinned in tests.

use std::fmt;

use chrono::NaiveDateTime;

/// Source of the current local date-time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current local date-time.
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
