//! Fixed hourly slot markers and the `"YYYY-MM-DD HH:MM"` wire format.
//!
//! Clinics book in whole-hour slots from `09:00` to `20:00`. Occupancy is
//! measured per slot, so every appointment time is truncated to the hour
//! marker it starts in.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GatewayError;

/// First bookable hour of the day.
pub const FIRST_HOUR: u8 = 9;

/// Last bookable hour of the day.
pub const LAST_HOUR: u8 = 20;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for appointment date-times.
pub const SCHEDULED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One of the fixed hourly markers `09:00` … `20:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(u8);

impl Slot {
    /// Returns the slot starting at `hour`, if it is a bookable hour.
    #[must_use]
    pub const fn from_hour(hour: u8) -> Option<Self> {
        if hour >= FIRST_HOUR && hour <= LAST_HOUR {
            Some(Self(hour))
        } else {
            None
        }
    }

    /// Returns the slot a time of day falls in, truncating to the hour.
    #[must_use]
    pub fn containing(time: NaiveTime) -> Option<Self> {
        u8::try_from(time.hour()).ok().and_then(Self::from_hour)
    }

    /// Iterates over every slot of the day in chronological order.
    pub fn all() -> impl Iterator<Item = Self> {
        (FIRST_HOUR..=LAST_HOUR).map(Self)
    }

    /// Hour of day this slot starts at.
    #[must_use]
    pub const fn hour(self) -> u8 {
        self.0
    }

    /// Start time of the slot.
    #[must_use]
    pub fn start_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.0), 0, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Combines the slot with a calendar date.
    #[must_use]
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start_time())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl FromStr for Slot {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map_err(|_| GatewayError::InvalidSlot(s.to_string()))?;
        if time.minute() != 0 {
            return Err(GatewayError::InvalidSlot(s.to_string()));
        }
        Self::containing(time).ok_or_else(|| GatewayError::InvalidSlot(s.to_string()))
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidDate`] if the string is not a valid date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, GatewayError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| GatewayError::InvalidDate(raw.to_string()))
}

/// Serde adapter for `NaiveDateTime` in the `"YYYY-MM-DD HH:MM"` format.
pub mod scheduled_at_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::SCHEDULED_AT_FORMAT;

    /// Serializes a date-time as `"YYYY-MM-DD HH:MM"`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(SCHEDULED_AT_FORMAT))
    }

    /// Deserializes a `"YYYY-MM-DD HH:MM"` date-time.
    ///
    /// # Errors
    ///
    /// Fails when the string does not match the format.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), SCHEDULED_AT_FORMAT)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn twelve_slots_from_nine_to_twenty() {
        let all: Vec<String> = Slot::all().map(|s| s.to_string()).collect();
        assert_eq!(all.len(), 12);
        assert_eq!(all.first().map(String::as_str), Some("09:00"));
        assert_eq!(all.last().map(String::as_str), Some("20:00"));
    }

    #[test]
    fn parses_hour_markers() {
        let Ok(slot) = "14:00".parse::<Slot>() else {
            panic!("valid slot");
        };
        assert_eq!(slot.hour(), 14);
    }

    #[test]
    fn rejects_off_grid_and_out_of_hours() {
        assert!("14:30".parse::<Slot>().is_err());
        assert!("08:00".parse::<Slot>().is_err());
        assert!("21:00".parse::<Slot>().is_err());
        assert!("noon".parse::<Slot>().is_err());
    }

    #[test]
    fn containing_truncates_to_hour() {
        let Some(time) = NaiveTime::from_hms_opt(10, 45, 0) else {
            panic!("valid time");
        };
        assert_eq!(Slot::containing(time), Slot::from_hour(10));
    }

    #[test]
    fn parse_date_accepts_iso_dates_only() {
        assert!(parse_date("2025-06-01").is_ok());
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("01/06/2025").is_err());
    }

    #[test]
    fn slot_serializes_as_marker_string() {
        let Some(slot) = Slot::from_hour(9) else {
            panic!("valid slot");
        };
        let json = serde_json::to_string(&slot).unwrap_or_default();
        assert_eq!(json, "\"09:00\"");
    }
}
