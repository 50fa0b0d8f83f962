//! Clinic profile and the staff-capacity policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ClinicId;
use crate::error::GatewayError;

/// Geographic position of a clinic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

/// Contact details shown to pet owners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
}

/// A clinic as seen by the allocator.
///
/// `staff_count` is the number of appointments the clinic can host in the
/// same hour slot. Profiles written by older clients may lack it, so it is
/// optional here and resolved through a [`CapacityPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicProfile {
    /// Clinic identifier.
    pub id: ClinicId,
    /// Display name.
    pub name: String,
    /// Concurrent appointments per slot, if configured.
    #[serde(default)]
    pub staff_count: Option<u32>,
    /// Optional map position.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Contact details.
    #[serde(default)]
    pub contact: Contact,
}

impl ClinicProfile {
    /// Resolves the per-slot capacity of this clinic.
    ///
    /// A missing or zero `staff_count` is either treated as a single vet
    /// or rejected, depending on `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ClinicCapacityMissing`] under
    /// [`CapacityPolicy::Strict`] when no positive capacity is configured.
    pub fn capacity(&self, policy: CapacityPolicy) -> Result<u32, GatewayError> {
        match (self.staff_count, policy) {
            (Some(n), _) if n > 0 => Ok(n),
            (_, CapacityPolicy::DefaultToOne) => {
                tracing::warn!(clinic_id = %self.id, "clinic has no staff_count; assuming 1");
                Ok(1)
            }
            (_, CapacityPolicy::Strict) => Err(GatewayError::ClinicCapacityMissing(self.id.clone())),
        }
    }
}

/// What to do when a clinic has no usable `staff_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Assume one appointment per slot.
    #[default]
    DefaultToOne,
    /// Refuse to compute availability for the clinic.
    Strict,
}

impl fmt::Display for CapacityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultToOne => f.write_str("default_one"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for CapacityPolicy {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default_one" | "default" => Ok(Self::DefaultToOne),
            "strict" => Ok(Self::Strict),
            other => Err(GatewayError::InvalidRequest(format!(
                "unknown capacity policy: {other}"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn clinic(staff_count: Option<u32>) -> ClinicProfile {
        let Ok(id) = ClinicId::new("vet-1") else {
            panic!("valid id");
        };
        ClinicProfile {
            id,
            name: "Clinic".to_string(),
            staff_count,
            coordinates: None,
            contact: Contact::default(),
        }
    }

    #[test]
    fn configured_capacity_is_used() {
        let c = clinic(Some(3));
        assert_eq!(c.capacity(CapacityPolicy::Strict).ok(), Some(3));
    }

    #[test]
    fn missing_capacity_defaults_to_one() {
        assert_eq!(clinic(None).capacity(CapacityPolicy::DefaultToOne).ok(), Some(1));
        assert_eq!(clinic(Some(0)).capacity(CapacityPolicy::DefaultToOne).ok(), Some(1));
    }

    #[test]
    fn missing_capacity_fails_under_strict_policy() {
        let result = clinic(None).capacity(CapacityPolicy::Strict);
        assert!(matches!(result, Err(GatewayError::ClinicCapacityMissing(_))));
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("strict".parse::<CapacityPolicy>().ok(), Some(CapacityPolicy::Strict));
        assert_eq!(
            "DEFAULT_ONE".parse::<CapacityPolicy>().ok(),
            Some(CapacityPolicy::DefaultToOne)
        );
        assert!("lenient".parse::<CapacityPolicy>().is_err());
    }

    #[test]
    fn profile_deserializes_with_defaults() {
        let json = r#"{"id": "vet-2", "name": "North"}"#;
        let Ok(profile) = serde_json::from_str::<ClinicProfile>(json) else {
            panic!("valid profile");
        };
        assert_eq!(profile.staff_count, None);
        assert_eq!(profile.contact, Contact::default());
    }
}
