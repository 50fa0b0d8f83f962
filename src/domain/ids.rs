//! Type-safe identifiers for clinics, pets, users, vets and appointments.
//!
//! Documents owned by the external platform (clinics, pets, users) keep
//! their store-assigned string ids. Appointments are created by this
//! gateway and get a UUID v4 [`AppointmentId`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`GatewayError::InvalidRequest`] if the id is blank.
            pub fn new(raw: impl Into<String>) -> Result<Self, GatewayError> {
                let raw = raw.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(GatewayError::InvalidRequest(format!(
                        "{} must not be empty",
                        $label
                    )));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = GatewayError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// Store-assigned identifier of a clinic document.
    ClinicId,
    "clinic_id"
);

string_id!(
    /// Store-assigned identifier of a pet document.
    PetId,
    "pet_id"
);

string_id!(
    /// Identity-provider user id of the pet owner who books.
    UserId,
    "user_id"
);

string_id!(
    /// Identity-provider user id of the veterinarian who confirms.
    VetId,
    "vet_id"
);

/// Unique identifier for an appointment record.
///
/// Wraps a UUID v4 generated once at booking time and immutable
/// thereafter. Used as the key in [`super::AppointmentLedger`] and in
/// every [`super::LedgerEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(uuid::Uuid);

impl AppointmentId {
    /// Creates a new random `AppointmentId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates an `AppointmentId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for AppointmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for AppointmentId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AppointmentId> for uuid::Uuid {
    fn from(id: AppointmentId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn appointment_ids_are_unique() {
        assert_ne!(AppointmentId::new(), AppointmentId::new());
    }

    #[test]
    fn appointment_id_displays_as_uuid() {
        let s = AppointmentId::new().to_string();
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn string_id_trims_whitespace() {
        let Ok(id) = ClinicId::new("  vet-1 ") else {
            panic!("valid clinic id");
        };
        assert_eq!(id.as_str(), "vet-1");
    }

    #[test]
    fn blank_string_id_is_rejected() {
        assert!(PetId::new("   ").is_err());
        assert!(UserId::new(String::new()).is_err());
    }

    #[test]
    fn string_id_deserialization_validates() {
        let ok: Result<VetId, _> = serde_json::from_str("\"vet-a\"");
        assert!(ok.is_ok());
        let blank: Result<VetId, _> = serde_json::from_str("\"\"");
        assert!(blank.is_err());
    }

    #[test]
    fn string_id_serializes_as_plain_string() {
        let Ok(id) = PetId::new("pet-x") else {
            panic!("valid pet id");
        };
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"pet-x\"");
    }
}
