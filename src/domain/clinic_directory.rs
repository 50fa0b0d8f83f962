//! Concurrent clinic lookup.
//!
//! [`ClinicDirectory`] maps clinic ids to their [`ClinicProfile`]. Reads
//! vastly outnumber writes (profiles change only through the admin
//! upsert), so a single [`tokio::sync::RwLock`] guards the whole map and
//! readers get cloned profiles.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{ClinicId, ClinicProfile};
use crate::error::GatewayError;

/// Read-mostly store of clinic profiles.
#[derive(Debug, Default)]
pub struct ClinicDirectory {
    clinics: RwLock<HashMap<ClinicId, ClinicProfile>>,
}

impl ClinicDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a clinic profile.
    ///
    /// Returns the previous profile, if any.
    pub async fn upsert(&self, profile: ClinicProfile) -> Option<ClinicProfile> {
        let mut map = self.clinics.write().await;
        map.insert(profile.id.clone(), profile)
    }

    /// Returns a copy of the clinic's profile.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ClinicNotFound`] if no clinic has this id.
    pub async fn get(&self, clinic_id: &ClinicId) -> Result<ClinicProfile, GatewayError> {
        let map = self.clinics.read().await;
        map.get(clinic_id)
            .cloned()
            .ok_or_else(|| GatewayError::ClinicNotFound(clinic_id.clone()))
    }

    /// Returns all clinics sorted by name, then id.
    pub async fn list(&self) -> Vec<ClinicProfile> {
        let map = self.clinics.read().await;
        let mut clinics: Vec<ClinicProfile> = map.values().cloned().collect();
        clinics.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        clinics
    }

    /// Returns the number of clinics.
    pub async fn len(&self) -> usize {
        self.clinics.read().await.len()
    }

    /// Returns `true` if the directory holds no clinics.
    pub async fn is_empty(&self) -> bool {
        self.clinics.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Contact;

    fn profile(id: &str, name: &str, staff: u32) -> ClinicProfile {
        let Ok(id) = ClinicId::new(id) else {
            panic!("valid id");
        };
        ClinicProfile {
            id,
            name: name.to_string(),
            staff_count: Some(staff),
            coordinates: None,
            contact: Contact::default(),
        }
    }

    #[tokio::test]
    async fn upsert_and_get() {
        let directory = ClinicDirectory::new();
        assert!(directory.upsert(profile("vet-1", "Central", 2)).await.is_none());

        let Ok(id) = ClinicId::new("vet-1") else {
            panic!("valid id");
        };
        let fetched = directory.get(&id).await;
        assert_eq!(fetched.ok().and_then(|p| p.staff_count), Some(2));
    }

    #[tokio::test]
    async fn upsert_replaces_existing() {
        let directory = ClinicDirectory::new();
        let _ = directory.upsert(profile("vet-1", "Central", 2)).await;
        let previous = directory.upsert(profile("vet-1", "Central", 4)).await;
        assert_eq!(previous.and_then(|p| p.staff_count), Some(2));
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn get_unknown_clinic_fails() {
        let directory = ClinicDirectory::new();
        let Ok(id) = ClinicId::new("missing") else {
            panic!("valid id");
        };
        assert!(matches!(
            directory.get(&id).await,
            Err(GatewayError::ClinicNotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let directory = ClinicDirectory::new();
        let _ = directory.upsert(profile("b", "Zoo Vets", 1)).await;
        let _ = directory.upsert(profile("a", "Animal Care", 1)).await;

        let names: Vec<String> = directory.list().await.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Animal Care".to_string(), "Zoo Vets".to_string()]);
        assert!(!directory.is_empty().await);
    }
}
