//! Clinic service: registers and looks up clinic profiles.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{ClinicDirectory, ClinicId, ClinicProfile, EventBus, LedgerEvent};
use crate::error::GatewayError;

/// Orchestration layer for clinic profiles.
#[derive(Debug, Clone)]
pub struct ClinicService {
    directory: Arc<ClinicDirectory>,
    event_bus: EventBus,
}

impl ClinicService {
    /// Creates a new `ClinicService`.
    #[must_use]
    pub fn new(directory: Arc<ClinicDirectory>, event_bus: EventBus) -> Self {
        Self {
            directory,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`ClinicDirectory`].
    #[must_use]
    pub fn directory(&self) -> &Arc<ClinicDirectory> {
        &self.directory
    }

    /// Creates or replaces a clinic profile and emits
    /// [`LedgerEvent::ClinicUpserted`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a blank name or a zero
    /// staff count.
    pub async fn register_clinic(
        &self,
        mut profile: ClinicProfile,
    ) -> Result<ClinicProfile, GatewayError> {
        let name = profile.name.trim();
        if name.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "clinic name must not be empty".to_string(),
            ));
        }
        profile.name = name.to_string();
        if profile.staff_count == Some(0) {
            return Err(GatewayError::InvalidRequest(
                "staff_count must be positive".to_string(),
            ));
        }

        let previous = self.directory.upsert(profile.clone()).await;

        let _ = self.event_bus.publish(LedgerEvent::ClinicUpserted {
            clinic: profile.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(
            clinic_id = %profile.id,
            staff_count = ?profile.staff_count,
            replaced = previous.is_some(),
            "clinic registered"
        );
        Ok(profile)
    }

    /// Returns one clinic profile.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ClinicNotFound`] for an unknown id.
    pub async fn get_clinic(&self, clinic_id: &ClinicId) -> Result<ClinicProfile, GatewayError> {
        self.directory.get(clinic_id).await
    }

    /// Returns every clinic, sorted by name.
    pub async fn list_clinics(&self) -> Vec<ClinicProfile> {
        self.directory.list().await
    }
}
