//! Router assembly and startup helpers shared by the binary and the
//! integration tests.

use std::path::Path;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::domain::ClinicProfile;
use crate::error::GatewayError;
use crate::service::ClinicService;
use crate::ws::handler::ws_handler;

/// Builds the full HTTP application: REST API, WebSocket endpoint and
/// the tracing and CORS layers.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Registers the clinics listed in a JSON seed file.
///
/// The file holds an array of clinic profiles. Clinics already in the
/// directory, such as those restored from the database or edited through
/// the API, are left untouched. Returns how many were registered.
///
/// # Errors
///
/// Returns [`GatewayError::Internal`] if the file cannot be read or parsed,
/// or the first registration error.
pub async fn seed_clinics(service: &ClinicService, path: &Path) -> Result<usize, GatewayError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| GatewayError::Internal(format!("reading {}: {e}", path.display())))?;
    let profiles: Vec<ClinicProfile> = serde_json::from_str(&raw)
        .map_err(|e| GatewayError::Internal(format!("parsing {}: {e}", path.display())))?;

    let mut count = 0;
    for profile in profiles {
        if service.get_clinic(&profile.id).await.is_ok() {
            tracing::debug!(clinic_id = %profile.id, "clinic already stored; seed entry skipped");
            continue;
        }
        service.register_clinic(profile).await?;
        count += 1;
    }
    tracing::info!(count, path = %path.display(), "seeded clinics");
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{ClinicDirectory, EventBus};

    #[tokio::test]
    async fn seed_file_registers_clinics() {
        let path = std::env::temp_dir().join(format!("clinics-{}.json", uuid::Uuid::new_v4()));
        let json = r#"[
            {"id": "vet-1", "name": "Central", "staff_count": 2},
            {"id": "vet-2", "name": "Harbor"}
        ]"#;
        tokio_test::assert_ok!(tokio::fs::write(&path, json).await);

        let service = ClinicService::new(Arc::new(ClinicDirectory::new()), EventBus::new(16));
        let seeded = seed_clinics(&service, &path).await;
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(seeded.ok(), Some(2));
        assert_eq!(service.list_clinics().await.len(), 2);
    }

    #[tokio::test]
    async fn seed_keeps_stored_profiles() {
        let path = std::env::temp_dir().join(format!("clinics-{}.json", uuid::Uuid::new_v4()));
        let json = r#"[
            {"id": "vet-1", "name": "Central", "staff_count": 2},
            {"id": "vet-2", "name": "Harbor"}
        ]"#;
        tokio_test::assert_ok!(tokio::fs::write(&path, json).await);

        let service = ClinicService::new(Arc::new(ClinicDirectory::new()), EventBus::new(16));
        let Ok(id) = crate::domain::ClinicId::new("vet-1") else {
            panic!("valid id");
        };
        let edited = ClinicProfile {
            id: id.clone(),
            name: "Central (renovated)".to_string(),
            staff_count: Some(5),
            coordinates: None,
            contact: crate::domain::Contact::default(),
        };
        tokio_test::assert_ok!(service.register_clinic(edited).await);

        let seeded = seed_clinics(&service, &path).await;
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(seeded.ok(), Some(1));
        let Ok(stored) = service.get_clinic(&id).await else {
            panic!("clinic should exist");
        };
        assert_eq!(stored.staff_count, Some(5));
        assert_eq!(service.list_clinics().await.len(), 2);
    }

    #[tokio::test]
    async fn missing_seed_file_is_an_error() {
        let service = ClinicService::new(Arc::new(ClinicDirectory::new()), EventBus::new(16));
        let result = seed_clinics(&service, Path::new("/nonexistent/clinics.json")).await;
        assert!(matches!(result, Err(GatewayError::Internal(_))));
    }
}
