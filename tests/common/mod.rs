//! Shared harness: an in-memory gateway on an ephemeral port with a
//! frozen clock.

#![allow(dead_code, clippy::panic, missing_docs)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDateTime;

use petify_gateway::app_state::AppState;
use petify_gateway::domain::{
    AppointmentLedger, ClinicDirectory, ClinicId, ClinicProfile, Contact, EventBus, FixedClock,
};
use petify_gateway::server::build_app;
use petify_gateway::service::BookingPolicy;

pub const NOW: &str = "2025-05-01 08:00";
pub const DAY: &str = "2025-06-01";

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

/// Starts a server whose clock reads [`NOW`], with the given clinics.
pub async fn spawn_server(clinics: &[(&str, Option<u32>)]) -> TestServer {
    let Ok(now) = NaiveDateTime::parse_from_str(NOW, "%Y-%m-%d %H:%M") else {
        panic!("valid clock");
    };
    let state = AppState::new(
        Arc::new(ClinicDirectory::new()),
        Arc::new(AppointmentLedger::new()),
        EventBus::new(1000),
        Arc::new(FixedClock(now)),
        BookingPolicy::default(),
    );

    for (id, staff_count) in clinics {
        let Ok(id) = ClinicId::new(*id) else {
            panic!("valid clinic id");
        };
        let profile = ClinicProfile {
            name: format!("Clinic {id}"),
            id,
            staff_count: *staff_count,
            coordinates: None,
            contact: Contact::default(),
        };
        if state.clinic_service.register_clinic(profile).await.is_err() {
            panic!("clinic should register");
        }
    }

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    let app = build_app(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer { addr, state }
}

pub fn booking(clinic: &str, pet: &str, user: &str, slot: &str) -> serde_json::Value {
    serde_json::json!({
        "clinic_id": clinic,
        "pet_id": pet,
        "user_id": user,
        "date": DAY,
        "slot": slot,
        "reason": "vaccination",
        "urgency": "medium",
        "price": 50,
    })
}
