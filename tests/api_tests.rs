//! REST integration tests against a live server on an ephemeral port.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use reqwest::StatusCode;
use serde_json::Value;

use common::{DAY, booking, spawn_server};

async fn get_json(client: &reqwest::Client, url: &str) -> (StatusCode, Value) {
    let Ok(resp) = client.get(url).send().await else {
        panic!("GET {url} failed");
    };
    let status = resp.status();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn post_json(client: &reqwest::Client, url: &str, body: &Value) -> (StatusCode, Value) {
    let Ok(resp) = client.post(url).json(body).send().await else {
        panic!("POST {url} failed");
    };
    let status = resp.status();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn health_reports_healthy() {
    let server = spawn_server(&[]).await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, &server.url("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn slot_catalog_lists_twelve_hours() {
    let server = spawn_server(&[]).await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, &server.url("/config/slots")).await;
    assert_eq!(status, StatusCode::OK);
    let slots = strings(&body["slots"]);
    assert_eq!(slots.len(), 12);
    assert_eq!(slots.first().map(String::as_str), Some("09:00"));
    assert_eq!(slots.last().map(String::as_str), Some("20:00"));
}

#[tokio::test]
async fn fresh_clinic_has_nothing_blocked() {
    let server = spawn_server(&[("vet-1", Some(2))]).await;
    let client = reqwest::Client::new();

    let url = server.url(&format!("/api/v1/clinics/vet-1/slots?date={DAY}&pet_id=pet-x"));
    let (status, body) = get_json(&client, &url).await;
    assert_eq!(status, StatusCode::OK);
    assert!(strings(&body["blocked"]).is_empty());
    assert_eq!(strings(&body["available"]).len(), 12);
    assert_eq!(body["capacity"], 2);
}

#[tokio::test]
async fn full_slot_is_blocked_and_refused() {
    let server = spawn_server(&[("vet-1", Some(1))]).await;
    let client = reqwest::Client::new();
    let url = server.url("/api/v1/appointments");

    let (status, body) = post_json(&client, &url, &booking("vet-1", "pet-a", "u1", "10:00")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["scheduled_at"], format!("{DAY} 10:00"));

    let (status, body) = post_json(&client, &url, &booking("vet-1", "pet-b", "u2", "10:00")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2005);

    let slots = server.url(&format!("/api/v1/clinics/vet-1/slots?date={DAY}&pet_id=pet-b"));
    let (_, body) = get_json(&client, &slots).await;
    assert_eq!(strings(&body["blocked"]), vec!["10:00".to_string()]);
}

#[tokio::test]
async fn pet_booking_blocks_other_clinic() {
    let server = spawn_server(&[("vet-1", Some(3)), ("vet-2", Some(3))]).await;
    let client = reqwest::Client::new();

    let (status, _) = post_json(
        &client,
        &server.url("/api/v1/appointments"),
        &booking("vet-1", "pet-x", "u1", "14:00"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let url = server.url(&format!("/api/v1/clinics/vet-2/slots?date={DAY}&pet_id=pet-x"));
    let (_, body) = get_json(&client, &url).await;
    assert_eq!(strings(&body["blocked"]), vec!["14:00".to_string()]);
}

#[tokio::test]
async fn cancel_frees_the_slot_and_is_idempotent() {
    let server = spawn_server(&[("vet-1", Some(1))]).await;
    let client = reqwest::Client::new();

    let (_, created) = post_json(
        &client,
        &server.url("/api/v1/appointments"),
        &booking("vet-1", "pet-a", "u1", "11:00"),
    )
    .await;
    let Some(id) = created["appointment_id"].as_str() else {
        panic!("appointment id in response");
    };

    let cancel = server.url(&format!("/api/v1/appointments/{id}/cancel"));
    let (status, body) = post_json(&client, &cancel, &Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, _) = post_json(&client, &cancel, &Value::Null).await;
    assert_eq!(status, StatusCode::OK);

    let url = server.url(&format!("/api/v1/clinics/vet-1/slots?date={DAY}&pet_id=pet-b"));
    let (_, body) = get_json(&client, &url).await;
    assert!(strings(&body["blocked"]).is_empty());
}

#[tokio::test]
async fn confirm_then_reject_is_a_conflict() {
    let server = spawn_server(&[("vet-1", Some(2))]).await;
    let client = reqwest::Client::new();

    let (_, created) = post_json(
        &client,
        &server.url("/api/v1/appointments"),
        &booking("vet-1", "pet-a", "u1", "12:00"),
    )
    .await;
    let Some(id) = created["appointment_id"].as_str() else {
        panic!("appointment id in response");
    };

    let (status, body) = post_json(
        &client,
        &server.url(&format!("/api/v1/appointments/{id}/confirm")),
        &serde_json::json!({ "vet_id": "dr-house" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vet_id"], "dr-house");

    let (status, body) = post_json(
        &client,
        &server.url(&format!("/api/v1/appointments/{id}/reject")),
        &Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2006);
}

#[tokio::test]
async fn unknown_clinic_and_bad_date_map_to_error_codes() {
    let server = spawn_server(&[("vet-1", Some(1))]).await;
    let client = reqwest::Client::new();

    let url = server.url(&format!("/api/v1/clinics/nowhere/slots?date={DAY}&pet_id=p"));
    let (status, body) = get_json(&client, &url).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2001);

    let url = server.url("/api/v1/clinics/vet-1/slots?date=2025-13-40&pet_id=p");
    let (status, body) = get_json(&client, &url).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1002);
}

#[tokio::test]
async fn off_hours_slot_is_invalid() {
    let server = spawn_server(&[("vet-1", Some(1))]).await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        &server.url("/api/v1/appointments"),
        &booking("vet-1", "pet-a", "u1", "21:00"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1003);
}

#[tokio::test]
async fn clinic_upsert_then_get() {
    let server = spawn_server(&[]).await;
    let client = reqwest::Client::new();
    let url = server.url("/api/v1/clinics/vet-9");

    let Ok(resp) = client
        .put(&url)
        .json(&serde_json::json!({ "name": "Harbor Vets", "staff_count": 4 }))
        .send()
        .await
    else {
        panic!("PUT failed");
    };
    assert_eq!(resp.status(), StatusCode::OK);

    let (status, body) = get_json(&client, &url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Harbor Vets");
    assert_eq!(body["staff_count"], 4);

    let (_, list) = get_json(&client, &server.url("/api/v1/clinics?per_page=10")).await;
    assert_eq!(list["pagination"]["total"], 1);
}

#[tokio::test]
async fn next_appointment_for_pet() {
    let server = spawn_server(&[("vet-1", Some(2))]).await;
    let client = reqwest::Client::new();
    let url = server.url("/api/v1/pets/pet-a/appointments/next");

    let (status, body) = get_json(&client, &url).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2003);

    for slot in ["16:00", "09:00"] {
        let (status, _) = post_json(
            &client,
            &server.url("/api/v1/appointments"),
            &booking("vet-1", "pet-a", "u1", slot),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = get_json(&client, &url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scheduled_at"], format!("{DAY} 09:00"));

    let (_, history) = get_json(&client, &server.url("/api/v1/pets/pet-a/appointments")).await;
    assert_eq!(history["total"], 2);
    assert_eq!(history["data"][0]["scheduled_at"], format!("{DAY} 16:00"));
}

#[tokio::test]
async fn concurrent_bookings_never_exceed_capacity() {
    let server = spawn_server(&[("vet-1", Some(2))]).await;
    let client = reqwest::Client::new();
    let url = server.url("/api/v1/appointments");

    let mut tasks = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        let url = url.clone();
        tasks.push(tokio::spawn(async move {
            let body = booking("vet-1", &format!("pet-{i}"), &format!("user-{i}"), "15:00");
            client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map(|r| r.status())
                .ok()
        }));
    }

    let mut created = 0;
    for task in tasks {
        if let Ok(Some(StatusCode::CREATED)) = task.await {
            created += 1;
        }
    }
    assert_eq!(created, 2);
}
