//! Incident verification and stored status lookup.

mod common;

use common::*;
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

const VERIFY: &str = "/api/incidents/verify";

fn verify_body(incident_id: Uuid) -> Value {
    json!({
        "incidentId": incident_id,
        "userLatitude": 32.0853,
        "userLongitude": 34.7818,
        "busLine": "480",
        "busCompany": "Egged",
    })
}

#[tokio::test]
async fn verifies_and_persists_outcome() {
    let app = TestApp::spawn().await;
    let incident = app.seed_incident(app.user_id).await;

    let response = app
        .post_json(VERIFY, Some(USER_TOKEN), &verify_body(incident.id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["incidentId"], incident.id.to_string());
    assert_eq!(body["verified"], true);
    assert_eq!(body["verification"]["distanceMeters"], 120.0);
    assert!(body["verifiedAt"].is_string());

    let stored = app.store.incident(incident.id).await.expect("incident stored");
    assert!(stored.verified);
    assert_eq!(
        stored.verification_data.as_ref().map(|d| &d["vehicleRef"]),
        Some(&json!("7412345"))
    );
}

#[tokio::test]
async fn missing_incident_time_uses_stored_time() {
    let app = TestApp::spawn().await;
    let incident = app.seed_incident(app.user_id).await;

    app.post_json(VERIFY, Some(USER_TOKEN), &verify_body(incident.id))
        .await;

    let requests = app.verifier.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].incident_time, incident.incident_time);
    assert_eq!(requests[0].bus_company, "Egged");
}

#[tokio::test]
async fn get_returns_stored_status() {
    let app = TestApp::spawn().await;
    let incident = app.seed_incident(app.user_id).await;
    let path = format!("/api/incidents/{}/verification", incident.id);

    let before: Value = app
        .get(&path, Some(USER_TOKEN))
        .await
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(before["verified"], false);
    assert!(before["verification"].is_null());

    app.post_json(VERIFY, Some(USER_TOKEN), &verify_body(incident.id))
        .await;

    let response = app.get(&path, Some(USER_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let after: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(after["verified"], true);
    assert_eq!(after["verification"]["confidence"], 0.9);
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let app = TestApp::spawn().await;
    let incident = app.seed_incident(app.user_id).await;

    let response = app
        .post_json(
            VERIFY,
            Some(USER_TOKEN),
            &json!({"incidentId": incident.id, "busLine": "480"}),
        )
        .await;
    let body = assert_error(response, StatusCode::BAD_REQUEST, "INVALID_REQUEST").await;
    let message = body["error"]["message"].as_str().expect("message is a string");
    assert!(message.contains("userLatitude"));
    assert!(message.contains("busCompany"));

    assert!(app.verifier.requests().await.is_empty());
}

#[tokio::test]
async fn other_users_incident_is_hidden() {
    let app = TestApp::spawn().await;
    let incident = app.seed_incident(app.admin_id).await;

    let response = app
        .post_json(VERIFY, Some(USER_TOKEN), &verify_body(incident.id))
        .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let path = format!("/api/incidents/{}/verification", incident.id);
    let response = app.get(&path, Some(USER_TOKEN)).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[tokio::test]
async fn admin_may_verify_any_incident() {
    let app = TestApp::spawn().await;
    let incident = app.seed_incident(app.user_id).await;

    let response = app
        .post_json(VERIFY, Some(ADMIN_TOKEN), &verify_body(incident.id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_incident_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(VERIFY, Some(USER_TOKEN), &verify_body(Uuid::new_v4()))
        .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[tokio::test]
async fn mistyped_coordinates_are_invalid_requests() {
    let app = TestApp::spawn().await;
    let incident = app.seed_incident(app.user_id).await;
    let mut body = verify_body(incident.id);
    body["userLatitude"] = json!("north");

    let response = app.post_json(VERIFY, Some(USER_TOKEN), &body).await;
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_REQUEST").await;
    assert!(app.verifier.requests().await.is_empty());
}

#[tokio::test]
async fn malformed_body_is_invalid_request() {
    let app = TestApp::spawn().await;

    let response = app
        .send_raw(reqwest::Method::POST, VERIFY, Some(USER_TOKEN), "{\"incidentId\":")
        .await;
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_REQUEST").await;
}

#[tokio::test]
async fn non_uuid_incident_id_is_invalid_request() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/incidents/not-a-uuid/verification", Some(USER_TOKEN))
        .await;
    let body = assert_error(response, StatusCode::BAD_REQUEST, "INVALID_REQUEST").await;
    assert!(body["error"]["message"].as_str().is_some_and(|m| !m.is_empty()));
}
