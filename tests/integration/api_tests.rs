//! API integration tests
//!
//! Run against a live server: `cargo test --test api_tests -- --ignored`.
//! Admin tests read a bearer token for an admin user from
//! `TAVOLA_TEST_ADMIN_TOKEN`.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn admin_token() -> String {
    std::env::var("TAVOLA_TEST_ADMIN_TOKEN").expect("TAVOLA_TEST_ADMIN_TOKEN not set")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_availability_window() {
    let client = Client::new();

    let response = client
        .get(format!("{}/availability?horizon_days=30", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["horizon_days"], 30);
    assert!(body["available"].is_array());
    assert_eq!(body["outcomes"].as_object().map(|o| o.len()), Some(30));
}

#[tokio::test]
#[ignore]
async fn test_availability_horizon_too_long() {
    let client = Client::new();

    let response = client
        .get(format!("{}/availability?horizon_days=5000", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_past_date_not_available() {
    let client = Client::new();

    let response = client
        .get(format!("{}/availability/2000-01-01", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available"], false);
    assert_eq!(body["outcome"]["status"], "past_date");
}

#[tokio::test]
#[ignore]
async fn test_malformed_date_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/availability/2025-6-1", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_submit_for_past_date_is_refused() {
    let client = Client::new();

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&json!({
            "customer_name": "Test Guest",
            "customer_email": "guest@example.com",
            "reservation_date": "2000-01-01",
            "reservation_time": "19:00",
            "party_size": 2
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore]
async fn test_counts_inverted_range_rejected() {
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/reservations/counts?start_date=2025-06-30&end_date=2025-06-01",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_admin_requires_token() {
    let client = Client::new();

    let response = client
        .get(format!("{}/admin/reservations", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_blocked_date_lifecycle() {
    let client = Client::new();
    let token = admin_token();

    let response = client
        .post(format!("{}/admin/closures/blocked", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "blocked_date": "2099-12-24", "reason": "Private event" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    let id = body["id"].as_str().expect("No id in response").to_string();

    let response = client
        .get(format!("{}/business-days/2099-12-24", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_business_day"], false);

    let response = client
        .delete(format!("{}/admin/closures/blocked/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_inverted_period_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/admin/closures/periods", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({
            "start_date": "2099-08-16",
            "end_date": "2099-08-13",
            "reason": "Summer holidays"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_recurring_day_out_of_range_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/admin/closures/recurring", BASE_URL))
        .bearer_auth(admin_token())
        .json(&json!({ "day_of_week": 7 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_counts_range_too_long_rejected() {
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/reservations/counts?start_date=2025-01-01&end_date=2030-01-01",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_submit_with_timestamp_date_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&json!({
            "customer_name": "Test Guest",
            "customer_email": "guest@example.com",
            "reservation_date": "2099-06-13T15:00:00.000Z",
            "reservation_time": "19:00",
            "party_size": 2
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_client_error());
    assert_ne!(response.status(), StatusCode::CREATED);
}
