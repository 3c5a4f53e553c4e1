//! API integration tests
//!
//! These run against a live server (database + redis up, seed data
//! loaded) and are ignored by default.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Tokens for the seeded test actors; issuance belongs to the identity
/// service, so tests read pre-issued tokens from the environment.
fn customer_token() -> String {
    std::env::var("RENTIVA_TEST_CUSTOMER_TOKEN").expect("RENTIVA_TEST_CUSTOMER_TOKEN not set")
}

fn admin_token() -> String {
    std::env::var("RENTIVA_TEST_ADMIN_TOKEN").expect("RENTIVA_TEST_ADMIN_TOKEN not set")
}

fn seeded_equipment_id() -> String {
    std::env::var("RENTIVA_TEST_EQUIPMENT_ID").expect("RENTIVA_TEST_EQUIPMENT_ID not set")
}

fn booking_payload(qty: i64) -> Value {
    json!({
        "items": [{ "equipment_id": seeded_equipment_id(), "qty": qty }],
        "booking_date": "2030-01-01T00:00:00Z",
        "return_date": "2030-01-03T00:00:00Z",
        "customer_name": "Test Customer",
        "customer_email": "customer@example.org",
        "customer_phone": "0612345678",
        "delivery_address": "1 Depot Road, Testville"
    })
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
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .json(&booking_payload(1))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_create_booking_computes_financials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .header("Authorization", format!("Bearer {}", customer_token()))
        .json(&booking_payload(1))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "pending");
    assert!(body["subtotal"].is_string() || body["subtotal"].is_number());
    assert!(body["id"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_overstock_is_rejected_with_item_names() {
    let client = Client::new();

    // Far beyond any seeded quantity
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .header("Authorization", format!("Bearer {}", customer_token()))
        .json(&booking_payload(1_000_000))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Overstock");
    assert!(body["message"].as_str().unwrap().contains("Insufficient stock"));
}

#[tokio::test]
#[ignore]
async fn test_confirm_is_idempotent() {
    let client = Client::new();

    let created: Value = client
        .post(format!("{}/bookings", BASE_URL))
        .header("Authorization", format!("Bearer {}", customer_token()))
        .json(&booking_payload(1))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let id = created["id"].as_str().expect("No booking ID");

    for _ in 0..2 {
        let response = client
            .post(format!("{}/bookings/{}/confirm", BASE_URL, id))
            .header("Authorization", format!("Bearer {}", admin_token()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["status"], "confirmed");
    }
}

#[tokio::test]
#[ignore]
async fn test_cancelled_booking_is_frozen() {
    let client = Client::new();

    let created: Value = client
        .post(format!("{}/bookings", BASE_URL))
        .header("Authorization", format!("Bearer {}", customer_token()))
        .json(&booking_payload(1))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let id = created["id"].as_str().expect("No booking ID");

    let response = client
        .post(format!("{}/bookings/{}/cancel", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", customer_token()))
        .json(&json!({ "reason": "changed plans" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Any further edit is refused
    let response = client
        .patch(format!("{}/bookings/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", customer_token()))
        .json(&json!({ "notes": "too late" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // And so is confirmation
    let response = client
        .post(format!("{}/bookings/{}/confirm", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", admin_token()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_charge_amount_shape() {
    let client = Client::new();

    let created: Value = client
        .post(format!("{}/bookings", BASE_URL))
        .header("Authorization", format!("Bearer {}", customer_token()))
        .json(&booking_payload(1))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let id = created["id"].as_str().expect("No booking ID");

    let body: Value = client
        .get(format!("{}/bookings/{}/charge", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", customer_token()))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    for field in ["subtotal", "security_deposit", "total"] {
        assert!(
            body[field].is_string() || body[field].is_number(),
            "missing {}",
            field
        );
    }
}
