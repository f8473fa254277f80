//! Integration tests for account registration.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p pomelo-api)
//!
//! Run with: cargo test -p pomelo-integration-tests -- --ignored

use serde_json::Value;

use pomelo_integration_tests::{
    TEST_PASSWORD, account_flags, api_base_url, client, connect_db, fetch_otp, register,
    unique_email,
};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_creates_inactive_account() {
    let client = client();
    let pool = connect_db().await;
    let email = unique_email("register");

    let resp = register(&client, &email, TEST_PASSWORD).await;
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.unwrap();
    assert!(body["user_id"].is_number());
    assert_eq!(body["email"].as_str().unwrap(), email);
    // Credentials must never leak into the response
    assert!(body.get("password").is_none());
    assert!(body.get("password_confirm").is_none());

    // The stored account is inactive, non-staff, non-superuser
    let (is_active, is_staff, is_superuser) = account_flags(&pool, &email).await.unwrap();
    assert!(!is_active);
    assert!(!is_staff);
    assert!(!is_superuser);

    // Exactly one activation code is live for the address
    assert!(fetch_otp(&pool, &email, "activation").await.is_some());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_duplicate_email_fails() {
    let client = client();
    let email = unique_email("dup");

    let resp = register(&client, &email, TEST_PASSWORD).await;
    assert_eq!(resp.status(), 201);

    let resp = register(&client, &email, TEST_PASSWORD).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(
        body["detail"].as_str().unwrap().contains("already exists"),
        "unexpected detail: {body}"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_password_mismatch_fails() {
    let client = client();

    let resp = client
        .post(format!("{}/auth/users/", api_base_url()))
        .json(&serde_json::json!({
            "email": unique_email("mismatch"),
            "password": "Test_1234",
            "password_confirm": "Test_12345",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_short_password_fails() {
    let client = client();
    let resp = register(&client, &unique_email("short"), "abc").await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_invalid_email_fails() {
    let client = client();
    let resp = register(&client, "not-an-email", TEST_PASSWORD).await;
    assert_eq!(resp.status(), 400);
}
