//! Integration tests for OTP activation and resend.
//!
//! Run with: cargo test -p pomelo-integration-tests -- --ignored

use serde_json::{Value, json};

use pomelo_integration_tests::{
    TEST_PASSWORD, account_flags, activate, api_base_url, client, connect_db, fetch_otp, register,
    unique_email,
};

/// A 6-digit code guaranteed to differ from `code`.
fn wrong_code(code: &str) -> String {
    if code == "000000" {
        "000001".to_string()
    } else {
        "000000".to_string()
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_activation_happy_path() {
    let client = client();
    let pool = connect_db().await;
    let email = unique_email("activate");

    let resp = register(&client, &email, TEST_PASSWORD).await;
    assert_eq!(resp.status(), 201);

    let otp = fetch_otp(&pool, &email, "activation").await.unwrap();
    let resp = activate(&client, &email, &otp).await;
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert!(!body["access"].as_str().unwrap().trim().is_empty());
    assert!(!body["refresh"].as_str().unwrap().trim().is_empty());
    assert_eq!(
        body["message"].as_str().unwrap(),
        "Your email address has been confirmed. Account activated successfully."
    );

    let (is_active, is_staff, is_superuser) = account_flags(&pool, &email).await.unwrap();
    assert!(is_active);
    assert!(!is_staff);
    assert!(!is_superuser);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_activation_is_single_shot() {
    let client = client();
    let pool = connect_db().await;
    let email = unique_email("single-shot");

    register(&client, &email, TEST_PASSWORD).await;
    let otp = fetch_otp(&pool, &email, "activation").await.unwrap();
    assert_eq!(activate(&client, &email, &otp).await.status(), 200);

    // Same code again: spent on first use, and the account is active anyway
    assert_eq!(activate(&client, &email, &otp).await.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_activation_wrong_code_fails() {
    let client = client();
    let pool = connect_db().await;
    let email = unique_email("wrong-code");

    register(&client, &email, TEST_PASSWORD).await;
    let otp = fetch_otp(&pool, &email, "activation").await.unwrap();

    let resp = activate(&client, &email, &wrong_code(&otp)).await;
    assert_eq!(resp.status(), 400);

    // The failed attempt leaves the account inactive
    let (is_active, _, _) = account_flags(&pool, &email).await.unwrap();
    assert!(!is_active);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_activation_code_bound_to_email() {
    let client = client();
    let pool = connect_db().await;
    let email_a = unique_email("bound-a");
    let email_b = unique_email("bound-b");

    register(&client, &email_a, TEST_PASSWORD).await;
    register(&client, &email_b, TEST_PASSWORD).await;

    // B's code must not activate A
    let otp_b = fetch_otp(&pool, &email_b, "activation").await.unwrap();
    let resp = activate(&client, &email_a, &otp_b).await;

    // Codes are random 6-digit values; in the astronomically unlikely case of
    // a collision the assertion below would flake, so guard on inequality.
    let otp_a = fetch_otp(&pool, &email_a, "activation").await.unwrap();
    if otp_a != otp_b {
        assert_eq!(resp.status(), 400);
        let (is_active, _, _) = account_flags(&pool, &email_a).await.unwrap();
        assert!(!is_active);
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_resend_invalidates_previous_code() {
    let client = client();
    let pool = connect_db().await;
    let email = unique_email("resend");

    register(&client, &email, TEST_PASSWORD).await;
    let first = fetch_otp(&pool, &email, "activation").await.unwrap();

    let resp = client
        .post(format!("{}/auth/users/resend-activation/", api_base_url()))
        .json(&json!({ "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let second = fetch_otp(&pool, &email, "activation").await.unwrap();

    if first != second {
        // The replaced code no longer verifies
        assert_eq!(activate(&client, &email, &first).await.status(), 400);
    }
    // The fresh code does
    assert_eq!(activate(&client, &email, &second).await.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_resend_for_active_account_fails() {
    let client = client();
    let pool = connect_db().await;
    let email = unique_email("resend-active");

    register(&client, &email, TEST_PASSWORD).await;
    let otp = fetch_otp(&pool, &email, "activation").await.unwrap();
    assert_eq!(activate(&client, &email, &otp).await.status(), 200);

    let resp = client
        .post(format!("{}/auth/users/resend-activation/", api_base_url()))
        .json(&json!({ "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // No token was issued for the already-active account
    assert!(fetch_otp(&pool, &email, "activation").await.is_none());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_resend_unknown_email_fails() {
    let client = client();

    let resp = client
        .post(format!("{}/auth/users/resend-activation/", api_base_url()))
        .json(&json!({ "email": unique_email("never-registered") }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
