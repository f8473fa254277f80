//! Integration tests for password reset and password change.
//!
//! Run with: cargo test -p pomelo-integration-tests -- --ignored

use reqwest::Client;
use serde_json::json;

use pomelo_integration_tests::{
    TEST_PASSWORD, api_base_url, client, connect_db, fetch_otp, login, register,
    register_and_activate, unique_email,
};

const NEW_PASSWORD: &str = "Fresh_5678";

async fn request_reset(client: &Client, email: &str) -> reqwest::Response {
    client
        .post(format!("{}/auth/users/me/reset-password", api_base_url()))
        .json(&json!({ "email": email }))
        .send()
        .await
        .unwrap()
}

async fn confirm_reset(
    client: &Client,
    email: &str,
    otp: &str,
    new_password: &str,
) -> reqwest::Response {
    client
        .post(format!(
            "{}/auth/users/me/reset-password/conformation",
            api_base_url()
        ))
        .json(&json!({
            "email": email,
            "otp": otp,
            "new_password": new_password,
            "new_password_confirm": new_password,
        }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_reset_password_requires_active_account() {
    let client = client();
    let email = unique_email("reset-inactive");

    // Registered but never activated: reset is refused, activation first
    register(&client, &email, TEST_PASSWORD).await;
    assert_eq!(request_reset(&client, &email).await.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_reset_password_flow() {
    let client = client();
    let pool = connect_db().await;
    let email = unique_email("reset");

    register_and_activate(&client, &pool, &email).await;

    assert_eq!(request_reset(&client, &email).await.status(), 204);
    let otp = fetch_otp(&pool, &email, "password_reset").await.unwrap();
    assert_eq!(confirm_reset(&client, &email, &otp, NEW_PASSWORD).await.status(), 204);

    // The new password authenticates, the old one does not
    assert_eq!(login(&client, &email, NEW_PASSWORD).await.status(), 200);
    assert_eq!(login(&client, &email, TEST_PASSWORD).await.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_reset_confirm_wrong_code_fails() {
    let client = client();
    let pool = connect_db().await;
    let email = unique_email("reset-bad");

    register_and_activate(&client, &pool, &email).await;
    request_reset(&client, &email).await;

    let otp = fetch_otp(&pool, &email, "password_reset").await.unwrap();
    let wrong = if otp == "000000" { "000001" } else { "000000" };

    assert_eq!(confirm_reset(&client, &email, wrong, NEW_PASSWORD).await.status(), 400);

    // The old password still works
    assert_eq!(login(&client, &email, TEST_PASSWORD).await.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_reset_code_is_single_use() {
    let client = client();
    let pool = connect_db().await;
    let email = unique_email("reset-once");

    register_and_activate(&client, &pool, &email).await;
    request_reset(&client, &email).await;
    let otp = fetch_otp(&pool, &email, "password_reset").await.unwrap();

    assert_eq!(confirm_reset(&client, &email, &otp, NEW_PASSWORD).await.status(), 204);
    // Spent: the same code cannot reset again
    assert_eq!(confirm_reset(&client, &email, &otp, "Again_9999").await.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_change_password_flow() {
    let client = client();
    let pool = connect_db().await;
    let email = unique_email("chpass");

    let access = register_and_activate(&client, &pool, &email).await;

    let resp = client
        .post(format!("{}/auth/users/me/change-password", api_base_url()))
        .bearer_auth(&access)
        .json(&json!({
            "current_password": TEST_PASSWORD,
            "new_password": NEW_PASSWORD,
            "new_password_confirm": NEW_PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    assert_eq!(login(&client, &email, NEW_PASSWORD).await.status(), 200);
    assert_eq!(login(&client, &email, TEST_PASSWORD).await.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_change_password_wrong_current_fails() {
    let client = client();
    let pool = connect_db().await;
    let email = unique_email("chpass-bad");

    let access = register_and_activate(&client, &pool, &email).await;

    let resp = client
        .post(format!("{}/auth/users/me/change-password", api_base_url()))
        .bearer_auth(&access)
        .json(&json!({
            "current_password": "Wrong_0000",
            "new_password": NEW_PASSWORD,
            "new_password_confirm": NEW_PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Password unchanged
    assert_eq!(login(&client, &email, TEST_PASSWORD).await.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_requires_activation() {
    let client = client();
    let email = unique_email("login-inactive");

    register(&client, &email, TEST_PASSWORD).await;

    // Correct credentials, but the address was never verified
    assert_eq!(login(&client, &email, TEST_PASSWORD).await.status(), 400);
}
