//! Integration tests for the two-step email-change flow.
//!
//! Run with: cargo test -p pomelo-integration-tests -- --ignored

use reqwest::Client;
use serde_json::{Value, json};

use pomelo_integration_tests::{
    api_base_url, client, connect_db, fetch_otp, register_and_activate, unique_email,
};

async fn request_change(client: &Client, access: &str, new_email: &str) -> reqwest::Response {
    client
        .post(format!("{}/auth/users/me/change-email", api_base_url()))
        .bearer_auth(access)
        .json(&json!({ "new_email": new_email }))
        .send()
        .await
        .unwrap()
}

async fn confirm_change(
    client: &Client,
    access: &str,
    new_email: &str,
    otp: &str,
) -> reqwest::Response {
    client
        .post(format!(
            "{}/auth/users/me/change-email/conformation",
            api_base_url()
        ))
        .bearer_auth(access)
        .json(&json!({ "new_email": new_email, "otp": otp }))
        .send()
        .await
        .unwrap()
}

async fn current_email(client: &Client, access: &str) -> String {
    let resp = client
        .get(format!("{}/auth/users/me", api_base_url()))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    body["email"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_email_change_happy_path() {
    let client = client();
    let pool = connect_db().await;
    let old_email = unique_email("change-old");
    let new_email = unique_email("change-new");

    let access = register_and_activate(&client, &pool, &old_email).await;

    assert_eq!(request_change(&client, &access, &new_email).await.status(), 204);

    // The code goes to the NEW address
    let otp = fetch_otp(&pool, &new_email, "email_change").await.unwrap();
    assert!(fetch_otp(&pool, &old_email, "email_change").await.is_none());

    assert_eq!(
        confirm_change(&client, &access, &new_email, &otp).await.status(),
        204
    );
    assert_eq!(current_email(&client, &access).await, new_email);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_email_change_mismatched_address_fails() {
    let client = client();
    let pool = connect_db().await;
    let old_email = unique_email("mismatch-old");
    let new_email = unique_email("mismatch-new");
    let other_email = unique_email("mismatch-other");

    let access = register_and_activate(&client, &pool, &old_email).await;
    request_change(&client, &access, &new_email).await;
    let otp = fetch_otp(&pool, &new_email, "email_change").await.unwrap();

    // Correct code, wrong address: distinct failure, email unchanged
    assert_eq!(
        confirm_change(&client, &access, &other_email, &otp).await.status(),
        400
    );
    assert_eq!(current_email(&client, &access).await, old_email);

    // The mismatch did not spend the code
    assert_eq!(
        confirm_change(&client, &access, &new_email, &otp).await.status(),
        204
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_email_change_wrong_code_fails() {
    let client = client();
    let pool = connect_db().await;
    let old_email = unique_email("badcode-old");
    let new_email = unique_email("badcode-new");

    let access = register_and_activate(&client, &pool, &old_email).await;
    request_change(&client, &access, &new_email).await;
    let otp = fetch_otp(&pool, &new_email, "email_change").await.unwrap();
    let wrong = if otp == "000000" { "000001" } else { "000000" };

    assert_eq!(
        confirm_change(&client, &access, &new_email, wrong).await.status(),
        400
    );
    assert_eq!(current_email(&client, &access).await, old_email);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_email_change_to_taken_address_fails() {
    let client = client();
    let pool = connect_db().await;
    let email_a = unique_email("taken-a");
    let email_b = unique_email("taken-b");

    let access = register_and_activate(&client, &pool, &email_a).await;
    register_and_activate(&client, &pool, &email_b).await;

    assert_eq!(request_change(&client, &access, &email_b).await.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_email_change_requires_auth() {
    let client = client();

    let resp = client
        .post(format!("{}/auth/users/me/change-email", api_base_url()))
        .json(&json!({ "new_email": unique_email("anon") }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}
