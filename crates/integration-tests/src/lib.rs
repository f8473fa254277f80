//! Integration tests for Pomelo.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and run migrations
//! cargo run -p pomelo-cli -- migrate
//!
//! # Start the API server with the auth rate limiter relaxed, so parallel
//! # tests don't trip it
//! API_AUTH_RATE_BURST=1000 API_RATE_BURST=1000 cargo run -p pomelo-api
//!
//! # Run integration tests
//! cargo test -p pomelo-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - API server base URL (default: `http://localhost:8000`)
//! - `API_DATABASE_URL` / `DATABASE_URL` - `PostgreSQL` connection string,
//!   used to read issued OTP codes and inspect account state
//!
//! The email transport is not exercised: tests read issued codes straight
//! from `auth.otp_token`, the same way the workflow's own verification does.

#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

use reqwest::Client;
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Create an HTTP client.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the test database.
pub async fn connect_db() -> PgPool {
    let url = std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("API_DATABASE_URL or DATABASE_URL must be set for integration tests");

    PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// A unique throwaway email address.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.pomelo.dev", Uuid::new_v4().simple())
}

/// Password used for most test accounts.
pub const TEST_PASSWORD: &str = "Test_1234";

/// Read the live OTP code for `(email, purpose)` from the database.
///
/// Returns `None` if no code is stored.
pub async fn fetch_otp(pool: &PgPool, email: &str, purpose: &str) -> Option<String> {
    sqlx::query_scalar(
        "SELECT code FROM auth.otp_token
         WHERE email = $1 AND purpose = $2::auth.otp_purpose",
    )
    .bind(email)
    .bind(purpose)
    .fetch_optional(pool)
    .await
    .expect("Failed to read otp code")
}

/// Read `(is_active, is_staff, is_superuser)` for an account.
pub async fn account_flags(pool: &PgPool, email: &str) -> Option<(bool, bool, bool)> {
    sqlx::query_as(
        "SELECT is_active, is_staff, is_superuser FROM auth.account WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .expect("Failed to read account flags")
}

/// Promote an account to staff directly in the database.
pub async fn make_staff(pool: &PgPool, email: &str) {
    sqlx::query("UPDATE auth.account SET is_staff = TRUE WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await
        .expect("Failed to promote account to staff");
}

/// Register an account via the API. Returns the raw response.
pub async fn register(client: &Client, email: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}/auth/users/", api_base_url()))
        .json(&json!({
            "email": email,
            "password": password,
            "password_confirm": password,
        }))
        .send()
        .await
        .expect("Failed to send register request")
}

/// Activate an account with the given code. Returns the raw response.
pub async fn activate(client: &Client, email: &str, otp: &str) -> reqwest::Response {
    client
        .patch(format!("{}/auth/users/activation/", api_base_url()))
        .json(&json!({ "email": email, "otp": otp }))
        .send()
        .await
        .expect("Failed to send activation request")
}

/// Register and activate an account; returns its access token.
pub async fn register_and_activate(client: &Client, pool: &PgPool, email: &str) -> String {
    let resp = register(client, email, TEST_PASSWORD).await;
    assert_eq!(resp.status(), 201, "registration failed");

    let otp = fetch_otp(pool, email, "activation")
        .await
        .expect("no activation code issued");

    let resp = activate(client, email, &otp).await;
    assert_eq!(resp.status(), 200, "activation failed");

    let body: Value = resp.json().await.expect("activation response not JSON");
    body["access"].as_str().expect("no access token").to_string()
}

/// Log in with email and password. Returns the raw response.
pub async fn login(client: &Client, email: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}/auth/jwt/create", api_base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request")
}

/// Create a staff account and return its access token.
///
/// Registers, activates, promotes to staff in the database, then logs in
/// again so the token reflects the staff flag at verification time.
pub async fn staff_access_token(client: &Client, pool: &PgPool) -> String {
    let email = unique_email("staff");
    register_and_activate(client, pool, &email).await;
    make_staff(pool, &email).await;

    let resp = login(client, &email, TEST_PASSWORD).await;
    assert_eq!(resp.status(), 200, "staff login failed");
    let body: Value = resp.json().await.unwrap();
    body["access"].as_str().unwrap().to_string()
}
