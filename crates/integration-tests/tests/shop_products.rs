//! Integration tests for the product catalog.
//!
//! Run with: cargo test -p pomelo-integration-tests -- --ignored

use reqwest::Client;
use serde_json::{Value, json};

use pomelo_integration_tests::{
    api_base_url, client, connect_db, register_and_activate, staff_access_token, unique_email,
};

async fn create_product(client: &Client, access: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}/products", api_base_url()))
        .bearer_auth(access)
        .json(&body)
        .send()
        .await
        .unwrap()
}

fn sample_product(name: &str, status: &str) -> Value {
    json!({
        "name": name,
        "description": "A test product",
        "status": status,
        "variants": [
            { "price": "19.99", "stock": 10 },
            { "price": "24.99", "stock": 0 },
        ],
    })
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_crud_as_staff() {
    let client = client();
    let pool = connect_db().await;
    let access = staff_access_token(&client, &pool).await;

    // Create
    let resp = create_product(&client, &access, sample_product("Crud Widget", "active")).await;
    assert_eq!(resp.status(), 201);
    let product: Value = resp.json().await.unwrap();
    let id = product["id"].as_i64().unwrap();
    assert_eq!(product["name"], "Crud Widget");
    assert_eq!(product["variants"].as_array().unwrap().len(), 2);

    // Retrieve
    let resp = client
        .get(format!("{}/products/{id}", api_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Update
    let resp = client
        .patch(format!("{}/products/{id}", api_base_url()))
        .bearer_auth(&access)
        .json(&json!({ "name": "Renamed Widget", "status": "archived" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["name"], "Renamed Widget");
    assert_eq!(updated["status"], "archived");

    // Variants listing
    let resp = client
        .get(format!("{}/products/{id}/variants", api_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let variants: Value = resp.json().await.unwrap();
    assert_eq!(variants.as_array().unwrap().len(), 2);

    // Delete
    let resp = client
        .delete(format!("{}/products/{id}", api_base_url()))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .get(format!("{}/products/{id}", api_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_draft_products_hidden_from_non_staff() {
    let client = client();
    let pool = connect_db().await;
    let access = staff_access_token(&client, &pool).await;

    let resp = create_product(&client, &access, sample_product("Secret Draft", "draft")).await;
    assert_eq!(resp.status(), 201);
    let product: Value = resp.json().await.unwrap();
    let id = product["id"].as_i64().unwrap();

    // Anonymous retrieval: hidden
    let resp = client
        .get(format!("{}/products/{id}", api_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Anonymous listing: absent
    let resp = client
        .get(format!("{}/products", api_base_url()))
        .send()
        .await
        .unwrap();
    let listed: Value = resp.json().await.unwrap();
    assert!(
        !listed
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["id"].as_i64() == Some(id))
    );

    // Staff retrieval: visible
    let resp = client
        .get(format!("{}/products/{id}", api_base_url()))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_create_requires_staff() {
    let client = client();
    let pool = connect_db().await;

    // Anonymous: 401
    let resp = client
        .post(format!("{}/products", api_base_url()))
        .json(&sample_product("Nope", "active"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Activated non-staff account: 403
    let email = unique_email("customer");
    let access = register_and_activate(&client, &pool, &email).await;
    let resp = create_product(&client, &access, sample_product("Still Nope", "active")).await;
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_create_rejects_negative_price() {
    let client = client();
    let pool = connect_db().await;
    let access = staff_access_token(&client, &pool).await;

    let resp = create_product(
        &client,
        &access,
        json!({
            "name": "Bad Price",
            "variants": [{ "price": "-1.00", "stock": 1 }],
        }),
    )
    .await;
    assert_eq!(resp.status(), 400);
}
