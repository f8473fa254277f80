//! Integration tests for anonymous carts.
//!
//! Run with: cargo test -p pomelo-integration-tests -- --ignored

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

use pomelo_integration_tests::{api_base_url, client, connect_db, staff_access_token};

/// Create a product with one variant; returns the variant ID.
async fn seed_variant(client: &Client, access: &str) -> i64 {
    let resp = client
        .post(format!("{}/products", api_base_url()))
        .bearer_auth(access)
        .json(&json!({
            "name": "Cart Fixture",
            "variants": [{ "price": "9.99", "stock": 5 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let product: Value = resp.json().await.unwrap();
    product["variants"][0]["id"].as_i64().unwrap()
}

async fn create_cart(client: &Client) -> String {
    let resp = client
        .post(format!("{}/carts", api_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let cart: Value = resp.json().await.unwrap();
    let id = cart["id"].as_str().unwrap().to_string();
    assert!(Uuid::parse_str(&id).is_ok(), "cart id is not a UUID: {id}");
    id
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_lifecycle() {
    let client = client();
    let pool = connect_db().await;
    let access = staff_access_token(&client, &pool).await;
    let variant_id = seed_variant(&client, &access).await;

    let cart_id = create_cart(&client).await;

    // Add an item
    let resp = client
        .post(format!("{}/carts/{cart_id}/items", api_base_url()))
        .json(&json!({ "variant_id": variant_id, "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let item: Value = resp.json().await.unwrap();
    let item_id = item["id"].as_i64().unwrap();
    assert_eq!(item["quantity"], 2);

    // Update the quantity
    let resp = client
        .patch(format!("{}/carts/{cart_id}/items/{item_id}", api_base_url()))
        .json(&json!({ "quantity": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let item: Value = resp.json().await.unwrap();
    assert_eq!(item["quantity"], 4);

    // The cart reflects the item
    let resp = client
        .get(format!("{}/carts/{cart_id}", api_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let cart: Value = resp.json().await.unwrap();
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);

    // Remove the item, then the cart
    let resp = client
        .delete(format!("{}/carts/{cart_id}/items/{item_id}", api_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .delete(format!("{}/carts/{cart_id}", api_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .get(format!("{}/carts/{cart_id}", api_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_add_duplicate_variant_fails() {
    let client = client();
    let pool = connect_db().await;
    let access = staff_access_token(&client, &pool).await;
    let variant_id = seed_variant(&client, &access).await;

    let cart_id = create_cart(&client).await;

    let add = || {
        client
            .post(format!("{}/carts/{cart_id}/items", api_base_url()))
            .json(&json!({ "variant_id": variant_id, "quantity": 1 }))
            .send()
    };

    assert_eq!(add().await.unwrap().status(), 201);
    // Same variant again: one row per (cart, variant)
    assert_eq!(add().await.unwrap().status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_add_unknown_variant_fails() {
    let client = client();
    let cart_id = create_cart(&client).await;

    let resp = client
        .post(format!("{}/carts/{cart_id}/items", api_base_url()))
        .json(&json!({ "variant_id": 999_999_999, "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_zero_quantity_rejected() {
    let client = client();
    let pool = connect_db().await;
    let access = staff_access_token(&client, &pool).await;
    let variant_id = seed_variant(&client, &access).await;
    let cart_id = create_cart(&client).await;

    let resp = client
        .post(format!("{}/carts/{cart_id}/items", api_base_url()))
        .json(&json!({ "variant_id": variant_id, "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unknown_cart_is_404() {
    let client = client();

    let resp = client
        .get(format!("{}/carts/{}", api_base_url(), Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
