//! E2E test: the HTTP admission surface.
//!
//! Flow:
//! 1. Start the daemon API on an OS-assigned port
//! 2. Open a product with an initial stock
//! 3. Place orders over HTTP and check classifications and statuses
//! 4. Verify stock, archive and metrics reflect what happened

use std::net::SocketAddr;

use serde_json::{json, Value};
use stockaded::{Config, Daemon};

// =============================================================================
// Helpers
// =============================================================================

async fn start_test_server() -> SocketAddr {
    let daemon = Daemon::new_stub(Config::test()).unwrap();
    daemon.start_api_server().await.unwrap()
}

async fn open_product(
    client: &reqwest::Client,
    addr: SocketAddr,
    product_id: i64,
    initial_stock: u32,
) {
    let response = client
        .put(format!("http://{}/products/{}", addr, product_id))
        .json(&json!({ "price": "19.90", "initial_stock": initial_stock }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
}

async fn place_order(
    client: &reqwest::Client,
    addr: SocketAddr,
    buyer_id: i64,
    product_id: i64,
    quantity: u32,
) -> reqwest::Response {
    client
        .post(format!("http://{}/orders", addr))
        .header("X-Buyer-Id", buyer_id.to_string())
        .json(&json!({ "product_info_id": product_id, "quantity": quantity }))
        .send()
        .await
        .unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_place_order_success() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();
    open_product(&client, addr, 32, 5).await;

    let response = place_order(&client, addr, 28, 32, 2).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["error"].is_null());

    // Stock decremented
    let stock: Value = client
        .get(format!("http://{}/products/32/stock", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stock["available"], 3);
}

#[tokio::test]
async fn test_sold_out_is_classified_not_an_error() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();
    open_product(&client, addr, 32, 1).await;

    let first = place_order(&client, addr, 1, 32, 1).await;
    assert_eq!(first.status().as_u16(), 200);

    let second = place_order(&client, addr, 2, 32, 1).await;
    assert_eq!(second.status().as_u16(), 200);

    let body: Value = second.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_ENOUGH_PRODUCT");
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();

    let response = place_order(&client, addr, 28, 404, 1).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_invalid_requests_are_400() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();
    open_product(&client, addr, 32, 5).await;

    // Zero quantity
    let response = place_order(&client, addr, 28, 32, 0).await;
    assert_eq!(response.status().as_u16(), 400);

    // Missing buyer header
    let response = client
        .post(format!("http://{}/orders", addr))
        .json(&json!({ "product_info_id": 32, "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_duplicate_product_open_is_409() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();
    open_product(&client, addr, 32, 5).await;

    let response = client
        .put(format!("http://{}/products/32", addr))
        .json(&json!({ "price": "19.90", "initial_stock": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn test_restock_and_stock_endpoints() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();
    open_product(&client, addr, 32, 2).await;

    let response = client
        .post(format!("http://{}/products/32/restock", addr))
        .json(&json!({ "units": 8 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["available"], 10);

    // Restocking an unknown product is 404
    let response = client
        .post(format!("http://{}/products/99/restock", addr))
        .json(&json!({ "units": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_archived_order_is_queryable() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();
    open_product(&client, addr, 32, 5).await;

    let response = place_order(&client, addr, 28, 32, 1).await;
    let placed: Value = response.json().await.unwrap();
    let order_id = placed["order_id"].as_str().unwrap();

    let response = client
        .get(format!("http://{}/orders/{}", addr, order_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let order: Value = response.json().await.unwrap();
    assert_eq!(order["buyer_id"], 28);
    assert_eq!(order["product_id"], 32);
    assert_eq!(order["state"], "Completed");
    assert!(!order["terminated_at"].is_null());
}

#[tokio::test]
async fn test_metrics_reflect_outcomes() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();
    open_product(&client, addr, 32, 1).await;

    place_order(&client, addr, 1, 32, 1).await;
    place_order(&client, addr, 2, 32, 1).await;
    // Unknown product is a rejection, not a classified outcome
    place_order(&client, addr, 3, 99, 1).await;

    let text = client
        .get(format!("http://{}/metrics", addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(text.contains("orders_success_total 1"));
    assert!(text.contains("orders_soldout_total 1"));
    assert!(text.contains("orders_rejected_total 1"));
}
