//! JSON API shapes.

#![allow(clippy::unwrap_used)]

use bazaar_integration_tests::TestApp;
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn get_json(app: &TestApp, path: &str) -> (StatusCode, Value) {
    let resp = TestApp::client().get(app.url(path)).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn test_products_and_product() {
    let app = TestApp::spawn().await;
    let seller = app.register("seller").await;
    let lamp = app.list_product(&seller, "Lamp", "12.5").await;

    let (status, body) = get_json(&app, "/api/products").await;
    assert_eq!(status, StatusCode::OK);
    let seller_id = body["products"][0]["user_id"].clone();
    assert_eq!(
        body,
        json!({"products": [{"id": lamp, "name": "Lamp", "price": "12.50", "user_id": seller_id}]})
    );

    let (status, body) = get_json(&app, &format!("/api/product/{lamp}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["name"], "Lamp");
    let photo = body["product"]["photo"].as_str().unwrap();
    assert!(photo.ends_with(".png"));
    assert_eq!(photo.len(), 25 + ".png".len());
}

#[tokio::test]
async fn test_user_hides_private_fields() {
    let app = TestApp::spawn().await;
    let seller = app.register("seller").await;
    let lamp = app.list_product(&seller, "Lamp", "1").await;
    let (_, product) = get_json(&app, &format!("/api/product/{lamp}")).await;
    let user_id = product["product"]["user_id"].as_i64().unwrap();

    let (status, body) = get_json(&app, &format!("/api/user/{user_id}")).await;
    assert_eq!(status, StatusCode::OK);

    let user = body["user"].as_object().unwrap();
    let mut keys: Vec<_> = user.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["id", "products", "username"]);
    assert_eq!(user["username"], "seller");
    assert_eq!(user["products"][0]["id"], lamp);
}

#[tokio::test]
async fn test_not_found_is_json() {
    let app = TestApp::spawn().await;

    for path in ["/api/product/42", "/api/user/42"] {
        let (status, body) = get_json(&app, path).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not found"}));
    }
}

#[tokio::test]
async fn test_malformed_id_is_json() {
    let app = TestApp::spawn().await;

    for path in ["/api/product/abc", "/api/user/1.5"] {
        let (status, body) = get_json(&app, path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{path}");
    }
}
