//! Cart rules and checkout.

#![allow(clippy::unwrap_used)]

use bazaar_integration_tests::{TestApp, assert_redirect};
use reqwest::StatusCode;

#[tokio::test]
async fn test_add_to_cart_rules() {
    let app = TestApp::spawn().await;
    let seller = app.register("seller").await;
    let buyer = app.register("buyer").await;
    let lamp = app.list_product(&seller, "Lamp", "12.50").await;

    let resp = buyer
        .get(app.url(&format!("/add_to_shopcart/{lamp}")))
        .send()
        .await
        .unwrap();
    assert_redirect(&resp, &format!("/product/{lamp}"));

    let status = app.get_status(&buyer, &format!("/add_to_shopcart/{lamp}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "already in cart");

    let status = app.get_status(&seller, &format!("/add_to_shopcart/{lamp}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "own product");

    let status = app.get_status(&buyer, "/add_to_shopcart/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let cart = app.get_text(&buyer, "/shopcart").await;
    assert!(cart.contains("Lamp"));
    assert!(cart.contains("12.50"));
}

#[tokio::test]
async fn test_remove_from_cart_rules() {
    let app = TestApp::spawn().await;
    let seller = app.register("seller").await;
    let buyer = app.register("buyer").await;
    let lamp = app.list_product(&seller, "Lamp", "3").await;

    let status = app.get_status(&buyer, &format!("/delete_from_shopcart1/{lamp}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "not in cart");

    let status = app.get_status(&buyer, "/delete_from_shopcart2/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.get_status(&buyer, &format!("/add_to_shopcart/{lamp}")).await;
    let resp = buyer
        .get(app.url(&format!("/delete_from_shopcart1/{lamp}")))
        .send()
        .await
        .unwrap();
    assert_redirect(&resp, &format!("/product/{lamp}"));

    app.get_status(&buyer, &format!("/add_to_shopcart/{lamp}")).await;
    let resp = buyer
        .get(app.url(&format!("/delete_from_shopcart2/{lamp}")))
        .send()
        .await
        .unwrap();
    assert_redirect(&resp, "/shopcart");
}

#[tokio::test]
async fn test_stale_cart_entry_can_be_removed() {
    let app = TestApp::spawn().await;
    let seller = app.register("seller").await;
    let buyer = app.register("buyer").await;
    let lamp = app.list_product(&seller, "Lamp", "3").await;

    app.get_status(&buyer, &format!("/add_to_shopcart/{lamp}")).await;
    app.get_status(&seller, &format!("/delete/{lamp}")).await;

    let cart = app.get_text(&buyer, "/shopcart").await;
    assert!(!cart.contains("Lamp"));

    let resp = buyer
        .get(app.url(&format!("/delete_from_shopcart2/{lamp}")))
        .send()
        .await
        .unwrap();
    assert_redirect(&resp, "/shopcart");
}

#[tokio::test]
async fn test_checkout_notifies_seller() {
    let app = TestApp::spawn().await;
    let seller = app.register("seller").await;
    let buyer = app.register("buyer").await;
    let chair = app.list_product(&seller, "Chair", "40").await;
    let table = app.list_product(&seller, "Table", "90").await;

    assert_eq!(std::fs::read_dir(app.upload_dir()).unwrap().count(), 2);

    for id in [table, chair] {
        app.get_status(&buyer, &format!("/add_to_shopcart/{id}")).await;
    }

    let (cart, _) = app.stored_columns("buyer").await;
    assert_eq!(cart, format!("{chair} {table}"));

    let resp = buyer.get(app.url("/buy")).send().await.unwrap();
    assert_redirect(&resp, "/");

    assert_eq!(app.stored_columns("buyer").await.0, "-1");
    assert_eq!(app.stored_columns("seller").await.1, "Chair;Table");

    assert!(app.api_products().await.is_empty());
    assert_eq!(std::fs::read_dir(app.upload_dir()).unwrap().count(), 0);

    let profile = app.get_text(&seller, "/profile").await;
    let chair_at = profile.find("Chair").unwrap();
    let table_at = profile.find("Table").unwrap();
    assert!(chair_at < table_at, "notifications in purchase order");

    // Notifications are shown once.
    assert_eq!(app.stored_columns("seller").await.1, "-1");
    let profile = app.get_text(&seller, "/profile").await;
    assert!(!profile.contains("Chair"));

    let cart = app.get_text(&buyer, "/shopcart").await;
    assert!(cart.contains("Your cart is empty"));
}
