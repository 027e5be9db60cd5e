//! Registration, login, and session behaviour.

#![allow(clippy::unwrap_used)]

use bazaar_integration_tests::{PASSWORD, TestApp, assert_redirect};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_and_request_id() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let resp = client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = client
        .get(app.url("/health/ready"))
        .header("x-request-id", "probe-1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-request-id"], "probe-1");
}

#[tokio::test]
async fn test_register_logs_in() {
    let app = TestApp::spawn().await;
    let client = app.register("olga").await;

    let profile = app.get_text(&client, "/profile").await;
    assert!(profile.contains("olga@example.com"));
}

#[tokio::test]
async fn test_login_required_pages_redirect() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    for path in ["/profile", "/shopcart", "/buy", "/add_product", "/logout"] {
        let resp = client.get(app.url(path)).send().await.unwrap();
        assert_redirect(&resp, "/login");
    }
}

#[tokio::test]
async fn test_login_logout() {
    let app = TestApp::spawn().await;
    app.register("olga").await;

    let client = TestApp::client();
    let resp = client
        .post(app.url("/login"))
        .form(&[("email", "olga@example.com"), ("password", "wrong password")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Incorrect e-mail or password"));

    let resp = client
        .post(app.url("/login"))
        .form(&[
            ("email", "OLGA@example.com"),
            ("password", PASSWORD),
            ("remember_me", "on"),
        ])
        .send()
        .await
        .unwrap();
    assert_redirect(&resp, "/");
    assert_eq!(app.get_status(&client, "/profile").await, StatusCode::OK);

    let resp = client.get(app.url("/logout")).send().await.unwrap();
    assert_redirect(&resp, "/");
    let resp = client.get(app.url("/profile")).send().await.unwrap();
    assert_redirect(&resp, "/login");
}

#[tokio::test]
async fn test_register_errors_rerender_form() {
    let app = TestApp::spawn().await;
    app.register("olga").await;

    let client = TestApp::client();
    let cases = [
        ("olga@example.com", PASSWORD, "A user with this e-mail already exists"),
        ("new@example.com", "different pass", "Passwords do not match"),
    ];

    for (email, password_again, message) in cases {
        let resp = client
            .post(app.url("/register"))
            .form(&[
                ("username", "Olga"),
                ("email", email),
                ("password", PASSWORD),
                ("password_again", password_again),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.text().await.unwrap().contains(message), "{message}");
    }
}

#[tokio::test]
async fn test_security_headers() {
    let app = TestApp::spawn().await;
    let resp = TestApp::client().get(app.url("/")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-frame-options"], "DENY");
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    assert!(resp.headers().contains_key("content-security-policy"));
}
