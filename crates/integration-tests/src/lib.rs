//! Integration tests for Bazaar.
//!
//! Each test starts the full storefront router on an ephemeral port, backed
//! by an in-memory `SQLite` database and a temporary upload directory, and
//! talks to it over HTTP with a cookie-keeping client per user.
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::db::create_memory_pool;
use bazaar_storefront::state::AppState;
use reqwest::{Client, StatusCode, header::LOCATION, multipart, redirect};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Password used for every test account.
pub const PASSWORD: &str = "correct horse";

/// A running storefront.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: SqlitePool,
    upload_dir: TempDir,
}

impl TestApp {
    /// Start a storefront on a fresh database.
    pub async fn spawn() -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        let upload_path = upload_dir.path().to_string_lossy().into_owned();

        let config = StorefrontConfig::from_lookup(|key| match key {
            "BAZAAR_UPLOAD_DIR" => Some(upload_path.clone()),
            _ => None,
        })
        .expect("Failed to build config");

        let pool = create_memory_pool().await.expect("Failed to create pool");
        let app = bazaar_storefront::app(AppState::new(config, pool.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to read address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            addr,
            pool,
            upload_dir,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        self.upload_dir.path()
    }

    #[must_use]
    pub fn photo_path(&self, name: &str) -> PathBuf {
        self.upload_dir.path().join(name)
    }

    /// A client with its own cookie jar that doesn't follow redirects.
    #[must_use]
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Register `username` (e-mail `<username>@example.com`) and return a
    /// logged-in client.
    pub async fn register(&self, username: &str) -> Client {
        let client = Self::client();
        let email = format!("{username}@example.com");
        let resp = client
            .post(self.url("/register"))
            .form(&[
                ("username", username),
                ("email", email.as_str()),
                ("password", PASSWORD),
                ("password_again", PASSWORD),
            ])
            .send()
            .await
            .expect("Failed to register");

        assert_redirect(&resp, "/");
        client
    }

    /// List a product as the client's user and return its id.
    pub async fn list_product(&self, client: &Client, name: &str, price: &str) -> i64 {
        let form = multipart::Form::new()
            .text("name", name.to_owned())
            .text("price", price.to_owned())
            .part(
                "photo",
                multipart::Part::bytes(b"\x89PNG\r\n\x1a\n".to_vec()).file_name("photo.png"),
            );

        let resp = client
            .post(self.url("/add_product"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to add product");
        assert_redirect(&resp, "/");

        self.api_products()
            .await
            .iter()
            .rev()
            .find(|p| p["name"] == name)
            .and_then(|p| p["id"].as_i64())
            .expect("Listed product missing from API")
    }

    /// The `products` array of `/api/products`.
    pub async fn api_products(&self) -> Vec<Value> {
        let body: Value = Self::client()
            .get(self.url("/api/products"))
            .send()
            .await
            .expect("Failed to fetch products")
            .json()
            .await
            .expect("Invalid JSON");

        body["products"].as_array().cloned().unwrap_or_default()
    }

    /// The raw `(shopcart, notifications)` text stored for `username`.
    pub async fn stored_columns(&self, username: &str) -> (String, String) {
        sqlx::query_as("SELECT shopcart, notifications FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .expect("User missing from database")
    }

    /// GET `path` with `client` and return the status.
    pub async fn get_status(&self, client: &Client, path: &str) -> StatusCode {
        client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
            .status()
    }

    /// GET `path` with `client` and return the body text.
    pub async fn get_text(&self, client: &Client, path: &str) -> String {
        client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
            .text()
            .await
            .expect("Failed to read body")
    }
}

/// Assert `resp` redirects to `location`.
pub fn assert_redirect(resp: &reqwest::Response, location: &str) {
    assert!(
        resp.status().is_redirection(),
        "expected redirect to {location}, got {}",
        resp.status()
    );
    assert_eq!(
        resp.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
        Some(location)
    );
}
