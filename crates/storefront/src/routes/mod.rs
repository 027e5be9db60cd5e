//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET       /                              - All products
//! GET       /health                        - Liveness
//! GET       /health/ready                  - Readiness (database)
//!
//! # Auth
//! GET/POST  /register                      - Create an account
//! GET/POST  /login                         - Log in
//! GET       /logout                        - Log out (login required)
//!
//! # Pages
//! GET       /profile                       - Own listings and notifications
//! GET       /user/{id}                     - A seller's page
//! GET       /product/{id}                  - Product page
//!
//! # Cart (login required)
//! GET       /shopcart                      - Cart page
//! GET       /add_to_shopcart/{id}          - Add, back to the product
//! GET       /delete_from_shopcart1/{id}    - Remove, back to the product
//! GET       /delete_from_shopcart2/{id}    - Remove, back to the cart
//! GET       /buy                           - Checkout
//!
//! # Listings (login required)
//! GET/POST  /add_product                   - New listing (multipart)
//! GET/POST  /edit/{id}                     - Change name and price
//! GET/POST  /delete/{id}                   - Withdraw a listing
//!
//! # Search
//! GET/POST  /search                        - Search form
//! GET       /search/{text}                 - Results
//!
//! # JSON API
//! GET       /api/products
//! GET       /api/product/{id}
//! GET       /api/user/{id}
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod health;
pub mod home;
pub mod products;
pub mod search;
pub mod users;

use axum::{Router, extract::DefaultBodyLimit, routing::get};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/shopcart", get(cart::show))
        .route("/add_to_shopcart/{id}", get(cart::add))
        .route("/delete_from_shopcart1/{id}", get(cart::remove_from_product))
        .route("/delete_from_shopcart2/{id}", get(cart::remove_from_cart))
        .route("/buy", get(cart::buy))
}

/// Create the listing routes router.
///
/// Only the photo upload accepts bodies up to `max_upload_bytes`.
pub fn product_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/product/{id}", get(products::show))
        .route(
            "/add_product",
            get(products::add_page)
                .post(products::add)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/edit/{id}", get(products::edit_page).post(products::edit))
        .route("/delete/{id}", get(products::delete).post(products::delete))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(api::products))
        .route("/product/{id}", get(api::product))
        .route("/user/{id}", get(api::user))
}

/// Create all routes for the storefront.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .route("/profile", get(account::profile))
        .route("/user/{id}", get(users::show))
        .route("/search", get(search::form_page).post(search::submit))
        .route("/search/{text}", get(search::results))
        .merge(auth_routes())
        .merge(cart_routes())
        .merge(product_routes(max_upload_bytes))
        .nest("/api", api_routes())
}
