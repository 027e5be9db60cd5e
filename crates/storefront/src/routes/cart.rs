//! Shopping cart handlers.
//!
//! The cart changes are plain GET links on the product and cart pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use rust_decimal::Decimal;
use tracing::instrument;

use bazaar_core::ProductId;

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Product};
use crate::services::cart::CartService;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub current_user: Option<CurrentUser>,
    pub products: Vec<Product>,
    pub total: Decimal,
}

/// The products in the cart and their total.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let cart = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_owned()))?
        .cart;

    let contents = CartService::new(state.pool(), state.photos())
        .contents(&cart)
        .await?;

    Ok(CartTemplate {
        current_user: Some(user),
        products: contents.products,
        total: contents.total,
    })
}

#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    CartService::new(state.pool(), state.photos())
        .add(user.id, id)
        .await?;

    Ok(Redirect::to(&format!("/product/{id}")))
}

/// Remove from the cart, back to the product page.
pub async fn remove_from_product(
    State(state): State<AppState>,
    user: RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    remove(&state, &user, id).await?;
    Ok(Redirect::to(&format!("/product/{id}")))
}

/// Remove from the cart, back to the cart page.
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    remove(&state, &user, id).await?;
    Ok(Redirect::to("/shopcart"))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
async fn remove(state: &AppState, user: &RequireAuth, id: ProductId) -> Result<()> {
    CartService::new(state.pool(), state.photos())
        .remove(user.0.id, id)
        .await?;
    Ok(())
}

/// Buy everything in the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn buy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Redirect> {
    CartService::new(state.pool(), state.photos())
        .checkout(user.id)
        .await?;

    Ok(Redirect::to("/"))
}
