//! Public user pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use bazaar_core::UserId;

use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, Product, User};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "users/show.html")]
pub struct UserTemplate {
    pub current_user: Option<CurrentUser>,
    pub user: User,
    pub products: Vec<Product>,
}

/// A seller and what they have for sale.
#[instrument(skip(state, current_user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<UserId>,
) -> Result<impl IntoResponse> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    let products = ProductRepository::new(state.pool())
        .list_by_owner(id)
        .await?;

    Ok(UserTemplate {
        current_user,
        user,
        products,
    })
}
