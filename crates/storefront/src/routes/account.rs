//! Profile page of the logged-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Product, User};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<CurrentUser>,
    pub user: User,
    pub products: Vec<Product>,
    /// Sales since the last visit; shown once.
    pub notifications: Vec<String>,
}

/// Show the user's listings and deliver their pending notifications.
#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<impl IntoResponse> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_owned()))?;

    let products = ProductRepository::new(state.pool())
        .list_by_owner(user.id)
        .await?;
    let notifications = users.take_notifications(user.id).await?;
    if !notifications.is_empty() {
        tracing::debug!(count = notifications.len(), "notifications delivered");
    }

    Ok(ProfileTemplate {
        current_user: Some(current),
        user,
        products,
        notifications,
    })
}
