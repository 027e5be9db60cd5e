//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::products::ProductRepository;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, Product};
use crate::state::AppState;

/// Catalogue page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub current_user: Option<CurrentUser>,
    pub products: Vec<Product>,
}

/// Show every product for sale.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool()).list_all().await?;

    Ok(IndexTemplate {
        current_user,
        products,
    })
}
