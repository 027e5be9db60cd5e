//! Search form and results.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, Product, User};
use crate::services::search::search;
use crate::state::AppState;

/// Search form data.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub search: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "search/form.html")]
pub struct SearchFormTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "search/results.html")]
pub struct SearchResultsTemplate {
    pub current_user: Option<CurrentUser>,
    pub query: String,
    pub users: Vec<User>,
    pub products: Vec<Product>,
}

pub async fn form_page(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    SearchFormTemplate {
        current_user,
        error: None,
    }
}

/// Send the query to its results page.
pub async fn submit(
    OptionalAuth(current_user): OptionalAuth,
    Form(form): Form<SearchForm>,
) -> Response {
    let query = form.search.trim();
    if query.is_empty() {
        return SearchFormTemplate {
            current_user,
            error: Some("Enter something to search for".to_owned()),
        }
        .into_response();
    }

    Redirect::to(&format!("/search/{}", urlencoding::encode(query))).into_response()
}

#[instrument(skip(state, current_user))]
pub async fn results(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(query): Path<String>,
) -> Result<impl IntoResponse> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    let products = ProductRepository::new(state.pool()).list_all().await?;
    let found = search(&query, users, products);

    tracing::debug!(
        users = found.users.len(),
        products = found.products.len(),
        "search completed"
    );

    Ok(SearchResultsTemplate {
        current_user,
        query,
        users: found.users,
        products: found.products,
    })
}
