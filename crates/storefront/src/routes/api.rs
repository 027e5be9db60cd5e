//! Read-only JSON API.
//!
//! ```text
//! GET /api/products      {"products": [ProductSummary]}
//! GET /api/product/{id}  {"product": ProductDetail}
//! GET /api/user/{id}     {"user": UserDetail}
//! ```
//!
//! Prices are decimal strings (`"12.50"`). Errors are `{"error": "..."}`.

use axum::{
    Json,
    extract::{FromRequestParts, Path, State, rejection::PathRejection},
};
use serde::Serialize;
use tracing::instrument;

use bazaar_core::{Price, ProductId, UserId, Username};

use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::{ApiError, AppError};
use crate::models::Product;
use crate::state::AppState;

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// `Path` whose rejection (e.g. a non-numeric id) is a JSON error.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(AppError::BadRequest(rejection.body_text()))
    }
}

/// Product fields in listings.
#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub user_id: UserId,
}

impl From<&Product> for ProductSummary {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            price: p.price,
            user_id: p.owner_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub summary: ProductSummary,
    pub photo: String,
}

/// Public user fields. Contact and account data are never exposed.
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub id: UserId,
    pub username: Username,
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: ProductDetail,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserDetail,
}

#[instrument(skip_all)]
pub async fn products(State(state): State<AppState>) -> ApiResult<ProductsResponse> {
    let products = ProductRepository::new(state.pool()).list_all().await?;

    Ok(Json(ProductsResponse {
        products: products.iter().map(ProductSummary::from).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> ApiResult<ProductResponse> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ProductResponse {
        product: ProductDetail {
            summary: ProductSummary::from(&product),
            photo: product.photo,
        },
    }))
}

#[instrument(skip(state))]
pub async fn user(State(state): State<AppState>, ApiPath(id): ApiPath<UserId>) -> ApiResult<UserResponse> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    let products = ProductRepository::new(state.pool())
        .list_by_owner(id)
        .await?;

    Ok(Json(UserResponse {
        user: UserDetail {
            id: user.id,
            username: user.username,
            products: products.iter().map(ProductSummary::from).collect(),
        },
    }))
}
