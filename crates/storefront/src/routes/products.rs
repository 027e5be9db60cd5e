//! Product page and listing management handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, State, multipart::MultipartError},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::ProductId;

use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, Product, User};
use crate::services::ServiceError;
use crate::services::listings::{ListingDetails, ListingService, PhotoUpload};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub current_user: Option<CurrentUser>,
    pub product: Product,
    pub seller: User,
    pub is_owner: bool,
    pub in_cart: bool,
}

/// Add and edit form. `product_id` is set when editing.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub current_user: Option<CurrentUser>,
    pub product_id: Option<ProductId>,
    pub error: Option<String>,
    pub name: String,
    pub price: String,
}

impl ProductFormTemplate {
    fn blank(current_user: CurrentUser) -> Self {
        Self {
            current_user: Some(current_user),
            product_id: None,
            error: None,
            name: String::new(),
            price: String::new(),
        }
    }
}

/// Edit form data.
#[derive(Debug, Deserialize)]
pub struct EditProductForm {
    pub name: String,
    pub price: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Product page with its seller and the visitor's cart state.
#[instrument(skip(state, current_user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let users = UserRepository::new(state.pool());
    let seller = users
        .get_by_id(product.owner_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("product {id} has no seller")))?;

    let (is_owner, in_cart) = match &current_user {
        Some(current) => {
            let in_cart = users
                .get_by_id(current.id)
                .await?
                .is_some_and(|u| u.cart.contains(id));
            (product.is_owned_by(current.id), in_cart)
        }
        None => (false, false),
    };

    Ok(ProductTemplate {
        current_user,
        product,
        seller,
        is_owner,
        in_cart,
    })
}

pub async fn add_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    ProductFormTemplate::blank(user)
}

/// Create a listing from the multipart form (`name`, `price`, `photo`).
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut name = String::new();
    let mut price = String::new();
    let mut photo: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(bad_multipart)?
    {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("name") => name = field.text().await.map_err(bad_multipart)?,
            Some("price") => price = field.text().await.map_err(bad_multipart)?,
            Some("photo") => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                photo = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let form_error = |message: String, name: String, price: String| {
        ProductFormTemplate {
            error: Some(message),
            name,
            price,
            ..ProductFormTemplate::blank(user.clone())
        }
        .into_response()
    };

    let details = match ListingDetails::parse(&name, &price) {
        Ok(details) => details,
        Err(e) => return Ok(form_error(e.to_string(), name, price)),
    };

    let Some((file_name, bytes)) = photo.filter(|(file_name, _)| !file_name.is_empty()) else {
        return Ok(form_error("A photo is required".to_owned(), name, price));
    };

    let upload = PhotoUpload {
        file_name: &file_name,
        bytes: &bytes,
    };
    match ListingService::new(state.pool(), state.photos())
        .create(user.id, details, upload)
        .await
    {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(e) if e.is_user_error() => Ok(form_error(e.to_string(), name, price)),
        Err(e) => Err(e.into()),
    }
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::BadRequest(e.body_text())
}

/// Edit form prefilled with the product's current values.
#[instrument(skip(state, user))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ListingService::new(state.pool(), state.photos())
        .owned(id, user.id)
        .await?;

    Ok(ProductFormTemplate {
        product_id: Some(id),
        name: product.name,
        price: product.price.to_string(),
        ..ProductFormTemplate::blank(user)
    })
}

#[instrument(skip(state, user, form))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<EditProductForm>,
) -> Result<Response> {
    let listings = ListingService::new(state.pool(), state.photos());

    let result = match ListingDetails::parse(&form.name, &form.price) {
        Ok(details) => listings.update(id, user.id, details).await,
        // Ownership is checked before a validation message is shown.
        Err(e) => listings.owned(id, user.id).await.and(Err(e)),
    };

    match result {
        Ok(_) => Ok(Redirect::to("/profile").into_response()),
        Err(e @ ServiceError::Invalid(_)) => Ok(ProductFormTemplate {
            product_id: Some(id),
            error: Some(e.to_string()),
            name: form.name,
            price: form.price,
            ..ProductFormTemplate::blank(user)
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Withdraw a listing and delete its photo.
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    ListingService::new(state.pool(), state.photos())
        .delete(id, user.id)
        .await?;

    Ok(Redirect::to("/profile"))
}
