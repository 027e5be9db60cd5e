//! Unified error handling with Sentry integration.
//!
//! Handlers return [`Result<T>`]. Server-side failures are captured to Sentry
//! and logged before a generic page is sent; client errors render their
//! message. JSON endpoints wrap the same error in [`ApiError`].

use askama::Template;
use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::CurrentUser;
use crate::services::ServiceError;
use crate::services::auth::AuthError;
use crate::services::photos::PhotoError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Photo storage failed.
    #[error("Photo error: {0}")]
    Photo(#[from] PhotoError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user may not touch this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound => Self::NotFound("product".to_owned()),
            ServiceError::Forbidden => Self::Forbidden(e.to_string()),
            ServiceError::OwnProduct | ServiceError::Cart(_) | ServiceError::Invalid(_) => {
                Self::BadRequest(e.to_string())
            }
            ServiceError::Photo(e) if e.is_user_error() => Self::BadRequest(e.to_string()),
            ServiceError::Photo(e) => Self::Photo(e),
            ServiceError::Repository(e) => Self::Database(e),
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Photo(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(err) if err.is_user_error() => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Not found".to_owned(),
            Self::Forbidden(_) => "You are not allowed to do that".to_owned(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Auth(err) if err.is_user_error() => err.to_string(),
            _ => "Internal server error".to_owned(),
        }
    }

    /// Report server errors to Sentry and the log.
    fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
    }
}

/// Page rendered for failed HTML requests.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    current_user: Option<CurrentUser>,
    status: u16,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();

        let status = self.status();
        let page = ErrorTemplate {
            current_user: None,
            status: status.as_u16(),
            message: self.public_message(),
        };

        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (status, page.message).into_response()
            }
        }
    }
}

/// JSON flavour of [`AppError`], rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.report();
        let body = json!({ "error": self.0.public_message() });
        (self.0.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after login.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use bazaar_core::{CartError, ProductId};

    use super::*;

    fn status_of(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status_of(AppError::NotFound("x".to_owned())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ServiceError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_of(ServiceError::OwnProduct), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ServiceError::Cart(CartError::AlreadyInCart(ProductId::new(1)))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(RepositoryError::DataCorruption("bad".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(AuthError::PasswordMismatch), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AuthError::PasswordHash), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption("secret row".to_owned()));
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::from(ServiceError::Cart(CartError::NotInCart(ProductId::new(4))));
        assert_eq!(err.public_message(), "product 4 is not in the cart");
    }

    #[test]
    fn test_api_error_status() {
        let response = ApiError::from(AppError::NotFound("user".to_owned())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
