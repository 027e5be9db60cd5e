//! Registration, login, and logout handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    OptionalAuth, RequireAuth, clear_current_user, remember_session, set_current_user,
};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Checkbox; present (as `"on"`) only when ticked.
    pub remember_me: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_again: String,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub email: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub username: String,
    pub email: String,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn login_page(OptionalAuth(current_user): OptionalAuth) -> Response {
    if current_user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        current_user,
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Check the credentials and log in, or show the form again.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let user = match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) if e.is_user_error() => {
            tracing::info!("login failed");
            return Ok(LoginTemplate {
                current_user: None,
                error: Some(e.to_string()),
                email: form.email,
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    start_session(&session, &user).await?;
    if form.remember_me.is_some() {
        remember_session(&session);
    }

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Redirect::to("/").into_response())
}

pub async fn register_page(OptionalAuth(current_user): OptionalAuth) -> impl IntoResponse {
    RegisterTemplate {
        current_user,
        error: None,
        username: String::new(),
        email: String::new(),
    }
}

/// Create an account and log straight into it.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let registration = Registration {
        username: &form.username,
        email: &form.email,
        password: &form.password,
        password_again: &form.password_again,
    };

    let user = match AuthService::new(state.pool()).register(registration).await {
        Ok(user) => user,
        Err(e) if e.is_user_error() => {
            return Ok(RegisterTemplate {
                current_user: None,
                error: Some(e.to_string()),
                username: form.username,
                email: form.email,
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    start_session(&session, &user).await?;
    remember_session(&session);

    Ok(Redirect::to("/").into_response())
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(RequireAuth(user): RequireAuth, session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    tracing::info!("user logged out");
    Ok(Redirect::to("/"))
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));
    Ok(())
}
