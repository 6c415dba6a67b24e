use actix_web::{HttpResponse, web};
use sqlx::PgPool;
use validator::Validate;

use auth_services::middleware::PageContext;
use auth_services::service::AuthService;
use auth_services::session::{FlashKind, SessionStore};
use auth_services::types::{AuthError, LoginForm, RegisterForm};

use crate::error::PageError;
use crate::views::{self, base_context, redirect};

/// Renders the registration form.
pub async fn register_form(
    sessions: web::Data<dyn SessionStore>,
    ctx: PageContext,
) -> Result<HttpResponse, PageError> {
    let flash = sessions.take_flash(&ctx.session_id).await?;
    views::page("users/register", &base_context(&flash, ctx.user_id.is_some()))
}

/// Handles registration: creates the account, logs the new user into the
/// session, and redirects to the campgrounds index. Validation problems and
/// taken usernames flash an error and return to the form.
pub async fn register(
    pool: web::Data<PgPool>,
    form: web::Form<RegisterForm>,
    sessions: web::Data<dyn SessionStore>,
    ctx: PageContext,
) -> Result<HttpResponse, PageError> {
    if let Err(e) = form.validate() {
        sessions
            .push_flash(
                &ctx.session_id,
                FlashKind::Error,
                &format!("Validation error: {}", e),
            )
            .await?;
        return Ok(redirect("/register"));
    }

    let auth_service = AuthService::new(pool.get_ref().clone());

    match auth_service.create_user(&form.username, &form.password).await {
        Ok(user) => {
            sessions.set_user(&ctx.session_id, Some(user.id)).await?;
            sessions
                .push_flash(&ctx.session_id, FlashKind::Success, "Welcome to Trailside!")
                .await?;
            Ok(redirect("/campgrounds"))
        }
        Err(AuthError::UsernameTaken) => {
            sessions
                .push_flash(&ctx.session_id, FlashKind::Error, "Username already taken")
                .await?;
            Ok(redirect("/register"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Renders the login form.
pub async fn login_form(
    sessions: web::Data<dyn SessionStore>,
    ctx: PageContext,
) -> Result<HttpResponse, PageError> {
    let flash = sessions.take_flash(&ctx.session_id).await?;
    views::page("users/login", &base_context(&flash, ctx.user_id.is_some()))
}

/// Handles login: verifies credentials and binds the user to the session.
/// Bad credentials flash an error and return to the form.
pub async fn login(
    pool: web::Data<PgPool>,
    form: web::Form<LoginForm>,
    sessions: web::Data<dyn SessionStore>,
    ctx: PageContext,
) -> Result<HttpResponse, PageError> {
    if let Err(e) = form.validate() {
        sessions
            .push_flash(
                &ctx.session_id,
                FlashKind::Error,
                &format!("Validation error: {}", e),
            )
            .await?;
        return Ok(redirect("/login"));
    }

    let auth_service = AuthService::new(pool.get_ref().clone());

    match auth_service
        .verify_password(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            sessions.set_user(&ctx.session_id, Some(user.id)).await?;
            sessions
                .push_flash(&ctx.session_id, FlashKind::Success, "Welcome back!")
                .await?;
            Ok(redirect("/campgrounds"))
        }
        Err(AuthError::InvalidCredentials) => {
            sessions
                .push_flash(&ctx.session_id, FlashKind::Error, "Invalid username or password")
                .await?;
            Ok(redirect("/login"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Logs the current user out of the session.
pub async fn logout(
    sessions: web::Data<dyn SessionStore>,
    ctx: PageContext,
) -> Result<HttpResponse, PageError> {
    sessions.set_user(&ctx.session_id, None).await?;
    sessions
        .push_flash(&ctx.session_id, FlashKind::Success, "Goodbye!")
        .await?;
    Ok(redirect("/campgrounds"))
}
