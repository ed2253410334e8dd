use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use tracing::info;

use super::session::session_tokens;
use super::{verify_password, CurrentPrincipal, Principal, SESSION_COOKIE};
use crate::context::AppContext;
use crate::dto::LoginDto;
use crate::errors::ApiError;
use crate::models::User;
use crate::repo;

/// Body returned by a successful login
#[derive(Serialize, Debug)]
pub struct LoginResponse {
    /// Session token, also set as a cookie. Send it as `Authorization: Bearer <token>`
    /// from clients that do not keep cookies.
    pub token: String,
    pub user: User,
}

/// Builds the `/auth` route group
///
/// - `POST /auth/login` → `login_handler`
/// - `POST /auth/logout` → `logout_handler`
/// - `GET /auth/me` → `me_handler`
pub fn auth_router(context: AppContext) -> Router {
    Router::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .with_state(context)
}

/// Handler for logging in with a username and password
///
/// Starts a new session and sets the session cookie.
pub async fn login_handler(
    State(context): State<AppContext>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginDto>, ApiError>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let user = repo::find_user_by_username(&context.pool, &payload.username)?
        .filter(|user| verify_password(&payload.password, &user.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;

    let session = repo::create_session(&context.pool, user.id, context.session_ttl)?;
    info!(user = %user.username, "user logged in");

    let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token: session.token,
            user,
        }),
    ))
}

/// Handler for ending the caller's session
///
/// Always answers 204, whether or not a session was active.
pub async fn logout_handler(
    State(context): State<AppContext>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), ApiError> {
    for token in session_tokens(&headers) {
        repo::delete_session(&context.pool, &token)?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((StatusCode::NO_CONTENT, jar))
}

/// Handler for describing the current caller
pub async fn me_handler(
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Principal>, ApiError> {
    principal
        .map(Json)
        .ok_or_else(|| ApiError::Unauthorized("login required".to_string()))
}
