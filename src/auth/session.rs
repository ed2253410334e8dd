use axum::http::{header, request::Parts, HeaderMap};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::debug;

use super::{Authenticator, Principal};
use crate::db::DbPool;
use crate::repo;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "remindr_session";

/// Resolves principals from session rows in the database
///
/// Tokens are taken from the session cookie and from an
/// `Authorization: Bearer` header. The cookie is tried first; when it does
/// not name an active session the bearer token is tried next. Unknown and
/// expired tokens resolve to an anonymous caller.
pub struct SessionAuthenticator {
    pool: Arc<DbPool>,
}

impl SessionAuthenticator {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl Authenticator for SessionAuthenticator {
    fn authenticate(&self, parts: &Parts) -> anyhow::Result<Option<Principal>> {
        for token in session_tokens(&parts.headers) {
            if let Some((_, user)) = repo::find_active_session(&self.pool, &token)? {
                return Ok(Some(Principal::new(user.id, user.username.clone(), user.role_list())));
            }
            debug!("session token did not match an active session");
        }
        Ok(None)
    }
}

/// Extracts candidate session tokens from request headers
///
/// The cookie token comes first, then the bearer token. Duplicates and empty
/// values are dropped.
pub fn session_tokens(headers: &HeaderMap) -> Vec<String> {
    let cookie = CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty());

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    let mut tokens: Vec<String> = cookie.into_iter().collect();
    if let Some(bearer) = bearer {
        if !tokens.contains(&bearer) {
            tokens.push(bearer);
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::CreateUserDto;
    use crate::repo::SqliteStore;
    use crate::resource::Store;
    use crate::test_utils::setup_test_db;
    use axum::http::{HeaderValue, Request};
    use chrono::Duration;

    fn parts_with(name: header::HeaderName, value: &str) -> Parts {
        let (parts, _) = Request::builder()
            .uri("/reminders")
            .header(name, HeaderValue::from_str(value).unwrap())
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    fn create_user(pool: &Arc<DbPool>, username: &str, roles: Vec<String>) -> crate::models::User {
        let store = SqliteStore::new(pool.clone());
        Store::<crate::models::User>::create(&store, CreateUserDto {
            username: username.to_string(),
            password: "secret".to_string(),
            roles,
        })
        .unwrap()
    }

    #[test]
    fn test_session_tokens_from_cookie() {
        let parts = parts_with(header::COOKIE, "remindr_session=abc123; theme=dark");
        assert_eq!(session_tokens(&parts.headers), vec!["abc123".to_string()]);
    }

    #[test]
    fn test_session_tokens_from_bearer_header() {
        let parts = parts_with(header::AUTHORIZATION, "Bearer xyz789");
        assert_eq!(session_tokens(&parts.headers), vec!["xyz789".to_string()]);
    }

    #[test]
    fn test_session_tokens_missing() {
        let parts = parts_with(header::AUTHORIZATION, "Basic dXNlcjpwYXNz");
        assert!(session_tokens(&parts.headers).is_empty());
    }

    #[test]
    fn test_session_tokens_cookie_before_bearer() {
        let (parts, _) = Request::builder()
            .header(header::COOKIE, "remindr_session=from-cookie")
            .header(header::AUTHORIZATION, "Bearer from-header")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(
            session_tokens(&parts.headers),
            vec!["from-cookie".to_string(), "from-header".to_string()]
        );
    }

    #[test]
    fn test_stale_cookie_falls_back_to_bearer() {
        let pool = setup_test_db();
        let user = create_user(&pool, "ada", vec!["admin".to_string()]);
        let session = repo::create_session(&pool, user.id, Duration::minutes(5)).unwrap();

        let (parts, _) = Request::builder()
            .header(header::COOKIE, format!("{}=logged-out-long-ago", SESSION_COOKIE))
            .header(header::AUTHORIZATION, format!("Bearer {}", session.token))
            .body(())
            .unwrap()
            .into_parts();
        let principal = SessionAuthenticator::new(pool).authenticate(&parts).unwrap().unwrap();

        assert_eq!(principal.user_id, user.id);
        assert!(principal.has_role("admin"));
    }

    #[test]
    fn test_authenticate_resolves_user_roles() {
        let pool = setup_test_db();
        let store = SqliteStore::new(pool.clone());
        let user = Store::<crate::models::User>::create(&store, CreateUserDto {
            username: "ada".to_string(),
            password: "secret".to_string(),
            roles: vec!["admin".to_string()],
        })
        .unwrap();
        let session = repo::create_session(&pool, user.id, Duration::minutes(5)).unwrap();

        let authenticator = SessionAuthenticator::new(pool);
        let parts = parts_with(header::AUTHORIZATION, &format!("Bearer {}", session.token));
        let principal = authenticator.authenticate(&parts).unwrap().unwrap();

        assert_eq!(principal.user_id, user.id);
        assert_eq!(principal.username, "ada");
        assert!(principal.has_role("admin"));
    }

    #[test]
    fn test_authenticate_ignores_expired_session() {
        let pool = setup_test_db();
        let store = SqliteStore::new(pool.clone());
        let user = Store::<crate::models::User>::create(&store, CreateUserDto {
            username: "ada".to_string(),
            password: "secret".to_string(),
            roles: vec![],
        })
        .unwrap();
        let session = repo::create_session(&pool, user.id, Duration::minutes(-1)).unwrap();

        let authenticator = SessionAuthenticator::new(pool);
        let parts = parts_with(header::COOKIE, &format!("{}={}", SESSION_COOKIE, session.token));

        assert!(authenticator.authenticate(&parts).unwrap().is_none());
    }

    #[test]
    fn test_authenticate_unknown_token() {
        let pool = setup_test_db();
        let authenticator = SessionAuthenticator::new(pool);
        let parts = parts_with(header::AUTHORIZATION, "Bearer not-a-session");
        assert!(authenticator.authenticate(&parts).unwrap().is_none());
    }
}
