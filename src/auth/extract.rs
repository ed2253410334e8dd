use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::debug;

use super::{Principal, SharedAuthenticator, ADMIN_ROLE};
use crate::errors::ApiError;

/// The caller of the current request, if any
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Option<Principal>);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    SharedAuthenticator: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = SharedAuthenticator::from_ref(state);
        let principal = authenticator.authenticate(parts)?;
        Ok(CurrentPrincipal(principal))
    }
}

/// A caller holding the admin role
///
/// Rejects with 403 for anonymous callers and for principals without the role.
#[derive(Debug, Clone)]
pub struct Admin(pub Principal);

impl<S> FromRequestParts<S> for Admin
where
    SharedAuthenticator: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentPrincipal(principal) = CurrentPrincipal::from_request_parts(parts, state).await?;
        match principal {
            Some(principal) if principal.has_role(ADMIN_ROLE) => Ok(Admin(principal)),
            Some(principal) => {
                debug!(user = %principal.username, path = %parts.uri.path(), "admin role missing");
                Err(ApiError::Forbidden)
            }
            None => {
                debug!(path = %parts.uri.path(), "anonymous caller on admin route");
                Err(ApiError::Forbidden)
            }
        }
    }
}
