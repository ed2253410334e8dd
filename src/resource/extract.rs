use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use tracing::debug;

use super::{Resource, ResourceState, Store};
use crate::errors::ApiError;

/// A record resolved from the `{id}` path segment
///
/// Extracting this runs the lookup; when no record matches, the request ends
/// with 404 and the handler is never called. Ids that do not parse as
/// integers cannot exist, so they are reported as not found as well.
#[derive(Debug)]
pub struct Loaded<R>(pub R);

impl<R, S> FromRequestParts<ResourceState<S>> for Loaded<R>
where
    R: Resource,
    S: Store<R>,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ResourceState<S>,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound)?;

        let id: i32 = raw_id.parse().map_err(|_| {
            debug!(resource = R::NAME, id = %raw_id, "non-numeric id");
            ApiError::NotFound
        })?;

        match state.store().find_by_id(id)? {
            Some(record) => Ok(Loaded(record)),
            None => Err(ApiError::NotFound),
        }
    }
}
