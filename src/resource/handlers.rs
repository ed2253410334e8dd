use axum::{
    extract::{FromRef, OriginalUri, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{Linked, Loaded, Resource, Store};
use crate::auth::{Admin, SharedAuthenticator};
use crate::errors::ApiError;

/// Router state shared by the handlers of one mounted resource kind
pub struct ResourceState<S> {
    store: Arc<S>,
    authenticator: SharedAuthenticator,
    base_url: Option<String>,
}

impl<S> ResourceState<S> {
    /// ### Arguments
    ///
    /// * `store` - Storage backing the resource kinds mounted with this state
    /// * `authenticator` - Resolves the caller for the admin gate
    /// * `base_url` - Prefix for list links; when `None`, the request's `Host` header is used
    pub fn new(store: Arc<S>, authenticator: SharedAuthenticator, base_url: Option<String>) -> Self {
        Self {
            store,
            authenticator,
            base_url,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Base URL for links built while answering a request with these headers
    fn base_url_for(&self, headers: &HeaderMap) -> String {
        if let Some(base_url) = &self.base_url {
            return base_url.clone();
        }
        headers
            .get(header::HOST)
            .and_then(|host| host.to_str().ok())
            .map(|host| format!("http://{host}"))
            .unwrap_or_default()
    }
}

impl<S> Clone for ResourceState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            authenticator: Arc::clone(&self.authenticator),
            base_url: self.base_url.clone(),
        }
    }
}

impl<S> FromRef<ResourceState<S>> for SharedAuthenticator {
    fn from_ref(state: &ResourceState<S>) -> Self {
        Arc::clone(&state.authenticator)
    }
}

/// Builds the CRUD routes for one resource kind
///
/// Mount the result with `Router::nest("/<kind>", ..)`:
///
/// - `GET /` lists every record, each with `links.self`
/// - `POST /` creates a record (admin)
/// - `GET /{id}` returns one record
/// - `PUT /{id}` merges the body into the record (admin)
/// - `DELETE /{id}` removes the record (admin)
pub fn resource_router<R, S>(state: ResourceState<S>) -> Router
where
    R: Resource,
    S: Store<R>,
{
    Router::new()
        .route("/", get(list_handler::<R, S>).post(create_handler::<R, S>))
        .route(
            "/{id}",
            get(read_handler::<R, S>)
                .put(update_handler::<R, S>)
                .delete(delete_handler::<R, S>),
        )
        .with_state(state)
}

/// Handler for listing every record of a kind
///
/// Each entry carries `links.self`, built from the base URL and the path the
/// request arrived on.
#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn list_handler<R, S>(
    State(state): State<ResourceState<S>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Json<Vec<Linked<R>>>, ApiError>
where
    R: Resource,
    S: Store<R>,
{
    let records = state.store.find_all()?;

    let base_url = state.base_url_for(&headers);
    let path = uri.path().trim_end_matches('/');
    let linked = records
        .into_iter()
        .map(|record| Linked::new(record, &base_url, path))
        .collect::<Vec<_>>();

    debug!("Listing {} records", linked.len());
    Ok(Json(linked))
}

/// Handler for creating a record
///
/// The admin check runs before the body is parsed, so a forbidden caller
/// never reaches storage.
#[instrument(skip_all, fields(resource = R::NAME, user = %admin.username))]
pub async fn create_handler<R, S>(
    Admin(admin): Admin,
    State(state): State<ResourceState<S>>,
    WithRejection(Json(fields), _): WithRejection<Json<R::Create>, ApiError>,
) -> Result<(StatusCode, Json<R>), ApiError>
where
    R: Resource,
    S: Store<R>,
{
    let record = state.store.create(fields)?;
    info!("Created record with id: {}", record.id());
    Ok((StatusCode::CREATED, Json(record)))
}

/// Handler for reading a single record
#[instrument(skip_all, fields(resource = R::NAME, id = record.id()))]
pub async fn read_handler<R, S>(
    Loaded(record): Loaded<R>,
) -> Result<Json<R>, ApiError>
where
    R: Resource,
    S: Store<R>,
{
    Ok(Json(record))
}

/// Handler for merging the request body into an existing record
#[instrument(skip_all, fields(resource = R::NAME, id = record.id(), user = %admin.username))]
pub async fn update_handler<R, S>(
    Admin(admin): Admin,
    State(state): State<ResourceState<S>>,
    Loaded(record): Loaded<R>,
    WithRejection(Json(changes), _): WithRejection<Json<R::Update>, ApiError>,
) -> Result<Json<R>, ApiError>
where
    R: Resource,
    S: Store<R>,
{
    let updated = state.store.update(record, changes)?;
    info!("Updated record");
    Ok(Json(updated))
}

/// Handler for permanently deleting a record
#[instrument(skip_all, fields(resource = R::NAME, id = record.id(), user = %admin.username))]
pub async fn delete_handler<R, S>(
    Admin(admin): Admin,
    State(state): State<ResourceState<S>>,
    Loaded(record): Loaded<R>,
) -> Result<StatusCode, ApiError>
where
    R: Resource,
    S: Store<R>,
{
    state.store.destroy(record)?;
    info!("Deleted record");
    Ok(StatusCode::NO_CONTENT)
}
