/// remindr: an administrative REST backend
///
/// This library provides the data models, storage, authentication and web API
/// for managing reminders and the records around them.
///
/// ### Modules
///
/// - `resource`: The generic CRUD contract shared by every resource kind
/// - `auth`: Principals, session authentication and role checks
/// - `repo`: SQLite storage for resources, users and sessions
/// - `models` / `dto`: Table rows and request bodies
/// - `config`, `logging`, `seed`: Startup concerns
///
/// ### Web API
///
/// Each resource kind (`reminders`, `categories`, `timeframes`, `tests`,
/// `users`) is mounted at `/<kind>`:
///
/// - `GET /<kind>`: List records, each with `links.self`
/// - `POST /<kind>`: Create a record (admin)
/// - `GET /<kind>/{id}`: Get a record
/// - `PUT /<kind>/{id}`: Merge fields into a record (admin)
/// - `DELETE /<kind>/{id}`: Delete a record (admin)
///
/// Sessions are managed under `/auth` (`login`, `logout`, `me`). Any other
/// path, including `/<kind>/` with a trailing slash, answers 404.

pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod dto;
pub mod errors;
pub mod logging;
pub mod models;
pub mod repo;
pub mod resource;
pub mod schema;
pub mod seed;

#[cfg(test)]
mod test_utils;

use axum::Router;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use context::AppContext;
use models::{Category, Reminder, Test, Timeframe, User};
use repo::SqliteStore;
use resource::{resource_router, Resource, ResourceState, Store};

/// Embedded SQL migrations from the `migrations` directory
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Creates the application router
///
/// ### Arguments
///
/// * `context` - Pool, authenticator and link settings shared by every route
///
/// ### Returns
///
/// A Router with every resource kind and the `/auth` routes mounted
pub fn create_app(context: AppContext) -> Router {
    let store = std::sync::Arc::new(SqliteStore::new(context.pool.clone()));
    let resources = ResourceState::new(store, context.authenticator.clone(), context.base_url.clone());

    let router = Router::new();
    let router = mount::<Reminder>(router, &resources);
    let router = mount::<Category>(router, &resources);
    let router = mount::<Timeframe>(router, &resources);
    let router = mount::<Test>(router, &resources);
    let router = mount::<User>(router, &resources);

    router
        .nest("/auth", auth::auth_router(context))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Mounts the CRUD routes of one resource kind at `/<kind>`
fn mount<R>(router: Router, resources: &ResourceState<SqliteStore>) -> Router
where
    R: Resource,
    SqliteStore: Store<R>,
{
    router.nest(&format!("/{}", R::NAME), resource_router::<R, SqliteStore>(resources.clone()))
}

/// Answers unmatched paths with the usual JSON error body
async fn not_found_handler() -> errors::ApiError {
    errors::ApiError::NotFound
}

/// Runs the embedded migrations
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("failed to run migrations: {e}"))?;
    Ok(())
}
