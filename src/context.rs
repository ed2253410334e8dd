use axum::extract::FromRef;
use chrono::Duration;
use std::sync::Arc;

use crate::auth::{SessionAuthenticator, SharedAuthenticator};
use crate::config::Config;
use crate::db::DbPool;

/// Everything the routers need, built once at startup
///
/// Tests build as many independent contexts as they like; nothing here is
/// global.
#[derive(Clone)]
pub struct AppContext {
    pub pool: Arc<DbPool>,
    pub authenticator: SharedAuthenticator,
    /// Prefix for list links. `None` derives it from the request's `Host` header.
    pub base_url: Option<String>,
    pub session_ttl: Duration,
}

impl AppContext {
    /// Creates a context backed by session authentication on `pool`
    pub fn new(pool: Arc<DbPool>, config: &Config) -> Self {
        let authenticator: SharedAuthenticator = Arc::new(SessionAuthenticator::new(pool.clone()));
        Self {
            pool,
            authenticator,
            base_url: config.base_url.clone(),
            session_ttl: config.session_ttl(),
        }
    }

    /// Replaces the authenticator, keeping everything else
    pub fn with_authenticator(mut self, authenticator: SharedAuthenticator) -> Self {
        self.authenticator = authenticator;
        self
    }
}

impl FromRef<AppContext> for SharedAuthenticator {
    fn from_ref(context: &AppContext) -> Self {
        Arc::clone(&context.authenticator)
    }
}
