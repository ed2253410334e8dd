/// Authentication and role checks
///
/// Handlers never look at cookies or headers themselves. They ask for a
/// [`CurrentPrincipal`] or an [`Admin`], and those extractors defer to the
/// [`Authenticator`] held in the router state.

mod extract;
mod handlers;
mod password;
mod session;

pub use extract::{Admin, CurrentPrincipal};
pub use handlers::*;
pub use password::{generate_token, hash_password, verify_password};
pub use session::{SessionAuthenticator, SESSION_COOKIE};

use axum::http::request::Parts;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Role required for every mutating resource operation
pub const ADMIN_ROLE: &str = "admin";

/// The authenticated actor behind a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: i32,
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, T>(user_id: i32, username: String, roles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            user_id,
            username,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Resolves the principal for an incoming request
///
/// `Ok(None)` means the request is anonymous. Errors are lookup failures, not
/// rejected credentials.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(&self, parts: &Parts) -> anyhow::Result<Option<Principal>>;
}

pub type SharedAuthenticator = Arc<dyn Authenticator>;
