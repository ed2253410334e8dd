/// Repository module
///
/// The data access layer. [`SqliteStore`] implements
/// [`Store`](crate::resource::Store) for every resource kind; sessions and
/// user lookups used by authentication are plain functions over the pool.

mod resource_repo;
mod session_repo;
mod user_repo;

pub use session_repo::*;
pub use user_repo::*;

use crate::db::DbPool;
use std::sync::Arc;

/// SQLite-backed storage for all resource kinds
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<DbPool>,
}

impl SqliteStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<DbPool> {
        &self.pool
    }
}
