use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::auth::generate_token;
use crate::db::DbPool;
use crate::models::{Session, User};
use crate::schema::{sessions, users};

/// Starts a session for a user
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - The user the session belongs to
/// * `ttl` - How long the session stays valid
///
/// ### Returns
///
/// The stored session, including its freshly generated token
#[instrument(skip(pool))]
pub fn create_session(pool: &DbPool, user_id: i32, ttl: Duration) -> Result<Session> {
    let conn = &mut pool.get()?;

    let now = Utc::now().naive_utc();
    let session = Session {
        token: generate_token(),
        user_id,
        created_at: now,
        expires_at: now + ttl,
    };

    diesel::insert_into(sessions::table)
        .values(&session)
        .execute(conn)
        .context("failed to create session")?;

    info!("Created session expiring at {}", session.expires_at);
    Ok(session)
}

/// Looks up an unexpired session and its user by token
///
/// ### Returns
///
/// `None` when the token is unknown or the session has expired
#[instrument(skip_all)]
pub fn find_active_session(pool: &DbPool, token: &str) -> Result<Option<(Session, User)>> {
    let conn = &mut pool.get()?;

    let found = sessions::table
        .inner_join(users::table)
        .filter(sessions::token.eq(token))
        .select((Session::as_select(), User::as_select()))
        .first::<(Session, User)>(conn)
        .optional()
        .context("failed to look up session")?;

    match found {
        Some((session, _)) if session.is_expired() => {
            debug!("Session expired");
            Ok(None)
        }
        other => Ok(other),
    }
}

/// Deletes a session by token; unknown tokens are ignored
#[instrument(skip_all)]
pub fn delete_session(pool: &DbPool, token: &str) -> Result<()> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(sessions::table.filter(sessions::token.eq(token)))
        .execute(conn)
        .context("failed to delete session")?;

    debug!("Deleted {} session(s)", deleted);
    Ok(())
}

/// Removes every expired session
///
/// ### Returns
///
/// The number of sessions removed
#[instrument(skip(pool))]
pub fn purge_expired_sessions(pool: &DbPool) -> Result<usize> {
    let conn = &mut pool.get()?;

    let purged = diesel::delete(sessions::table.filter(sessions::expires_at.le(Utc::now().naive_utc())))
        .execute(conn)
        .context("failed to purge expired sessions")?;

    info!("Purged {} expired sessions", purged);
    Ok(purged)
}
