use anyhow::{Context, Result};
use chrono::Utc;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::SqliteStore;
use crate::auth::hash_password;
use crate::db::DbPool;
use crate::dto::{CreateUserDto, UpdateUserDto};
use crate::models::{join_roles, User};
use crate::resource::Store;
use crate::schema::users;

/// Row inserted for a new user, with the password already hashed
#[derive(Insertable)]
#[diesel(table_name = users)]
struct NewUser {
    username: String,
    password_hash: String,
    roles: String,
}

/// Column changes for a user update; `None` leaves a column untouched
#[derive(AsChangeset)]
#[diesel(table_name = users)]
struct UserChangeset {
    username: Option<String>,
    password_hash: Option<String>,
    roles: Option<String>,
}

impl From<CreateUserDto> for NewUser {
    fn from(dto: CreateUserDto) -> Self {
        Self {
            username: dto.username,
            password_hash: hash_password(&dto.password),
            roles: join_roles(&dto.roles),
        }
    }
}

impl From<UpdateUserDto> for UserChangeset {
    fn from(dto: UpdateUserDto) -> Self {
        Self {
            username: dto.username,
            password_hash: dto.password.as_deref().map(hash_password),
            roles: dto.roles.map(join_roles),
        }
    }
}

impl Store<User> for SqliteStore {
    #[instrument(skip_all, fields(resource = "users"))]
    fn find_all(&self) -> Result<Vec<User>> {
        let conn = &mut self.pool.get()?;

        let records = users::table
            .order(users::id.asc())
            .select(User::as_select())
            .load(conn)
            .context("failed to list users")?;

        info!("Retrieved {} users", records.len());
        Ok(records)
    }

    #[instrument(skip(self), fields(resource = "users"))]
    fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        let conn = &mut self.pool.get()?;

        let record = users::table
            .find(id)
            .select(User::as_select())
            .first(conn)
            .optional()
            .with_context(|| format!("failed to get users {id}"))?;

        Ok(record)
    }

    #[instrument(skip_all, fields(resource = "users", username = %fields.username))]
    fn create(&self, fields: CreateUserDto) -> Result<User> {
        let conn = &mut self.pool.get()?;

        let record: User = diesel::insert_into(users::table)
            .values(NewUser::from(fields))
            .returning(User::as_returning())
            .get_result(conn)
            .context("failed to create users")?;

        info!("Created user with id: {}", record.id);
        Ok(record)
    }

    #[instrument(skip_all, fields(resource = "users", id = record.id))]
    fn update(&self, record: User, changes: UpdateUserDto) -> Result<User> {
        let conn = &mut self.pool.get()?;

        let updated = diesel::update(users::table.find(record.id))
            .set((
                UserChangeset::from(changes),
                users::updated_at.eq(Utc::now().naive_utc()),
            ))
            .returning(User::as_returning())
            .get_result(conn)
            .with_context(|| format!("failed to update users {}", record.id))?;

        info!("Updated user");
        Ok(updated)
    }

    #[instrument(skip_all, fields(resource = "users", id = record.id))]
    fn destroy(&self, record: User) -> Result<()> {
        let conn = &mut self.pool.get()?;

        diesel::delete(users::table.find(record.id))
            .execute(conn)
            .with_context(|| format!("failed to delete users {}", record.id))?;

        info!("Deleted user");
        Ok(())
    }
}

/// Retrieves a user by username
///
/// ### Returns
///
/// A Result containing an Option with the User if found, or None if not found
#[instrument(skip(pool))]
pub fn find_user_by_username(pool: &DbPool, username: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let user = users::table
        .filter(users::username.eq(username))
        .select(User::as_select())
        .first(conn)
        .optional()
        .context("failed to look up user")?;

    if user.is_none() {
        debug!("User not found");
    }
    Ok(user)
}
