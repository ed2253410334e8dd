use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Serialize, Serializer};

use crate::dto::{CreateUserDto, UpdateUserDto};
use crate::resource::Resource;

/// An account that can log in
///
/// Roles are stored as a comma separated list and serialized as an array.
/// The password hash is never serialized.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq, Serialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(serialize_with = "serialize_roles")]
    pub roles: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    /// The user's roles as individual labels
    pub fn role_list(&self) -> Vec<String> {
        split_roles(&self.roles)
    }
}

impl Resource for User {
    const NAME: &'static str = "users";
    type Create = CreateUserDto;
    type Update = UpdateUserDto;

    fn id(&self) -> i32 {
        self.id
    }
}

/// Joins role labels into the stored form, dropping blanks and duplicates
pub fn join_roles<I, T>(roles: I) -> String
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut joined: Vec<String> = Vec::new();
    for role in roles {
        let role = role.as_ref().trim();
        if !role.is_empty() && !joined.iter().any(|existing| existing == role) {
            joined.push(role.to_string());
        }
    }
    joined.join(",")
}

fn split_roles(roles: &str) -> Vec<String> {
    roles
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}

fn serialize_roles<S: Serializer>(roles: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(split_roles(roles))
}
