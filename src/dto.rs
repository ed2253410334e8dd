use diesel::prelude::*;
use serde::{Deserialize, Deserializer};

/// Deserializes a field that distinguishes "absent" from "explicitly null"
///
/// Paired with `#[serde(default)]`: a missing field stays `None`, `null`
/// becomes `Some(None)`, and a value becomes `Some(Some(value))`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Data transfer object for creating a new category
#[derive(Deserialize, Insertable, Debug)]
#[diesel(table_name = crate::schema::categories)]
pub struct CreateCategoryDto {
    pub name: String,
    pub description: Option<String>,
}

/// Data transfer object for updating a category
///
/// Fields left out of the request keep their stored values.
#[derive(Deserialize, AsChangeset, Debug, Default)]
#[diesel(table_name = crate::schema::categories)]
pub struct UpdateCategoryDto {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

/// Data transfer object for creating a new timeframe
#[derive(Deserialize, Insertable, Debug)]
#[diesel(table_name = crate::schema::timeframes)]
pub struct CreateTimeframeDto {
    pub name: String,
    /// Defaults to 1 when omitted
    pub days: Option<i32>,
}

/// Data transfer object for updating a timeframe
#[derive(Deserialize, AsChangeset, Debug, Default)]
#[diesel(table_name = crate::schema::timeframes)]
pub struct UpdateTimeframeDto {
    pub name: Option<String>,
    pub days: Option<i32>,
}

/// Data transfer object for creating a new reminder
#[derive(Deserialize, Insertable, Debug)]
#[diesel(table_name = crate::schema::reminders)]
pub struct CreateReminderDto {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub timeframe_id: Option<i32>,
    /// Defaults to true when omitted
    pub active: Option<bool>,
}

/// Data transfer object for updating a reminder
///
/// Nullable columns accept an explicit `null` to clear them.
#[derive(Deserialize, AsChangeset, Debug, Default)]
#[diesel(table_name = crate::schema::reminders)]
pub struct UpdateReminderDto {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub timeframe_id: Option<Option<i32>>,
    pub active: Option<bool>,
}

/// Data transfer object for creating a new test
#[derive(Deserialize, Insertable, Debug)]
#[diesel(table_name = crate::schema::tests)]
pub struct CreateTestDto {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to true when omitted
    pub enabled: Option<bool>,
}

/// Data transfer object for updating a test
#[derive(Deserialize, AsChangeset, Debug, Default)]
#[diesel(table_name = crate::schema::tests)]
pub struct UpdateTestDto {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub enabled: Option<bool>,
}

/// Data transfer object for creating a new user
///
/// The password is hashed before it reaches storage.
#[derive(Deserialize)]
pub struct CreateUserDto {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Data transfer object for updating a user
#[derive(Deserialize, Default)]
pub struct UpdateUserDto {
    pub username: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<String>>,
}

/// Data transfer object for logging in
#[derive(Deserialize)]
pub struct LoginDto {
    pub username: String,
    pub password: String,
}
