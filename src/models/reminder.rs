use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dto::{CreateReminderDto, UpdateReminderDto};
use crate::resource::Resource;

/// A reminder, optionally filed under a category and tied to a timeframe
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::reminders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Reminder {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Cleared when the category is deleted
    pub category_id: Option<i32>,
    /// Cleared when the timeframe is deleted
    pub timeframe_id: Option<i32>,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Resource for Reminder {
    const NAME: &'static str = "reminders";
    type Create = CreateReminderDto;
    type Update = UpdateReminderDto;

    fn id(&self) -> i32 {
        self.id
    }
}
